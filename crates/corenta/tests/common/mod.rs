#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const KNOWN_NIT: &str = "890903938";
pub const NO_RESPONSIBILITIES_NIT: &str = "860034313";
pub const UNKNOWN_NIT: &str = "123456789";
pub const VALIDATION_NIT: &str = "222222222";
pub const OUT_OF_RANGE_NIT: &str = "333333333";
pub const GATEWAY_DOWN_NIT: &str = "444444444";

/// Call log shared between the stub service and the test body.
#[derive(Clone, Default)]
pub struct StubState {
    lookups: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
}

impl StubState {
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().expect("received mutex").clone()
    }
}

pub fn lookup_body(nit: &str, score: i64, responsibilities: Value) -> Value {
    json!({
        "success": true,
        "nit": nit,
        "datos_empresa": {
            "nit": nit,
            "razon_social": "BANCOLOMBIA S.A.",
            "estado": "ACTIVA",
            "municipio": "MEDELLÍN",
            "departamento": "ANTIOQUIA",
            "actividad_principal": "Bancos comerciales",
            "codigo_ciiu": "N/A",
            "camara": "",
            "responsabilidades_tributarias": responsibilities
        },
        "mapa_cumplimiento": {
            "score": score,
            "nivel": "ALTO",
            "estado_matricula": { "icono": "✅", "estado": "AL DÍA" },
            "proximos_pasos": ["Presentar declaración de renta"],
            "obligaciones": {
                "renta": { "icono": "⚠️", "estado": "PENDIENTE", "descripcion": "Vence en mayo" }
            }
        },
        "fecha_consulta": "2024-05-02T10:15:00"
    })
}

async fn consultar(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.lookups.fetch_add(1, Ordering::SeqCst);
    let nit = body
        .get("nit")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    state
        .received
        .lock()
        .expect("received mutex")
        .push(nit.clone());

    match nit.as_str() {
        KNOWN_NIT => Json(lookup_body(&nit, 85, json!(["IVA", "Renta"]))).into_response(),
        NO_RESPONSIBILITIES_NIT => Json(lookup_body(&nit, 62, json!([]))).into_response(),
        VALIDATION_NIT => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "nit"], "msg": "invalid" }] })),
        )
            .into_response(),
        OUT_OF_RANGE_NIT => Json(lookup_body(&nit, 140, json!([]))).into_response(),
        GATEWAY_DOWN_NIT => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("No se encontró información para el NIT {nit}") })),
        )
            .into_response(),
    }
}

async fn fuentes() -> Json<Value> {
    Json(json!({
        "fuentes": [
            { "nombre": "RUES", "disponible": true, "tipo": "registro" },
            { "nombre": "DIAN", "disponible": false }
        ],
        "timestamp": "2024-05-02T10:15:00"
    }))
}

/// Serves the compliance API on an ephemeral port; returns its base URL.
pub async fn spawn_stub() -> (String, StubState) {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/consultar", post(consultar))
        .route("/api/fuentes", get(fuentes))
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub serves");
    });

    (format!("http://{addr}"), state)
}

/// Base URL of a port nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}
