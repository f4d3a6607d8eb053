use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::workflows::compliance::domain::LookupResponse;
use crate::workflows::compliance::gateway::{ComplianceGateway, LookupError};
use crate::workflows::compliance::lead::{LeadDeliveryError, LeadSink, LeadSubmission};
use crate::workflows::compliance::nit::Nit;

pub(super) fn company_json(nit: &str, responsibilities: Value) -> Value {
    json!({
        "nit": nit,
        "razon_social": "BANCOLOMBIA S.A.",
        "estado": "ACTIVA",
        "municipio": "MEDELLÍN",
        "departamento": "ANTIOQUIA",
        "actividad_principal": "Bancos comerciales",
        "codigo_ciiu": "6412",
        "tipo_sociedad": "SOCIEDAD ANÓNIMA",
        "tamano": "GRANDE",
        "camara": "MEDELLÍN PARA ANTIOQUIA",
        "fecha_matricula": "1945-01-24",
        "responsabilidades_tributarias": responsibilities
    })
}

pub(super) fn lookup_json(nit: &str, score: u8, responsibilities: Value) -> Value {
    json!({
        "success": true,
        "nit": nit,
        "datos_empresa": company_json(nit, responsibilities),
        "mapa_cumplimiento": {
            "score": score,
            "nivel": "ALTO",
            "estado_matricula": {
                "icono": "✅",
                "estado": "AL DÍA",
                "descripcion": "Matrícula renovada"
            },
            "proximos_pasos": [
                "Renovar matrícula mercantil antes del 31 de marzo",
                "Presentar declaración de renta"
            ]
        },
        "fecha_consulta": "2024-05-02T10:15:00"
    })
}

pub(super) fn lookup_response(nit: &str, score: u8) -> LookupResponse {
    lookup_response_with(nit, score, json!(["IVA", "Retención en la fuente"]))
}

pub(super) fn lookup_response_with(nit: &str, score: u8, responsibilities: Value) -> LookupResponse {
    serde_json::from_value(lookup_json(nit, score, responsibilities)).expect("fixture parses")
}

/// Gateway that replays scripted outcomes and records every lookup.
#[derive(Default)]
pub(super) struct FakeGateway {
    outcomes: Mutex<VecDeque<Result<LookupResponse, LookupError>>>,
    lookups: Mutex<Vec<String>>,
    healthy: bool,
}

impl FakeGateway {
    pub(super) fn healthy() -> Self {
        Self {
            healthy: true,
            ..Self::default()
        }
    }

    pub(super) fn with_outcome(self, outcome: Result<LookupResponse, LookupError>) -> Self {
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .push_back(outcome);
        self
    }

    pub(super) fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lookups lock").clone()
    }
}

impl ComplianceGateway for FakeGateway {
    async fn lookup(&self, nit: &Nit) -> Result<LookupResponse, LookupError> {
        self.lookups
            .lock()
            .expect("lookups lock")
            .push(nit.as_str().to_string());
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .unwrap_or_else(|| Err(LookupError::Transport("no scripted outcome".to_string())))
    }

    async fn health(&self) -> Result<(), LookupError> {
        if self.healthy {
            Ok(())
        } else {
            Err(LookupError::Status(503))
        }
    }
}

#[derive(Default)]
pub(super) struct RecordingLeadSink {
    leads: Mutex<Vec<LeadSubmission>>,
}

impl RecordingLeadSink {
    pub(super) fn leads(&self) -> Vec<LeadSubmission> {
        self.leads.lock().expect("leads lock").clone()
    }
}

impl LeadSink for RecordingLeadSink {
    fn deliver(&self, lead: &LeadSubmission) -> Result<(), LeadDeliveryError> {
        self.leads.lock().expect("leads lock").push(lead.clone());
        Ok(())
    }
}
