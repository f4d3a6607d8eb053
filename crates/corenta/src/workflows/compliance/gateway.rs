use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{DataSourceStatus, LookupResponse};
use super::nit::Nit;

const CONNECTIVITY_MESSAGE: &str = "No se pudo conectar con el servidor. Verifica tu conexión.";
const GENERIC_MESSAGE: &str = "Error al realizar la consulta. Por favor intenta de nuevo.";

/// Failure of one call to the remote compliance service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("compliance service unreachable: {0}")]
    Transport(String),
    #[error("compliance service answered {0} without a usable detail")]
    Status(u16),
    #[error("compliance service rejected the lookup ({status}): {detail}")]
    Service { status: u16, detail: String },
    #[error("malformed compliance response: {0}")]
    Malformed(String),
}

impl LookupError {
    /// Message shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::Service { detail, .. } => detail.clone(),
            LookupError::Transport(_) => CONNECTIVITY_MESSAGE.to_string(),
            LookupError::Status(_) | LookupError::Malformed(_) => GENERIC_MESSAGE.to_string(),
        }
    }
}

/// Remote collaborator resolving a NIT to registry data and a score.
#[allow(async_fn_in_trait)]
pub trait ComplianceGateway {
    async fn lookup(&self, nit: &Nit) -> Result<LookupResponse, LookupError>;
    async fn health(&self) -> Result<(), LookupError>;
}

/// Probes the service once; failures are logged and never surfaced.
pub async fn probe_health<G: ComplianceGateway>(gateway: &G) -> bool {
    match gateway.health().await {
        Ok(()) => {
            info!("compliance service available");
            true
        }
        Err(err) => {
            warn!(error = %err, "compliance service unavailable");
            false
        }
    }
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    nit: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SourcesBody {
    #[serde(rename = "fuentes", default)]
    sources: Vec<DataSourceStatus>,
}

/// reqwest-backed client for the compliance HTTP API.
#[derive(Debug, Clone)]
pub struct HttpComplianceGateway {
    client: Client,
    base_url: String,
}

impl HttpComplianceGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Lists the upstream data sources the service consults.
    pub async fn sources(&self) -> Result<Vec<DataSourceStatus>, LookupError> {
        let response = self
            .client
            .get(self.endpoint("/api/fuentes"))
            .send()
            .await
            .map_err(transport_error)?;
        let body: SourcesBody = read_success(response).await?;
        Ok(body.sources)
    }
}

impl ComplianceGateway for HttpComplianceGateway {
    async fn lookup(&self, nit: &Nit) -> Result<LookupResponse, LookupError> {
        let response = self
            .client
            .post(self.endpoint("/api/consultar"))
            .json(&LookupRequest { nit: nit.as_str() })
            .send()
            .await
            .map_err(transport_error)?;
        read_success(response).await
    }

    async fn health(&self) -> Result<(), LookupError> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LookupError::Status(response.status().as_u16()))
        }
    }
}

async fn read_success<T>(response: reqwest::Response) -> Result<T, LookupError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }

    serde_json::from_slice(&body).map_err(|err| LookupError::Malformed(err.to_string()))
}

fn error_from_body(status: StatusCode, body: &[u8]) -> LookupError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.detail)
        .and_then(|detail| match detail {
            serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        });

    match detail {
        Some(detail) => LookupError::Service {
            status: status.as_u16(),
            detail,
        },
        None => LookupError::Status(status.as_u16()),
    }
}

fn transport_error(err: reqwest::Error) -> LookupError {
    LookupError::Transport(err.to_string())
}
