use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::nit::Nit;

/// Registry data returned for a company (`datos_empresa`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub nit: Nit,
    #[serde(rename = "razon_social")]
    pub legal_name: String,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "municipio")]
    pub municipality: String,
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "actividad_principal")]
    pub primary_activity: String,
    #[serde(
        rename = "codigo_ciiu",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub ciiu_code: Option<String>,
    #[serde(
        rename = "fecha_matricula",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub incorporation_date: Option<String>,
    #[serde(
        rename = "ultima_renovacion",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub last_renewal: Option<String>,
    #[serde(
        rename = "tipo_sociedad",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub company_type: Option<String>,
    #[serde(rename = "camara", default, deserialize_with = "empty_string_as_none")]
    pub chamber: Option<String>,
    #[serde(rename = "tamano", default, deserialize_with = "empty_string_as_none")]
    pub size: Option<String>,
    #[serde(
        rename = "empleados_rango",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub employee_range: Option<String>,
    #[serde(
        rename = "estado_renovacion_2024",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub renewal_status: Option<String>,
    #[serde(
        rename = "responsabilidades_tributarias",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub tax_responsibilities: Vec<String>,
}

/// Compliance score in the inclusive range 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ComplianceScore(u8);

impl ComplianceScore {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ComplianceScore {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("score {value} outside 0..=100"))
    }
}

impl From<ComplianceScore> for u8 {
    fn from(value: ComplianceScore) -> Self {
        value.0
    }
}

/// Icon plus label pair used for registration standing and obligations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDescriptor {
    #[serde(rename = "icono")]
    pub icon: String,
    #[serde(rename = "estado")]
    pub label: String,
    #[serde(
        rename = "descripcion",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub description: Option<String>,
}

/// Scoring summary returned for a company (`mapa_cumplimiento`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceMap {
    pub score: ComplianceScore,
    #[serde(rename = "estado_matricula")]
    pub registration: StatusDescriptor,
    #[serde(rename = "proximos_pasos", default, deserialize_with = "null_as_empty")]
    pub next_steps: Vec<String>,
    #[serde(rename = "nivel", default, deserialize_with = "empty_string_as_none")]
    pub level: Option<String>,
    /// Obligations in the order the service lists them.
    #[serde(rename = "obligaciones", default, deserialize_with = "null_as_empty")]
    pub obligations: IndexMap<String, StatusDescriptor>,
}

/// Successful body of `POST /api/consultar`.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    #[serde(rename = "datos_empresa")]
    pub company: CompanyRecord,
    #[serde(rename = "mapa_cumplimiento")]
    pub compliance: ComplianceMap,
    #[serde(
        rename = "fecha_consulta",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub consulted_at: Option<String>,
}

/// The last successful lookup, replaced wholesale on every new success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub nit: Nit,
    pub company: CompanyRecord,
    pub compliance: ComplianceMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consulted_at: Option<String>,
}

impl QueryResult {
    pub fn new(nit: Nit, response: LookupResponse) -> Self {
        Self {
            nit,
            company: response.company,
            compliance: response.compliance,
            consulted_at: response.consulted_at,
        }
    }

    pub fn score(&self) -> ComplianceScore {
        self.compliance.score
    }
}

/// Availability of one upstream data source (`GET /api/fuentes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceStatus {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "disponible")]
    pub available: bool,
    #[serde(rename = "tipo", default, deserialize_with = "empty_string_as_none")]
    pub kind: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
