use serde::Serialize;

/// Company attributes that can appear as a row in the company section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyField {
    Nit,
    LegalName,
    Status,
    Location,
    PrimaryActivity,
    CiiuCode,
    CompanyType,
    Size,
    EmployeeRange,
    Chamber,
    IncorporationDate,
    LastRenewal,
    RenewalStatus,
}

impl CompanyField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nit => "NIT",
            Self::LegalName => "Razón Social",
            Self::Status => "Estado",
            Self::Location => "Ubicación",
            Self::PrimaryActivity => "Actividad Principal",
            Self::CiiuCode => "Código CIIU",
            Self::CompanyType => "Tipo de Sociedad",
            Self::Size => "Tamaño",
            Self::EmployeeRange => "Empleados",
            Self::Chamber => "Cámara de Comercio",
            Self::IncorporationDate => "Fecha Matrícula",
            Self::LastRenewal => "Última Renovación",
            Self::RenewalStatus => "Estado de Renovación",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoRow {
    pub field: CompanyField,
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyView {
    pub rows: Vec<InfoRow>,
    /// Tax responsibility badges; `None` when the block is omitted entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<Vec<String>>,
}

impl CompanyView {
    pub fn row(&self, field: CompanyField) -> Option<&InfoRow> {
        self.rows.iter().find(|row| row.field == field)
    }

    pub fn value(&self, field: CompanyField) -> Option<&str> {
        self.row(field).map(|row| row.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub icon: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepItem {
    pub position: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObligationView {
    pub key: String,
    pub badge: StatusBadge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceView {
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub registration: StatusBadge,
    pub steps: Vec<StepItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obligations: Vec<ObligationView>,
}
