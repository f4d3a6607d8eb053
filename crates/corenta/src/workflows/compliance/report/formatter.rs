use super::views::{
    CompanyField, CompanyView, ComplianceView, InfoRow, ObligationView, StatusBadge, StepItem,
};
use crate::workflows::compliance::domain::{CompanyRecord, ComplianceMap, StatusDescriptor};
use crate::workflows::compliance::nit::Nit;

const NOT_APPLICABLE: &str = "N/A";
const CHAMBER_FALLBACK: &str = "Por determinar";

/// Display form of a NIT grouped 3-3-3, e.g. `890.903.938`.
pub fn format_nit(nit: &Nit) -> String {
    let (head, middle, tail) = nit.groups();
    format!("{head}.{middle}.{tail}")
}

pub fn render_company(record: &CompanyRecord) -> CompanyView {
    let mut rows = vec![
        row(CompanyField::Nit, format_nit(&record.nit)),
        row(CompanyField::LegalName, record.legal_name.clone()),
        row(CompanyField::Status, record.status.clone()),
        row(
            CompanyField::Location,
            format!("{}, {}", record.municipality, record.department),
        ),
        row(CompanyField::PrimaryActivity, record.primary_activity.clone()),
    ];

    let ciiu = record
        .ciiu_code
        .as_deref()
        .filter(|code| !code.trim().eq_ignore_ascii_case(NOT_APPLICABLE));
    push_present(&mut rows, CompanyField::CiiuCode, ciiu);
    push_present(
        &mut rows,
        CompanyField::CompanyType,
        record.company_type.as_deref(),
    );
    push_present(&mut rows, CompanyField::Size, record.size.as_deref());
    push_present(
        &mut rows,
        CompanyField::EmployeeRange,
        record.employee_range.as_deref(),
    );

    rows.push(row(
        CompanyField::Chamber,
        record
            .chamber
            .clone()
            .unwrap_or_else(|| CHAMBER_FALLBACK.to_string()),
    ));

    push_present(
        &mut rows,
        CompanyField::IncorporationDate,
        record.incorporation_date.as_deref(),
    );
    push_present(
        &mut rows,
        CompanyField::LastRenewal,
        record.last_renewal.as_deref(),
    );
    push_present(
        &mut rows,
        CompanyField::RenewalStatus,
        record.renewal_status.as_deref(),
    );

    let responsibilities =
        (!record.tax_responsibilities.is_empty()).then(|| record.tax_responsibilities.clone());

    CompanyView {
        rows,
        responsibilities,
    }
}

pub fn render_compliance_steps(map: &ComplianceMap) -> Vec<StepItem> {
    map.next_steps
        .iter()
        .enumerate()
        .map(|(index, text)| StepItem {
            position: index + 1,
            text: text.clone(),
        })
        .collect()
}

pub fn render_compliance(map: &ComplianceMap) -> ComplianceView {
    ComplianceView {
        score: map.score.value(),
        level: map.level.clone(),
        registration: badge(&map.registration),
        steps: render_compliance_steps(map),
        obligations: map
            .obligations
            .iter()
            .map(|(key, descriptor)| ObligationView {
                key: key.clone(),
                badge: badge(descriptor),
            })
            .collect(),
    }
}

fn row(field: CompanyField, value: String) -> InfoRow {
    InfoRow {
        field,
        label: field.label(),
        value,
    }
}

fn push_present(rows: &mut Vec<InfoRow>, field: CompanyField, value: Option<&str>) {
    if let Some(value) = value {
        rows.push(row(field, value.to_string()));
    }
}

fn badge(descriptor: &StatusDescriptor) -> StatusBadge {
    StatusBadge {
        icon: descriptor.icon.clone(),
        label: descriptor.label.clone(),
        description: descriptor.description.clone(),
    }
}
