use std::io::{self, Write};

use corenta::workflows::compliance::{
    ComplianceView, DataSourceStatus, LeadNotice, Screen, StatusBadge,
};

const GAUGE_WIDTH: usize = 20;

/// One-line score gauge, e.g. `[#################---]  85/100`.
pub(crate) fn gauge(score: u8) -> String {
    let filled = usize::from(score.min(100)) * GAUGE_WIDTH / 100;
    format!(
        "[{}{}] {:>3}/100",
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled),
        score
    )
}

/// Redraws the gauge in place while the score animates.
pub(crate) fn render_gauge_frame<W: Write>(out: &mut W, score: u8) -> io::Result<()> {
    write!(out, "\rPuntaje de cumplimiento {}", gauge(score))?;
    out.flush()
}

fn badge(status: &StatusBadge) -> String {
    match &status.description {
        Some(description) => format!("{} {} ({})", status.icon, status.label, description),
        None => format!("{} {}", status.icon, status.label),
    }
}

pub(crate) fn render_screen<W: Write>(out: &mut W, screen: &Screen) -> io::Result<()> {
    if let Some(message) = screen.banner() {
        writeln!(out, "Error: {message}")?;
    }
    if !screen.results_visible {
        return Ok(());
    }

    if let Some(company) = &screen.company {
        writeln!(out, "Datos de la empresa")?;
        for row in &company.rows {
            writeln!(out, "  {:<22} {}", row.label, row.value)?;
        }
        if let Some(responsibilities) = &company.responsibilities {
            writeln!(out, "  Responsabilidades tributarias:")?;
            for responsibility in responsibilities {
                writeln!(out, "    - {responsibility}")?;
            }
        }
    }

    if let Some(compliance) = &screen.compliance {
        render_compliance(out, compliance, screen.score)?;
    }
    Ok(())
}

fn render_compliance<W: Write>(out: &mut W, view: &ComplianceView, shown: u8) -> io::Result<()> {
    writeln!(out, "\nMapa de cumplimiento")?;
    writeln!(out, "  Puntaje               {}", gauge(shown))?;
    if let Some(level) = &view.level {
        writeln!(out, "  Nivel                 {level}")?;
    }
    writeln!(out, "  Estado de matrícula   {}", badge(&view.registration))?;

    if !view.obligations.is_empty() {
        writeln!(out, "  Obligaciones:")?;
        for obligation in &view.obligations {
            writeln!(out, "    {:<18} {}", obligation.key, badge(&obligation.badge))?;
        }
    }

    if !view.steps.is_empty() {
        writeln!(out, "  Próximos pasos:")?;
        for step in &view.steps {
            writeln!(out, "    {}. {}", step.position, step.text)?;
        }
    }
    Ok(())
}

pub(crate) fn render_json<W: Write>(out: &mut W, screen: &Screen) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, screen)?;
    writeln!(out)
}

/// Output for a lookup or lead that did not go through. Text mode writes
/// nothing here since the banner is reported once as the process error.
pub(crate) fn report_failure<W: Write>(
    out: &mut W,
    screen: &Screen,
    as_json: bool,
) -> io::Result<()> {
    if as_json {
        render_json(out, screen)?;
    }
    Ok(())
}

pub(crate) fn render_lead_notice<W: Write>(out: &mut W, notice: &LeadNotice) -> io::Result<()> {
    match notice {
        LeadNotice::Sent { message, .. } => writeln!(out, "{message}"),
        LeadNotice::InvalidEmail { message } | LeadNotice::Failed { message } => {
            writeln!(out, "Aviso: {message}")
        }
    }
}

pub(crate) fn render_sources<W: Write>(out: &mut W, sources: &[DataSourceStatus]) -> io::Result<()> {
    if sources.is_empty() {
        return writeln!(out, "El servicio no reportó fuentes de datos");
    }
    writeln!(out, "Fuentes de datos")?;
    for source in sources {
        let availability = if source.available {
            "disponible"
        } else {
            "no disponible"
        };
        match &source.kind {
            Some(kind) => writeln!(out, "  {:<24} {:<14} {kind}", source.name, availability)?,
            None => writeln!(out, "  {:<24} {availability}", source.name)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corenta::workflows::compliance::{
        CompanyField, CompanyView, InfoRow, ObligationView, StepItem, UiPhase,
    };

    fn rendered(screen: &Screen) -> String {
        let mut out = Vec::new();
        render_screen(&mut out, screen).expect("render to memory");
        String::from_utf8(out).expect("utf8 output")
    }

    fn results_screen(responsibilities: Option<Vec<String>>) -> Screen {
        Screen {
            phase: UiPhase::Success,
            company: Some(CompanyView {
                rows: vec![InfoRow {
                    field: CompanyField::Nit,
                    label: CompanyField::Nit.label(),
                    value: "890.903.938".to_string(),
                }],
                responsibilities,
            }),
            compliance: Some(ComplianceView {
                score: 85,
                level: Some("ALTO".to_string()),
                registration: StatusBadge {
                    icon: "✅".to_string(),
                    label: "AL DÍA".to_string(),
                    description: None,
                },
                steps: vec![StepItem {
                    position: 1,
                    text: "Presentar declaración de renta".to_string(),
                }],
                obligations: vec![ObligationView {
                    key: "renta".to_string(),
                    badge: StatusBadge {
                        icon: "⚠️".to_string(),
                        label: "PENDIENTE".to_string(),
                        description: Some("Vence en mayo".to_string()),
                    },
                }],
            }),
            score: 85,
            results_visible: true,
            ..Screen::default()
        }
    }

    #[test]
    fn gauge_scales_to_the_score() {
        assert_eq!(gauge(0), format!("[{}]   0/100", "-".repeat(20)));
        assert_eq!(gauge(100), format!("[{}] 100/100", "#".repeat(20)));
        assert_eq!(gauge(85), format!("[{}{}]  85/100", "#".repeat(17), "---"));
    }

    #[test]
    fn report_lists_company_rows_and_steps() {
        let text = rendered(&results_screen(Some(vec!["IVA".to_string()])));

        assert!(text.contains("NIT"));
        assert!(text.contains("890.903.938"));
        assert!(text.contains("Responsabilidades tributarias"));
        assert!(text.contains("1. Presentar declaración de renta"));
        assert!(text.contains("⚠️ PENDIENTE (Vence en mayo)"));
    }

    #[test]
    fn missing_responsibilities_print_no_block() {
        let text = rendered(&results_screen(None));
        assert!(!text.contains("Responsabilidades"));
    }

    #[test]
    fn error_phase_prints_the_banner_only() {
        let screen = Screen {
            phase: UiPhase::Error("El NIT debe tener 9 dígitos".to_string()),
            ..Screen::default()
        };
        assert_eq!(rendered(&screen), "Error: El NIT debe tener 9 dígitos\n");
    }

    #[test]
    fn failure_is_left_to_the_process_error_in_text_mode() {
        let screen = Screen {
            phase: UiPhase::Error("El NIT debe contener solo números".to_string()),
            ..Screen::default()
        };
        let mut out = Vec::new();
        report_failure(&mut out, &screen, false).expect("write to memory");
        assert!(out.is_empty());
    }

    #[test]
    fn failure_is_json_in_json_mode() {
        let screen = Screen {
            phase: UiPhase::Error("NIT no encontrado".to_string()),
            ..Screen::default()
        };
        let mut out = Vec::new();
        report_failure(&mut out, &screen, true).expect("write to memory");

        let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
        assert_eq!(value["phase"]["phase"], "error");
        assert_eq!(value["phase"]["message"], "NIT no encontrado");
        assert_eq!(value["results_visible"], false);
    }

    #[test]
    fn sources_show_availability() {
        let sources = vec![
            DataSourceStatus {
                name: "RUES".to_string(),
                available: true,
                kind: Some("registro".to_string()),
            },
            DataSourceStatus {
                name: "DIAN".to_string(),
                available: false,
                kind: None,
            },
        ];
        let mut out = Vec::new();
        render_sources(&mut out, &sources).expect("render to memory");
        let text = String::from_utf8(out).expect("utf8 output");

        assert!(text.contains("RUES"));
        assert!(text.contains("no disponible"));
    }
}
