use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ComplianceScore, QueryResult};
use super::nit::Nit;
use super::timers::{TimerHandle, TimerQueue, TimerSchedule};

/// Simulated delivery latency of the report e-mail.
pub const LEAD_DELIVERY_DELAY: Duration = Duration::from_secs(1);

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Structural `local@domain.tld` check on the trimmed input.
pub fn is_valid_email(raw: &str) -> bool {
    let email = raw.trim();
    !email.is_empty() && EMAIL_PATTERN.is_match(email)
}

/// Snapshot of the last successful query attached to a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadQuerySnapshot {
    pub nit: Nit,
    #[serde(rename = "razon_social")]
    pub legal_name: String,
    pub score: ComplianceScore,
}

impl From<&QueryResult> for LeadQuerySnapshot {
    fn from(query: &QueryResult) -> Self {
        Self {
            nit: query.nit.clone(),
            legal_name: query.company.legal_name.clone(),
            score: query.score(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadSubmission {
    pub email: String,
    #[serde(flatten)]
    pub query: Option<LeadQuerySnapshot>,
    #[serde(rename = "fecha")]
    pub submitted_at: DateTime<Utc>,
}

impl LeadSubmission {
    pub fn assemble(email: &str, last_query: Option<&QueryResult>) -> Self {
        Self {
            email: email.trim().to_string(),
            query: last_query.map(LeadQuerySnapshot::from),
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LeadRejection {
    #[error("Por favor ingresa un email válido")]
    InvalidEmail,
    #[error("ya se está enviando el reporte")]
    Sending,
}

#[derive(Debug, thiserror::Error)]
pub enum LeadDeliveryError {
    #[error("lead delivery unavailable: {0}")]
    Unavailable(String),
}

/// Collaborator that receives captured leads (CRM, mailer, ...).
pub trait LeadSink {
    fn deliver(&self, lead: &LeadSubmission) -> Result<(), LeadDeliveryError>;
}

/// Stub delivery that only records the lead in the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingLeadSink;

impl LeadSink for LoggingLeadSink {
    fn deliver(&self, lead: &LeadSubmission) -> Result<(), LeadDeliveryError> {
        info!(
            email = %lead.email,
            nit = lead.query.as_ref().map(|query| query.nit.to_string()),
            score = lead.query.as_ref().map(|query| query.score.value()),
            submitted_at = %lead.submitted_at,
            "lead captured"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeadNotice {
    InvalidEmail { message: String },
    Sent { email: String, message: String },
    Failed { message: String },
}

impl LeadNotice {
    pub fn message(&self) -> &str {
        match self {
            LeadNotice::InvalidEmail { message }
            | LeadNotice::Sent { message, .. }
            | LeadNotice::Failed { message } => message,
        }
    }
}

/// Render state of the lead form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadFormView {
    pub email_field: String,
    pub submit_enabled: bool,
    pub sending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<LeadNotice>,
}

impl Default for LeadFormView {
    fn default() -> Self {
        Self {
            email_field: String::new(),
            submit_enabled: true,
            sending: false,
            notice: None,
        }
    }
}

#[derive(Debug)]
pub struct LeadForm {
    view: LeadFormView,
    pending: Option<(TimerHandle, LeadSubmission)>,
    delay: Duration,
}

impl Default for LeadForm {
    fn default() -> Self {
        Self::new(LEAD_DELIVERY_DELAY)
    }
}

impl LeadForm {
    pub fn new(delay: Duration) -> Self {
        Self {
            view: LeadFormView::default(),
            pending: None,
            delay,
        }
    }

    pub fn view(&self) -> &LeadFormView {
        &self.view
    }

    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn owns(&self, handle: TimerHandle) -> bool {
        matches!(&self.pending, Some((pending, _)) if *pending == handle)
    }

    /// Validates the e-mail and starts the simulated send. Invalid input only
    /// produces a blocking notice; no timer is started.
    pub fn submit(
        &mut self,
        email: &str,
        last_query: Option<&QueryResult>,
        timers: &mut TimerQueue,
    ) -> Result<(), LeadRejection> {
        if self.is_sending() {
            return Err(LeadRejection::Sending);
        }

        self.view.email_field = email.to_string();
        if !is_valid_email(email) {
            self.view.notice = Some(LeadNotice::InvalidEmail {
                message: LeadRejection::InvalidEmail.to_string(),
            });
            return Err(LeadRejection::InvalidEmail);
        }

        let lead = LeadSubmission::assemble(email, last_query);
        let handle = timers.start(TimerSchedule::Once(self.delay));
        self.pending = Some((handle, lead));
        self.view.notice = None;
        self.view.sending = true;
        self.view.submit_enabled = false;
        Ok(())
    }

    /// Completes the simulated send when `handle` is the pending delivery.
    pub fn on_timer<S: LeadSink>(&mut self, handle: TimerHandle, sink: &S) -> bool {
        if !self.owns(handle) {
            return false;
        }
        let Some((_, lead)) = self.pending.take() else {
            return false;
        };

        self.view.notice = Some(match sink.deliver(&lead) {
            Ok(()) => {
                self.view.email_field.clear();
                LeadNotice::Sent {
                    message: format!(
                        "¡Listo! Hemos enviado el reporte completo a: {}. Revisa tu bandeja de entrada en los próximos minutos.",
                        lead.email
                    ),
                    email: lead.email,
                }
            }
            Err(err) => {
                warn!(error = %err, "lead delivery failed");
                LeadNotice::Failed {
                    message: "No pudimos enviar el reporte. Por favor intenta de nuevo.".to_string(),
                }
            }
        });
        self.view.sending = false;
        self.view.submit_enabled = true;
        true
    }
}
