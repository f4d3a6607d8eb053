//! NIT compliance lookup client: validation, lookup lifecycle, report
//! rendering, the animated score gauge and lead capture.

pub mod animation;
pub mod controller;
pub mod domain;
pub mod gateway;
pub mod lead;
pub mod nit;
pub mod orchestrator;
pub mod report;
pub mod timers;

#[cfg(test)]
mod tests;

pub use animation::{ScoreAnimation, ScoreAnimator, FRAME_COUNT, FRAME_INTERVAL};
pub use controller::{InputEvent, Screen, ViewController};
pub use domain::{
    CompanyRecord, ComplianceMap, ComplianceScore, DataSourceStatus, LookupResponse, QueryResult,
    StatusDescriptor,
};
pub use gateway::{probe_health, ComplianceGateway, HttpComplianceGateway, LookupError};
pub use lead::{
    is_valid_email, LeadDeliveryError, LeadForm, LeadFormView, LeadNotice, LeadQuerySnapshot,
    LeadRejection, LeadSink, LeadSubmission, LoggingLeadSink, LEAD_DELIVERY_DELAY,
};
pub use nit::{filter_nit_input, validate_nit, Nit, NitRejection, NIT_LENGTH};
pub use orchestrator::{
    Completion, LookupTicket, RequestId, RequestOrchestrator, Submission, UiPhase,
    ERROR_DISMISS_AFTER,
};
pub use report::views::{
    CompanyField, CompanyView, ComplianceView, InfoRow, ObligationView, StatusBadge, StepItem,
};
pub use report::{format_nit, render_company, render_compliance, render_compliance_steps};
pub use timers::{TimerFired, TimerHandle, TimerQueue, TimerSchedule};
