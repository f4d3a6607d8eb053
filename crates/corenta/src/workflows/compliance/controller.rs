use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::animation::ScoreAnimator;
use super::domain::{LookupResponse, QueryResult};
use super::gateway::{probe_health, ComplianceGateway, LookupError};
use super::lead::{LeadForm, LeadFormView, LeadRejection, LeadSink, LoggingLeadSink};
use super::nit::filter_nit_input;
use super::orchestrator::{
    Completion, LookupTicket, RequestOrchestrator, Submission, UiPhase,
};
use super::report::views::{CompanyView, ComplianceView};
use super::report::{render_company, render_compliance};
use super::timers::TimerQueue;

/// Abstract user input delivered by a rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Every keystroke in the NIT field.
    NitInput(String),
    Submit(String),
    LeadSubmit(String),
}

/// Everything a rendering layer needs to draw the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub nit_field: String,
    pub phase: UiPhase,
    pub submit_enabled: bool,
    pub loader_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceView>,
    /// Score currently shown by the gauge; lags the target while animating.
    pub score: u8,
    pub results_visible: bool,
    /// Incremented each time the results section should be scrolled into view.
    pub scroll_requests: u32,
    pub lead: LeadFormView,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            nit_field: String::new(),
            phase: UiPhase::Idle,
            submit_enabled: true,
            loader_visible: false,
            company: None,
            compliance: None,
            score: 0,
            results_visible: false,
            scroll_requests: 0,
            lead: LeadFormView::default(),
        }
    }
}

impl Screen {
    /// Text of the error banner, when one is showing.
    pub fn banner(&self) -> Option<&str> {
        match &self.phase {
            UiPhase::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Wires input events to validation, the lookup lifecycle, rendering, the
/// score gauge and lead capture. Owns the single query slot.
pub struct ViewController<G, S = LoggingLeadSink> {
    gateway: G,
    leads: S,
    timers: TimerQueue,
    orchestrator: RequestOrchestrator,
    animator: ScoreAnimator,
    lead_form: LeadForm,
    last_query: Option<QueryResult>,
    screen: Screen,
}

impl<G: ComplianceGateway> ViewController<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_lead_sink(gateway, LoggingLeadSink)
    }
}

impl<G, S> ViewController<G, S>
where
    G: ComplianceGateway,
    S: LeadSink,
{
    pub fn with_lead_sink(gateway: G, leads: S) -> Self {
        Self::with_parts(gateway, leads, RequestOrchestrator::default(), LeadForm::default())
    }

    pub fn with_parts(
        gateway: G,
        leads: S,
        orchestrator: RequestOrchestrator,
        lead_form: LeadForm,
    ) -> Self {
        let mut controller = Self {
            gateway,
            leads,
            timers: TimerQueue::new(),
            orchestrator,
            animator: ScoreAnimator::new(),
            lead_form,
            last_query: None,
            screen: Screen::default(),
        };
        controller.sync_screen();
        controller
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn lead_sink(&self) -> &S {
        &self.leads
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn last_query(&self) -> Option<&QueryResult> {
        self.last_query.as_ref()
    }

    pub fn phase(&self) -> &UiPhase {
        self.orchestrator.phase()
    }

    pub fn submit_enabled(&self) -> bool {
        self.orchestrator.submit_enabled()
    }

    pub fn loader_visible(&self) -> bool {
        self.orchestrator.loader_visible()
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.orchestrator.error_message()
    }

    pub fn lead_view(&self) -> &LeadFormView {
        self.lead_form.view()
    }

    pub fn lead_pending(&self) -> bool {
        self.lead_form.is_sending()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    pub async fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::NitInput(text) => self.on_nit_input(&text),
            InputEvent::Submit(text) => {
                self.submit(&text).await;
            }
            InputEvent::LeadSubmit(email) => match self.submit_lead(&email) {
                Ok(()) => debug!("lead send started"),
                // The form already shows the invalid-email notice.
                Err(LeadRejection::InvalidEmail) => {}
                // The lead control is disabled while sending.
                Err(LeadRejection::Sending) => debug!("lead submit ignored while sending"),
            },
        }
    }

    /// Live keystroke filter for the NIT field.
    pub fn on_nit_input(&mut self, text: &str) {
        self.screen.nit_field = filter_nit_input(text);
    }

    /// Runs one full lookup: validation, the remote call and its completion.
    pub async fn submit(&mut self, raw: &str) -> Option<Completion> {
        let ticket = self.begin_lookup(raw)?;
        let outcome = self.gateway.lookup(&ticket.nit).await;
        Some(self.finish_lookup(ticket, outcome))
    }

    /// First half of [`ViewController::submit`]; returns the ticket the caller
    /// must hand back once the remote call settles.
    pub fn begin_lookup(&mut self, raw: &str) -> Option<LookupTicket> {
        let submission = self.orchestrator.submit(raw, &mut self.timers);
        self.sync_screen();
        match submission {
            Submission::Dispatch(ticket) => Some(ticket),
            Submission::Rejected(_) | Submission::Busy => None,
        }
    }

    pub fn finish_lookup(
        &mut self,
        ticket: LookupTicket,
        outcome: Result<LookupResponse, LookupError>,
    ) -> Completion {
        let completion = self.orchestrator.complete(ticket, outcome, &mut self.timers);
        if let Completion::Succeeded(result) = &completion {
            self.show_result(result.clone());
        }
        self.sync_screen();
        completion
    }

    pub fn submit_lead(&mut self, email: &str) -> Result<(), LeadRejection> {
        let outcome = self
            .lead_form
            .submit(email, self.last_query.as_ref(), &mut self.timers);
        self.sync_screen();
        outcome
    }

    /// Probes the remote service; never blocks the form and never errors.
    pub async fn check_health(&self) -> bool {
        probe_health(&self.gateway).await
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn advance(&mut self, by: Duration) {
        let at = self.timers.now() + by;
        self.advance_to(at);
    }

    /// Fires every timer due at or before `at`, one at a time in deadline
    /// order, then moves the clock to `at`.
    pub fn advance_to(&mut self, at: Duration) {
        while let Some(fired) = self.timers.pop_due(at) {
            if self.animator.owns(fired.handle) {
                if let Some(value) = self.animator.on_tick(fired.handle, &mut self.timers) {
                    self.screen.score = value;
                }
            } else if self.orchestrator.on_timer(fired.handle) {
                debug!("error banner dismissed");
            } else if self.lead_form.on_timer(fired.handle, &self.leads) {
                debug!("lead delivery settled");
            } else {
                debug!(?fired, "timer fired without an owner");
            }
        }
        self.timers.settle(at);
        self.sync_screen();
    }

    fn show_result(&mut self, result: QueryResult) {
        self.screen.company = Some(render_company(&result.company));
        self.screen.compliance = Some(render_compliance(&result.compliance));
        self.animator.start(result.score(), &mut self.timers);
        self.screen.score = self.animator.displayed();
        self.screen.results_visible = true;
        self.screen.scroll_requests += 1;
        self.last_query = Some(result);
    }

    fn sync_screen(&mut self) {
        self.screen.phase = self.orchestrator.phase().clone();
        self.screen.submit_enabled = self.orchestrator.submit_enabled();
        self.screen.loader_visible = self.orchestrator.loader_visible();
        self.screen.lead = self.lead_form.view().clone();
    }
}
