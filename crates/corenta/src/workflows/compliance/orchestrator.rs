use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{LookupResponse, QueryResult};
use super::gateway::LookupError;
use super::nit::{validate_nit, Nit, NitRejection};
use super::timers::{TimerHandle, TimerQueue, TimerSchedule};

pub const ERROR_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Visible state of the lookup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum UiPhase {
    Idle,
    Loading,
    Error(String),
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestId(u64);

/// Identity of one issued lookup; only the latest ticket may complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub id: RequestId,
    pub nit: Nit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The caller must run the lookup and report back with the ticket.
    Dispatch(LookupTicket),
    Rejected(NitRejection),
    /// A lookup is already in flight and the submit control is disabled;
    /// the input was neither validated nor sent.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Succeeded(QueryResult),
    Failed(LookupError),
    /// Response for a request that is no longer the latest; ignored.
    Stale,
}

/// State machine over [`UiPhase`] for a single lookup form.
#[derive(Debug)]
pub struct RequestOrchestrator {
    phase: UiPhase,
    issued: u64,
    in_flight: Option<RequestId>,
    dismiss: Option<TimerHandle>,
    dismiss_after: Duration,
}

impl Default for RequestOrchestrator {
    fn default() -> Self {
        Self::new(ERROR_DISMISS_AFTER)
    }
}

impl RequestOrchestrator {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            phase: UiPhase::Idle,
            issued: 0,
            in_flight: None,
            dismiss: None,
            dismiss_after,
        }
    }

    pub fn phase(&self) -> &UiPhase {
        &self.phase
    }

    pub fn submit_enabled(&self) -> bool {
        self.phase != UiPhase::Loading
    }

    pub fn loader_visible(&self) -> bool {
        self.phase == UiPhase::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            UiPhase::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn owns(&self, handle: TimerHandle) -> bool {
        self.dismiss == Some(handle)
    }

    pub fn submit(&mut self, raw: &str, timers: &mut TimerQueue) -> Submission {
        // The submit control is disabled while loading; nothing reaches validation.
        if self.phase == UiPhase::Loading {
            debug!("submit ignored while a lookup is in flight");
            return Submission::Busy;
        }

        let nit = match validate_nit(raw) {
            Ok(nit) => nit,
            Err(rejection) => {
                self.fail(rejection.to_string(), timers);
                return Submission::Rejected(rejection);
            }
        };

        self.clear_dismiss(timers);
        self.issued += 1;
        let id = RequestId(self.issued);
        self.in_flight = Some(id);
        self.phase = UiPhase::Loading;
        info!(request = id.0, %nit, "compliance lookup dispatched");

        Submission::Dispatch(LookupTicket { id, nit })
    }

    pub fn complete(
        &mut self,
        ticket: LookupTicket,
        outcome: Result<LookupResponse, LookupError>,
        timers: &mut TimerQueue,
    ) -> Completion {
        if self.in_flight != Some(ticket.id) {
            debug!(request = ticket.id.0, "discarding stale lookup response");
            return Completion::Stale;
        }
        self.in_flight = None;

        match outcome {
            Ok(response) => {
                let result = QueryResult::new(ticket.nit, response);
                info!(
                    request = ticket.id.0,
                    nit = %result.nit,
                    score = result.score().value(),
                    "compliance lookup succeeded"
                );
                self.phase = UiPhase::Success;
                Completion::Succeeded(result)
            }
            Err(err) => {
                warn!(request = ticket.id.0, error = %err, "compliance lookup failed");
                self.fail(err.user_message(), timers);
                Completion::Failed(err)
            }
        }
    }

    /// Handles a fired timer; returns `true` when it was the error dismissal.
    pub fn on_timer(&mut self, handle: TimerHandle) -> bool {
        if !self.owns(handle) {
            return false;
        }
        self.dismiss = None;
        if matches!(self.phase, UiPhase::Error(_)) {
            self.phase = UiPhase::Idle;
        }
        true
    }

    fn fail(&mut self, message: String, timers: &mut TimerQueue) {
        self.clear_dismiss(timers);
        self.phase = UiPhase::Error(message);
        self.dismiss = Some(timers.start(TimerSchedule::Once(self.dismiss_after)));
    }

    fn clear_dismiss(&mut self, timers: &mut TimerQueue) {
        if let Some(handle) = self.dismiss.take() {
            timers.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(orchestrator: &mut RequestOrchestrator, timers: &mut TimerQueue) -> LookupTicket {
        match orchestrator.submit("890903938", timers) {
            Submission::Dispatch(ticket) => ticket,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    fn fire_until(orchestrator: &mut RequestOrchestrator, timers: &mut TimerQueue, at: Duration) {
        while let Some(fired) = timers.pop_due(at) {
            orchestrator.on_timer(fired.handle);
        }
        timers.settle(at);
    }

    #[test]
    fn invalid_input_goes_straight_to_error() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();

        let submission = orchestrator.submit("abc", &mut timers);

        assert_eq!(submission, Submission::Rejected(NitRejection::NonNumeric));
        assert_eq!(
            orchestrator.error_message(),
            Some("El NIT debe contener solo números")
        );
        assert!(orchestrator.submit_enabled());
    }

    #[test]
    fn valid_input_enters_loading_and_disables_submit() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();

        let ticket = dispatch(&mut orchestrator, &mut timers);

        assert_eq!(ticket.nit.as_str(), "890903938");
        assert_eq!(orchestrator.phase(), &UiPhase::Loading);
        assert!(!orchestrator.submit_enabled());
        assert!(orchestrator.loader_visible());
        assert_eq!(orchestrator.submit("860034313", &mut timers), Submission::Busy);
    }

    #[test]
    fn failure_surfaces_detail_and_reenables_submit() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();
        let ticket = dispatch(&mut orchestrator, &mut timers);

        let completion = orchestrator.complete(
            ticket,
            Err(LookupError::Service {
                status: 404,
                detail: "NIT no encontrado".to_string(),
            }),
            &mut timers,
        );

        assert!(matches!(completion, Completion::Failed(_)));
        assert_eq!(orchestrator.error_message(), Some("NIT no encontrado"));
        assert!(orchestrator.submit_enabled());
        assert!(!orchestrator.loader_visible());
    }

    #[test]
    fn error_clears_after_five_seconds() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();
        orchestrator.submit("12345", &mut timers);

        fire_until(&mut orchestrator, &mut timers, Duration::from_millis(4_999));
        assert!(orchestrator.error_message().is_some());

        fire_until(&mut orchestrator, &mut timers, Duration::from_secs(5));
        assert_eq!(orchestrator.phase(), &UiPhase::Idle);
    }

    #[test]
    fn new_error_restarts_the_dismiss_timer() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();
        orchestrator.submit("12345", &mut timers);

        fire_until(&mut orchestrator, &mut timers, Duration::from_secs(3));
        orchestrator.submit("abc", &mut timers);

        fire_until(&mut orchestrator, &mut timers, Duration::from_secs(6));
        assert_eq!(
            orchestrator.error_message(),
            Some("El NIT debe contener solo números")
        );

        fire_until(&mut orchestrator, &mut timers, Duration::from_secs(8));
        assert_eq!(orchestrator.phase(), &UiPhase::Idle);
    }

    #[test]
    fn resubmitting_clears_error_immediately() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();
        orchestrator.submit("12345", &mut timers);
        assert!(orchestrator.error_message().is_some());

        dispatch(&mut orchestrator, &mut timers);

        assert_eq!(orchestrator.phase(), &UiPhase::Loading);
        assert!(timers.is_empty(), "dismiss timer must be cancelled");
    }

    #[test]
    fn any_submit_during_loading_is_busy() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();
        let first = dispatch(&mut orchestrator, &mut timers);

        assert_eq!(orchestrator.submit("abc", &mut timers), Submission::Busy);
        assert_eq!(orchestrator.submit("860034313", &mut timers), Submission::Busy);
        assert_eq!(orchestrator.phase(), &UiPhase::Loading);
        assert!(timers.is_empty(), "no dismiss timer while loading");

        let completion = orchestrator.complete(
            first,
            Err(LookupError::Transport("timeout".to_string())),
            &mut timers,
        );
        assert!(matches!(completion, Completion::Failed(_)));
    }

    #[test]
    fn repeated_completion_of_a_ticket_is_stale() {
        let mut timers = TimerQueue::new();
        let mut orchestrator = RequestOrchestrator::default();
        let ticket = dispatch(&mut orchestrator, &mut timers);

        orchestrator.complete(
            ticket.clone(),
            Err(LookupError::Status(500)),
            &mut timers,
        );
        let again = orchestrator.complete(
            ticket,
            Err(LookupError::Transport("late".to_string())),
            &mut timers,
        );

        assert_eq!(again, Completion::Stale);
        assert_eq!(
            orchestrator.error_message(),
            Some("Error al realizar la consulta. Por favor intenta de nuevo.")
        );
    }
}
