use std::time::Duration;

use super::domain::ComplianceScore;
use super::timers::{TimerHandle, TimerQueue, TimerSchedule};

pub const FRAME_INTERVAL: Duration = Duration::from_millis(30);
pub const FRAME_COUNT: u32 = 30;

/// Finite frame sequence counting from zero up to a target score.
///
/// Frame `k` shows `round(target * k / 30)`, so the last frame is exactly the
/// target and values never decrease.
#[derive(Debug, Clone)]
pub struct ScoreAnimation {
    target: u8,
    frame: u32,
}

impl ScoreAnimation {
    pub fn new(target: ComplianceScore) -> Self {
        Self {
            target: target.value(),
            frame: 0,
        }
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= FRAME_COUNT
    }

    fn value_at(&self, frame: u32) -> u8 {
        let scaled = u32::from(self.target) * frame * 2 + FRAME_COUNT;
        let value = scaled / (FRAME_COUNT * 2);
        u8::try_from(value).unwrap_or(self.target).min(self.target)
    }
}

impl Iterator for ScoreAnimation {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }
        self.frame += 1;
        Some(self.value_at(self.frame))
    }
}

/// Drives a single on-screen score; a new start supersedes any running one.
#[derive(Debug, Default)]
pub struct ScoreAnimator {
    active: Option<(TimerHandle, ScoreAnimation)>,
    displayed: u8,
}

impl ScoreAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> u8 {
        self.displayed
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn owns(&self, handle: TimerHandle) -> bool {
        matches!(self.active, Some((active, _)) if active == handle)
    }

    /// Cancels the previous animation, resets the display to zero, and
    /// schedules the frame timer.
    pub fn start(&mut self, target: ComplianceScore, timers: &mut TimerQueue) -> TimerHandle {
        self.cancel(timers);
        let handle = timers.start(TimerSchedule::Every(FRAME_INTERVAL));
        self.active = Some((handle, ScoreAnimation::new(target)));
        self.displayed = 0;
        tracing::debug!(score = target.value(), "score animation started");
        handle
    }

    /// Stops frame emission; the displayed value stays where it was.
    pub fn cancel(&mut self, timers: &mut TimerQueue) -> bool {
        match self.active.take() {
            Some((handle, _)) => timers.cancel(handle),
            None => false,
        }
    }

    /// Advances one frame for `handle`. Ticks from superseded timers yield
    /// `None` and leave the display untouched.
    pub fn on_tick(&mut self, handle: TimerHandle, timers: &mut TimerQueue) -> Option<u8> {
        let (active, animation) = self.active.as_mut()?;
        if *active != handle {
            return None;
        }

        let value = animation.next()?;
        self.displayed = value;

        if animation.is_finished() {
            timers.cancel(handle);
            self.active = None;
        }
        Some(value)
    }
}
