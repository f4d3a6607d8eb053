//! Cancellable timers over a virtual clock.
//!
//! The queue never sleeps. A driver either advances it with wall-clock time
//! (see the CLI) or steps it manually in tests.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSchedule {
    /// Fires once after the delay and is then discarded.
    Once(Duration),
    /// Fires every period until cancelled.
    Every(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub handle: TimerHandle,
    pub at: Duration,
}

#[derive(Debug)]
struct TimerEntry {
    handle: TimerHandle,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the queue was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn start(&mut self, schedule: TimerSchedule) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let (delay, period) = match schedule {
            TimerSchedule::Once(delay) => (delay, None),
            // A zero period would never let the clock move forward.
            TimerSchedule::Every(period) => {
                let period = period.max(Duration::from_millis(1));
                (period, Some(period))
            }
        };

        self.entries.push(TimerEntry {
            handle,
            due: self.now + delay,
            period,
        });
        handle
    }

    /// Returns `true` when the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        before != self.entries.len()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Repeating timers are rescheduled one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerFired> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.handle))
            .map(|(index, _)| index)?;

        let entry = &mut self.entries[index];
        let fired = TimerFired {
            handle: entry.handle,
            at: entry.due,
        };
        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.swap_remove(index);
            }
        }

        self.now = self.now.max(fired.at);
        Some(fired)
    }

    /// Moves the clock forward without firing anything; callers drain
    /// [`TimerQueue::pop_due`] first.
    pub fn settle(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }
}
