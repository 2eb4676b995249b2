//! Deterministic scheduler for tests and headless replays.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use super::timer::{Clock, Scheduler, TimerCallback, TimerHandle};

struct PendingTimer {
    id: u64,
    due: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualState {
    now: u64,
    next_id: u64,
    timers: Vec<PendingTimer>,
}

/// Scheduler and clock that only move when told to.
///
/// Callbacks run on the caller's thread inside [`advance`](Self::advance),
/// in due order (ties in scheduling order), with the clock set to each
/// timer's due time while it runs.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `by`, firing every timer that comes due.
    pub fn advance(&self, by: Duration) {
        let by_ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let target = self.state.lock().now.saturating_add(by_ms);

        while let Some(callback) = self.pop_due(target) {
            callback();
        }
        let mut state = self.state.lock();
        state.now = state.now.max(target);
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.state.lock().timers.len()
    }

    fn pop_due(&self, target: u64) -> Option<TimerCallback> {
        let mut state = self.state.lock();
        let index = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= target)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(index, _)| index)?;

        let timer = state.timers.remove(index);
        state.now = state.now.max(timer.due);
        Some(timer.callback)
    }

    fn cancel(state: &Weak<Mutex<ManualState>>, id: u64) {
        if let Some(state) = state.upgrade() {
            state.lock().timers.retain(|timer| timer.id != id);
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, after: Duration, callback: TimerCallback) -> TimerHandle {
        let after_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now.saturating_add(after_ms);
        state.timers.push(PendingTimer { id, due, callback });

        let weak = Arc::downgrade(&self.state);
        TimerHandle::new(move || Self::cancel(&weak, id))
    }
}

impl Clock for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.state.lock().now
    }
}
