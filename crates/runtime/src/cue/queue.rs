//! Presentation cue queue.
//!
//! One cue is active at a time; the rest wait in a bounded pending list
//! ordered by priority, FIFO within a priority. Cues sharing a merge key
//! collapse into one while the earlier cue's merge window is open. The queue
//! never blocks and never fails: invalid durations and windows fall back to
//! the configured defaults.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::config::CueQueueConfig;
use crate::error::Result;

use super::manual::ManualScheduler;
use super::timer::{Clock, Scheduler, TimerHandle, TokioScheduler};
use super::types::{
    ActiveCue, ClearReason, Cue, CueEvent, CueSnapshot, EnqueueOutcome, QueuedCue,
};

/// Receives queue transitions after the queue lock is released.
pub trait CueListener: Send + Sync {
    fn on_cue_event(&self, event: &CueEvent);
}

impl<F> CueListener for F
where
    F: Fn(&CueEvent) + Send + Sync,
{
    fn on_cue_event(&self, event: &CueEvent) {
        self(event)
    }
}

/// Returns `true` while cues without `bypass_deferral` must wait.
///
/// Evaluated under the queue lock: it must not call back into the queue.
pub type DeferralPredicate = dyn Fn() -> bool + Send + Sync;

#[derive(Default)]
struct QueueState {
    active: Option<ActiveCue>,
    pending: Vec<QueuedCue>,
    timer: Option<TimerHandle>,
    next_seq: u64,
}

struct Shared {
    config: CueQueueConfig,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    state: Mutex<QueueState>,
    listener: RwLock<Option<Arc<dyn CueListener>>>,
    deferral: RwLock<Option<Arc<DeferralPredicate>>>,
}

/// Handle to a cue queue. Clones share the same queue.
#[derive(Clone)]
pub struct CueQueue {
    shared: Arc<Shared>,
}

impl CueQueue {
    pub fn new(
        config: CueQueueConfig,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                scheduler,
                clock,
                state: Mutex::new(QueueState::default()),
                listener: RwLock::new(None),
                deferral: RwLock::new(None),
            }),
        }
    }

    /// Queue driven by a [`ManualScheduler`] for both timers and time.
    pub fn manual(config: CueQueueConfig, scheduler: &ManualScheduler) -> Self {
        Self::new(
            config,
            Arc::new(scheduler.clone()),
            Arc::new(scheduler.clone()),
        )
    }

    /// Queue driven by the current tokio runtime.
    pub fn tokio(config: CueQueueConfig) -> Result<Self> {
        let scheduler = TokioScheduler::new()?;
        Ok(Self::new(
            config,
            Arc::new(scheduler.clone()),
            Arc::new(scheduler),
        ))
    }

    pub fn config(&self) -> &CueQueueConfig {
        &self.shared.config
    }

    pub fn set_listener(&self, listener: Arc<dyn CueListener>) {
        *self.shared.listener.write() = Some(listener);
    }

    pub fn clear_listener(&self) {
        *self.shared.listener.write() = None;
    }

    /// Installs the deferral predicate. Call [`poke`](Self::poke) once it
    /// stops deferring.
    pub fn set_deferral(&self, predicate: impl Fn() -> bool + Send + Sync + 'static) {
        *self.shared.deferral.write() = Some(Arc::new(predicate));
    }

    pub fn clear_deferral(&self) {
        *self.shared.deferral.write() = None;
    }

    /// Merges, queues, starts or drops `cue`.
    ///
    /// # Order
    ///
    /// 1. Merge into the active cue (same key, inside its window).
    /// 2. Merge into the first pending cue with the key, inside its window.
    /// 3. A `preempt` cue of strictly higher priority ends the active cue.
    /// 4. At capacity, evict the lowest-priority oldest pending cue if the
    ///    incoming priority is at least as high; otherwise drop the incoming.
    /// 5. Insert ahead of the first strictly lower priority, then try to start.
    pub fn enqueue(&self, cue: Cue) -> EnqueueOutcome {
        let mut events = Vec::new();
        let outcome = {
            let mut state = self.shared.state.lock();
            self.shared.enqueue_locked(&mut state, cue, &mut events)
        };
        self.shared.emit(&events);
        outcome
    }

    /// Cancels the timer and empties both the active slot and the pending list.
    pub fn clear(&self) {
        let mut events = Vec::new();
        {
            let mut state = self.shared.state.lock();
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            if let Some(cue) = state.active.take() {
                events.push(CueEvent::Cleared {
                    cue,
                    reason: ClearReason::Flushed,
                });
            }
            events.extend(state.pending.drain(..).map(|cue| CueEvent::Dropped { cue }));
        }
        debug!(target: "runtime::cue", flushed = events.len(), "cue queue cleared");
        self.shared.emit(&events);
    }

    /// Ends the active cue now and starts the next eligible one.
    ///
    /// Returns whether a cue was active.
    pub fn interrupt(&self) -> bool {
        let mut events = Vec::new();
        let interrupted = {
            let mut state = self.shared.state.lock();
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            let interrupted = match state.active.take() {
                Some(cue) => {
                    debug!(target: "runtime::cue", seq = cue.seq, "cue interrupted");
                    events.push(CueEvent::Cleared {
                        cue,
                        reason: ClearReason::Interrupted,
                    });
                    true
                }
                None => false,
            };
            self.shared.start_next(&mut state, &mut events);
            interrupted
        };
        self.shared.emit(&events);
        interrupted
    }

    /// Re-evaluates the deferral predicate without enqueueing.
    pub fn poke(&self) {
        let mut events = Vec::new();
        {
            let mut state = self.shared.state.lock();
            self.shared.start_next(&mut state, &mut events);
        }
        self.shared.emit(&events);
    }

    pub fn snapshot(&self) -> CueSnapshot {
        let state = self.shared.state.lock();
        CueSnapshot {
            active: state.active.clone(),
            pending: state.pending.clone(),
        }
    }

    /// Nothing active and nothing pending.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.state.lock();
        state.active.is_none() && state.pending.is_empty()
    }
}

fn within(now: u64, since: u64, window: Duration) -> bool {
    u128::from(now.saturating_sub(since)) <= window.as_millis()
}

impl Shared {
    fn is_deferred(&self) -> bool {
        let predicate = self.deferral.read().clone();
        predicate.is_some_and(|deferred| deferred())
    }

    fn emit(&self, events: &[CueEvent]) {
        if events.is_empty() {
            return;
        }
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            for event in events {
                listener.on_cue_event(event);
            }
        }
    }

    fn enqueue_locked(
        self: &Arc<Self>,
        state: &mut QueueState,
        cue: Cue,
        events: &mut Vec<CueEvent>,
    ) -> EnqueueOutcome {
        let now = self.clock.now_ms();

        if let Some(key) = cue.merge_key.as_deref() {
            let same_key = |other: &Cue| other.merge_key.as_deref() == Some(key);

            if let Some(active) = state
                .active
                .as_mut()
                .filter(|active| same_key(&active.cue) && within(now, active.started_at, active.merge_window))
            {
                active.repeat += 1;
                trace!(target: "runtime::cue", seq = active.seq, repeat = active.repeat, key, "merged into active cue");
                events.push(CueEvent::Merged {
                    seq: active.seq,
                    repeat: active.repeat,
                });
                return EnqueueOutcome::Merged {
                    seq: active.seq,
                    repeat: active.repeat,
                };
            }

            if let Some(queued) = state
                .pending
                .iter_mut()
                .find(|queued| same_key(&queued.cue) && within(now, queued.queued_at, queued.merge_window))
            {
                queued.repeat += 1;
                trace!(target: "runtime::cue", seq = queued.seq, repeat = queued.repeat, key, "merged into pending cue");
                events.push(CueEvent::Merged {
                    seq: queued.seq,
                    repeat: queued.repeat,
                });
                return EnqueueOutcome::Merged {
                    seq: queued.seq,
                    repeat: queued.repeat,
                };
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let priority = cue.priority.unwrap_or_default();
        let queued = QueuedCue {
            seq,
            priority,
            duration: cue.duration.resolve(self.config.default_duration),
            merge_window: cue.merge_window(self.config.default_merge_window),
            queued_at: now,
            repeat: 1,
            cue,
        };

        // Admission comes first: a dropped cue must not disturb the active one.
        if state.pending.len() >= self.config.max_pending.max(1) {
            let victim = state
                .pending
                .iter()
                .enumerate()
                .min_by_key(|(_, pending)| (pending.priority, pending.seq))
                .map(|(index, pending)| (index, pending.priority));

            match victim {
                Some((index, lowest)) if priority >= lowest => {
                    let cue = state.pending.remove(index);
                    debug!(target: "runtime::cue", seq = cue.seq, by = seq, "pending cue evicted");
                    events.push(CueEvent::Evicted { cue });
                }
                _ => {
                    debug!(target: "runtime::cue", seq, kind = %queued.cue.kind, "cue dropped, queue full");
                    events.push(CueEvent::Dropped { cue: queued });
                    return EnqueueOutcome::Dropped;
                }
            }
        }

        let may_start = queued.cue.bypass_deferral || !self.is_deferred();
        if queued.cue.preempt
            && may_start
            && state
                .active
                .as_ref()
                .is_some_and(|active| priority > active.priority)
        {
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            if let Some(cue) = state.active.take() {
                debug!(target: "runtime::cue", seq = cue.seq, by = seq, "cue preempted");
                events.push(CueEvent::Cleared {
                    cue,
                    reason: ClearReason::Preempted,
                });
            }
        }

        let index = state
            .pending
            .iter()
            .position(|pending| pending.priority < priority)
            .unwrap_or(state.pending.len());
        trace!(target: "runtime::cue", seq, kind = %queued.cue.kind, index, "cue queued");
        state.pending.insert(index, queued);

        self.start_next(state, events);

        if state.pending.iter().any(|pending| pending.seq == seq) {
            EnqueueOutcome::Queued { seq }
        } else {
            EnqueueOutcome::Started { seq }
        }
    }

    /// Fills the active slot from the pending list. Instant cues are shown
    /// and retired in place so they never hold up the next one.
    fn start_next(self: &Arc<Self>, state: &mut QueueState, events: &mut Vec<CueEvent>) {
        while state.active.is_none() {
            let deferred = self.is_deferred();
            let Some(index) = state
                .pending
                .iter()
                .position(|pending| !deferred || pending.cue.bypass_deferral)
            else {
                if deferred && !state.pending.is_empty() {
                    trace!(target: "runtime::cue", pending = state.pending.len(), "cues deferred");
                }
                break;
            };

            let queued = state.pending.remove(index);
            let duration = queued.duration;
            let active = ActiveCue::start(queued, self.clock.now_ms());
            debug!(
                target: "runtime::cue",
                seq = active.seq,
                kind = %active.cue.kind,
                title = %active.cue.title,
                repeat = active.repeat,
                "cue shown"
            );
            events.push(CueEvent::Shown {
                cue: active.clone(),
            });

            if duration.is_zero() {
                events.push(CueEvent::Cleared {
                    cue: active,
                    reason: ClearReason::Expired,
                });
                continue;
            }

            let seq = active.seq;
            let weak: Weak<Shared> = Arc::downgrade(self);
            state.timer = Some(self.scheduler.schedule(
                duration,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.expire(seq);
                    }
                }),
            ));
            state.active = Some(active);
        }
    }

    fn expire(self: &Arc<Self>, seq: u64) {
        let mut events = Vec::new();
        {
            let mut state = self.state.lock();
            if state.active.as_ref().is_none_or(|active| active.seq != seq) {
                return;
            }
            state.timer = None;
            if let Some(cue) = state.active.take() {
                trace!(target: "runtime::cue", seq, "cue expired");
                events.push(CueEvent::Cleared {
                    cue,
                    reason: ClearReason::Expired,
                });
            }
            self.start_next(&mut state, &mut events);
        }
        self.emit(&events);
    }
}
