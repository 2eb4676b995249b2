//! Presentation cue queue with injected timers.

mod manual;
mod queue;
mod timer;
mod types;

pub use manual::ManualScheduler;
pub use queue::{CueListener, CueQueue, DeferralPredicate};
pub use timer::{Clock, Scheduler, SystemClock, TimerCallback, TimerHandle, TokioScheduler};
pub use types::{
    ActiveCue, ClearReason, Cue, CueDuration, CueEvent, CuePriority, CueSnapshot, EnqueueOutcome,
    QueuedCue,
};
