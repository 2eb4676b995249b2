//! Duel runtime: sequencing, observation and presentation around the rules.
//!
//! Modules:
//! - [`session`]: turn controller driving `duel-core` through full turns
//! - [`cue`]: bounded, priority-ordered presentation cue queue on injected timers
//! - [`lifecycle`]: fan-out hub for status lifecycle sinks
//! - [`events`]: topic-based broadcast bus for async consumers
//! - [`sinks`]: tracing and recording sinks
//! - [`config`]: runtime configuration from the environment
pub mod config;
pub mod cue;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod session;
pub mod sinks;

pub use config::{CueQueueConfig, EventBusConfig, RuntimeConfig};
pub use cue::{
    Clock, Cue, CueDuration, CueEvent, CueListener, CuePriority, CueQueue, CueSnapshot,
    EnqueueOutcome, ManualScheduler, Scheduler, SystemClock, TimerHandle, TokioScheduler,
};
pub use error::{Result, RuntimeError};
pub use events::{CombatEvent, Event, EventBus, Topic};
pub use lifecycle::{LifecycleHub, SinkDisposer};
pub use session::{DuelSession, DuelSessionBuilder, TurnReport};
pub use sinks::{RecordingSink, TracingLifecycleSink, TracingStatsSink};
