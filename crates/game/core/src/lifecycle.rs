//! Status lifecycle observation.
//!
//! The rules layer reports grants, spends, ticks and pending-buff transitions
//! to an optional [`LifecycleSink`]. Sinks are observers: the rules never
//! read anything back, and a failing sink has no effect on the computation.
//! Its errors are collected in a [`SinkFailures`] log for the caller to
//! drain and report.

use std::sync::{Mutex, PoisonError};

use crate::buffs::PendingDefenseBuff;
use crate::state::Side;
use crate::status::{SpendPhase, SpendResult, StatusId, TickPrompt};

/// A single observable status transition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusLifecycleEvent {
    /// Stacks were added, set or removed outside of a spend or tick.
    StacksChanged {
        owner: Option<Side>,
        status: StatusId,
        before: u32,
        after: u32,
    },

    /// A spend went through and consumed stacks.
    Spent {
        owner: Option<Side>,
        status: StatusId,
        phase: SpendPhase,
        cost: u32,
        stacks_after: u32,
        result: SpendResult,
    },

    /// A status ticked at a turn boundary.
    Ticked {
        owner: Option<Side>,
        status: StatusId,
        damage: u32,
        before: u32,
        after: u32,
    },

    /// A tick asked the holder for a follow-up decision.
    PromptRaised {
        owner: Option<Side>,
        prompt: TickPrompt,
    },

    /// A follow-up cleanse roll was resolved.
    CleanseResolved {
        owner: Option<Side>,
        status: StatusId,
        roll: u32,
        cleansed: bool,
    },

    /// A grant was recorded for later activation.
    BuffQueued { buff: PendingDefenseBuff },

    /// A pending buff fired and was committed to its owner's stacks.
    BuffActivated {
        buff: PendingDefenseBuff,
        stacks_after: u32,
    },

    /// A pending buff passed its expiry without firing.
    BuffExpired { buff: PendingDefenseBuff },
}

impl StatusLifecycleEvent {
    /// Short stable name for logs and metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StacksChanged { .. } => "stacks_changed",
            Self::Spent { .. } => "spent",
            Self::Ticked { .. } => "ticked",
            Self::PromptRaised { .. } => "prompt_raised",
            Self::CleanseResolved { .. } => "cleanse_resolved",
            Self::BuffQueued { .. } => "buff_queued",
            Self::BuffActivated { .. } => "buff_activated",
            Self::BuffExpired { .. } => "buff_expired",
        }
    }
}

/// Failure reported by a sink while handling an event.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("lifecycle sink failed: {message}")]
pub struct SinkError {
    pub message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Observer of status lifecycle events.
pub trait LifecycleSink: Send + Sync {
    fn publish(&self, event: &StatusLifecycleEvent) -> Result<(), SinkError>;
}

/// One rejected event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkFailure {
    pub event: &'static str,
    pub error: SinkError,
}

/// Errors returned by a sink, kept until the caller drains them.
#[derive(Debug, Default)]
pub struct SinkFailures {
    failures: Mutex<Vec<SinkFailure>>,
}

impl SinkFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `event` to `sink`, recording the error if it fails.
    pub fn publish(&self, sink: &dyn LifecycleSink, event: &StatusLifecycleEvent) {
        if let Err(error) = sink.publish(event) {
            self.record(event.kind(), error);
        }
    }

    pub fn record(&self, event: &'static str, error: SinkError) {
        self.lock().push(SinkFailure { event, error });
    }

    /// Removes and returns every failure recorded so far.
    pub fn take(&self) -> Vec<SinkFailure> {
        core::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The log only ever holds plain data, so a poisoned lock is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkFailure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
