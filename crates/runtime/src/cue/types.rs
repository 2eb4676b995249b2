//! Cue data types.

use std::time::Duration;

use duel_core::Side;
use serde::{Deserialize, Serialize};

/// Ordering class of a cue. Higher classes jump ahead of lower ones.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CuePriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// How long a cue stays on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CueDuration {
    /// Use the queue's default duration.
    #[default]
    Default,
    /// Shown and retired in the same step.
    Instant,
    /// Explicit duration. Non-finite or non-positive values fall back to the
    /// queue default.
    Millis(f64),
}

impl CueDuration {
    /// Resolves to a concrete duration; `Duration::ZERO` only for `Instant`.
    pub fn resolve(self, default: Duration) -> Duration {
        match self {
            Self::Default => default,
            Self::Instant => Duration::ZERO,
            Self::Millis(ms) if ms.is_finite() && ms > 0.0 => {
                Duration::from_millis(ms.ceil() as u64)
            }
            Self::Millis(_) => default,
        }
    }
}

/// A transient presentation notice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Free-form category used by presenters (`"hit"`, `"status"`, `"turn"`...).
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Side the cue is about, if any.
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub duration: CueDuration,
    /// `None` enqueues at `Normal`.
    #[serde(default)]
    pub priority: Option<CuePriority>,
    /// Cues sharing a key collapse into one within the merge window.
    #[serde(default)]
    pub merge_key: Option<String>,
    /// `None` or negative falls back to the queue default.
    #[serde(default)]
    pub merge_window_ms: Option<i64>,
    /// Interrupt an active cue of strictly lower priority.
    #[serde(default)]
    pub preempt: bool,
    /// Ignore the deferral predicate.
    #[serde(default)]
    pub bypass_deferral: bool,
}

impl Cue {
    pub fn new(kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            subtitle: None,
            icon: None,
            side: None,
            duration: CueDuration::Default,
            priority: None,
            merge_key: None,
            merge_window_ms: None,
            preempt: false,
            bypass_deferral: false,
        }
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn for_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: CueDuration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: CuePriority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn merging(mut self, key: impl Into<String>) -> Self {
        self.merge_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_merge_window_ms(mut self, window: i64) -> Self {
        self.merge_window_ms = Some(window);
        self
    }

    #[must_use]
    pub fn preempting(mut self) -> Self {
        self.preempt = true;
        self
    }

    #[must_use]
    pub fn bypassing_deferral(mut self) -> Self {
        self.bypass_deferral = true;
        self
    }

    pub(crate) fn merge_window(&self, default: Duration) -> Duration {
        match self.merge_window_ms {
            Some(ms) if ms >= 0 => Duration::from_millis(ms.unsigned_abs()),
            _ => default,
        }
    }
}

/// A cue waiting in the pending list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueuedCue {
    /// Monotonic sequence number assigned on enqueue.
    pub seq: u64,
    pub cue: Cue,
    pub priority: CuePriority,
    pub duration: Duration,
    pub merge_window: Duration,
    /// Clock reading (ms) when the cue was enqueued.
    pub queued_at: u64,
    /// Number of cues merged into this one, itself included.
    pub repeat: u32,
}

/// The cue currently on screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveCue {
    pub seq: u64,
    pub cue: Cue,
    pub priority: CuePriority,
    pub merge_window: Duration,
    /// Clock reading (ms) when the cue was shown.
    pub started_at: u64,
    pub ends_at: u64,
    pub repeat: u32,
}

impl ActiveCue {
    pub(crate) fn start(queued: QueuedCue, now: u64) -> Self {
        let duration_ms = u64::try_from(queued.duration.as_millis()).unwrap_or(u64::MAX);
        Self {
            seq: queued.seq,
            cue: queued.cue,
            priority: queued.priority,
            merge_window: queued.merge_window,
            started_at: now,
            ends_at: now.saturating_add(duration_ms),
            repeat: queued.repeat,
        }
    }
}

/// Why the active cue left the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClearReason {
    /// Its duration ran out (or it was zero).
    Expired,
    Interrupted,
    /// A higher-priority preempting cue took its place.
    Preempted,
    /// The whole queue was cleared.
    Flushed,
}

/// Observable queue transition, delivered to the listener outside the lock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CueEvent {
    Shown { cue: ActiveCue },
    Merged { seq: u64, repeat: u32 },
    Cleared { cue: ActiveCue, reason: ClearReason },
    /// Incoming cue rejected by a full queue, or pending cue flushed by `clear`.
    Dropped { cue: QueuedCue },
    /// Pending cue pushed out to make room for an incoming one.
    Evicted { cue: QueuedCue },
}

impl CueEvent {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Shown { .. } => "shown",
            Self::Merged { .. } => "merged",
            Self::Cleared { .. } => "cleared",
            Self::Dropped { .. } => "dropped",
            Self::Evicted { .. } => "evicted",
        }
    }
}

/// What `enqueue` did with a cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Became the active cue right away (it may already be retired if instant).
    Started { seq: u64 },
    Queued { seq: u64 },
    /// Folded into an existing cue.
    Merged { seq: u64, repeat: u32 },
    Dropped,
}

/// Point-in-time copy of the queue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CueSnapshot {
    pub active: Option<ActiveCue>,
    pub pending: Vec<QueuedCue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_durations_fall_back() {
        let default = Duration::from_millis(1600);
        assert_eq!(CueDuration::Millis(f64::NAN).resolve(default), default);
        assert_eq!(CueDuration::Millis(f64::INFINITY).resolve(default), default);
        assert_eq!(CueDuration::Millis(-5.0).resolve(default), default);
        assert_eq!(CueDuration::Millis(0.0).resolve(default), default);
        assert_eq!(CueDuration::Millis(0.4).resolve(default), Duration::from_millis(1));
        assert_eq!(CueDuration::Instant.resolve(default), Duration::ZERO);
    }

    #[test]
    fn negative_merge_window_uses_default() {
        let default = Duration::from_millis(1200);
        let cue = Cue::new("hit", "Hit").with_merge_window_ms(-1);
        assert_eq!(cue.merge_window(default), default);

        let cue = Cue::new("hit", "Hit").with_merge_window_ms(0);
        assert_eq!(cue.merge_window(default), Duration::ZERO);
    }

    #[test]
    fn priorities_are_ordered() {
        assert!(CuePriority::Critical > CuePriority::High);
        assert!(CuePriority::High > CuePriority::Normal);
        assert!(CuePriority::Normal > CuePriority::Low);
    }
}
