//! Runtime configuration.
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, RuntimeError};

/// Top-level runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub cue: CueQueueConfig,
    pub event_bus: EventBusConfig,
}

impl RuntimeConfig {
    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CUE_MAX_PENDING` - Pending cue capacity (default: 8, minimum 1)
    /// - `CUE_DEFAULT_DURATION_MS` - Duration of cues that set none (default: 1600)
    /// - `CUE_MERGE_WINDOW_MS` - Merge window of cues that set none (default: 1200)
    /// - `EVENT_BUS_CAPACITY` - Broadcast capacity per topic (default: 100)
    ///
    /// Unset variables keep their defaults; set but unparseable ones are errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(max) = read_env::<usize>("CUE_MAX_PENDING")? {
            config.cue.max_pending = max.max(1);
        }
        if let Some(ms) = read_env::<u64>("CUE_DEFAULT_DURATION_MS")? {
            config.cue.default_duration = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("CUE_MERGE_WINDOW_MS")? {
            config.cue.default_merge_window = Duration::from_millis(ms);
        }
        if let Some(capacity) = read_env::<usize>("EVENT_BUS_CAPACITY")? {
            config.event_bus.capacity = capacity.max(1);
        }

        Ok(config)
    }
}

/// Cue queue tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CueQueueConfig {
    /// Pending cues kept before eviction kicks in. The active cue is not counted.
    pub max_pending: usize,
    /// Used when a cue's own duration is missing, non-finite or non-positive.
    pub default_duration: Duration,
    /// Used when a cue's own merge window is missing or negative.
    pub default_merge_window: Duration,
}

impl CueQueueConfig {
    pub const DEFAULT_MAX_PENDING: usize = 8;
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(1600);
    pub const DEFAULT_MERGE_WINDOW: Duration = Duration::from_millis(1200);
}

impl Default for CueQueueConfig {
    fn default() -> Self {
        Self {
            max_pending: Self::DEFAULT_MAX_PENDING,
            default_duration: Self::DEFAULT_DURATION,
            default_merge_window: Self::DEFAULT_MERGE_WINDOW,
        }
    }
}

/// Event bus tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventBusConfig {
    pub capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

fn read_env<T>(key: &'static str) -> Result<Option<T>>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RuntimeError::InvalidConfig { key, value }),
        Err(_) => Ok(None),
    }
}
