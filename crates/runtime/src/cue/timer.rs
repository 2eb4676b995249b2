//! Timer and clock seams for the cue queue.
//!
//! The queue never sleeps. It asks a [`Scheduler`] to call back after a
//! duration and reads time from a [`Clock`], so tests can drive it with
//! [`ManualScheduler`](super::ManualScheduler) and production with
//! [`TokioScheduler`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::error::{Result, RuntimeError};

pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Runs a callback once after a delay.
pub trait Scheduler: Send + Sync {
    /// Schedules `callback`. Cancelling the returned handle guarantees the
    /// callback does not run.
    fn schedule(&self, after: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Monotonic milliseconds since an arbitrary origin.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Cancellation handle for a scheduled callback.
///
/// Dropping the handle leaves the timer running.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Wall clock backed by `std::time::Instant`.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Scheduler that spawns a sleeping task per timer on a tokio runtime.
///
/// Also a [`Clock`] on tokio's time source, so paused-time tests see the
/// same time the timers run on.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
    origin: tokio::time::Instant,
}

impl TokioScheduler {
    /// Binds to the runtime the caller is running in.
    pub fn new() -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| RuntimeError::NoTokioRuntime)?;
        Ok(Self::from_handle(handle))
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, after: Duration, callback: TimerCallback) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let task = self.handle.spawn(async move {
            tokio::time::sleep(after).await;
            if !flag.load(Ordering::Acquire) {
                callback();
            }
        });
        let abort = task.abort_handle();

        TimerHandle::new(move || {
            cancelled.store(true, Ordering::Release);
            abort.abort();
        })
    }
}

impl Clock for TokioScheduler {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn tokio_scheduler_needs_a_runtime() {
        assert!(matches!(
            TokioScheduler::new(),
            Err(RuntimeError::NoTokioRuntime)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_fires_after_delay() {
        let scheduler = TokioScheduler::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let _handle = scheduler.schedule(
            Duration::from_millis(100),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(scheduler.now_ms() >= 110);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_tokio_timer_never_fires() {
        let scheduler = TokioScheduler::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let handle = scheduler.schedule(
            Duration::from_millis(100),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
