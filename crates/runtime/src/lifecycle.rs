//! Fan-out hub for status lifecycle sinks.
//!
//! The rules layer accepts a single [`LifecycleSink`]. The hub is that sink:
//! it forwards each event to every registered sink, isolating failures so a
//! sink that errors or panics never keeps the event from the others.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use duel_core::{LifecycleSink, SinkError, StatusLifecycleEvent};
use parking_lot::RwLock;
use tracing::warn;

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    sinks: RwLock<Vec<(u64, Arc<dyn LifecycleSink>)>>,
}

/// Registry of lifecycle sinks. Clones share the same registrations.
#[derive(Clone, Default)]
pub struct LifecycleHub {
    inner: Arc<HubInner>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `sink`; it stays registered until the disposer runs.
    #[must_use = "dropping the disposer keeps the sink registered for good"]
    pub fn register(&self, sink: Arc<dyn LifecycleSink>) -> SinkDisposer {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.sinks.write().push((id, sink));
        SinkDisposer {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.sinks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sinks.read().is_empty()
    }
}

impl LifecycleSink for LifecycleHub {
    fn publish(&self, event: &StatusLifecycleEvent) -> Result<(), SinkError> {
        // Snapshot so sinks may register or dispose while being called.
        let sinks: Vec<_> = self.inner.sinks.read().clone();

        for (id, sink) in sinks {
            match catch_unwind(AssertUnwindSafe(|| sink.publish(event))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => warn!(
                    target: "runtime::lifecycle",
                    sink = id,
                    event = event.kind(),
                    %error,
                    "lifecycle sink failed"
                ),
                Err(_) => warn!(
                    target: "runtime::lifecycle",
                    sink = id,
                    event = event.kind(),
                    "lifecycle sink panicked"
                ),
            }
        }
        Ok(())
    }
}

/// Unregisters a sink from the hub it came from.
#[derive(Debug)]
pub struct SinkDisposer {
    hub: Weak<HubInner>,
    id: u64,
}

impl SinkDisposer {
    pub fn dispose(self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.sinks.write().retain(|(id, _)| *id != self.id);
        }
    }
}
