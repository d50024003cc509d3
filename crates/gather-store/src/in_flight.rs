//! Per-event in-flight guard.
//!
//! One RSVP operation may be pending per event. The guard is acquired
//! synchronously before the first await of a toggle, so two back-to-back
//! toggles can never both apply an optimistic patch. The same registry is
//! the "dirty" marker the merge engine checks before overwriting a record.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Registry of event ids with a pending RSVP operation.
#[derive(Default)]
pub(crate) struct InFlight {
    pending: Mutex<HashSet<String>>,
}

impl InFlight {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Try to mark `event_id` as in flight. `None` means an operation is
    /// already pending and the caller must reject with `Busy`.
    pub(crate) fn try_begin(self: &Arc<Self>, event_id: &str) -> Option<InFlightGuard> {
        if self.pending.lock().insert(event_id.to_string()) {
            Some(InFlightGuard {
                registry: Arc::clone(self),
                event_id: event_id.to_string(),
            })
        } else {
            None
        }
    }

    /// Whether `event_id` has a pending operation.
    pub(crate) fn contains(&self, event_id: &str) -> bool {
        self.pending.lock().contains(event_id)
    }
}

/// RAII marker; releases the event on drop, including early error returns.
pub(crate) struct InFlightGuard {
    registry: Arc<InFlight>,
    event_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let _ = self.registry.pending.lock().remove(&self.event_id);
    }
}
