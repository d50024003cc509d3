//! Keyed store of normalized event records.
//!
//! Single source of truth for every consumer. Reads hand out cloned
//! snapshots — cached records are never exposed by reference, so no consumer
//! can mutate shared state outside the defined contracts. Every mutating
//! call notifies subscribers synchronously after the cache lock is released.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use gather_core::normalize::normalize_event;
use gather_core::record::{EventPatch, EventRecord, FilterPreset};
use gather_core::wire::RawEvent;

use crate::clock::Clock;
use crate::subscription::{StoreEvent, Subscribers};

/// Keyed cache of [`EventRecord`]s.
pub struct EventCache {
    records: Mutex<HashMap<String, EventRecord>>,
    subscribers: Arc<Subscribers>,
    clock: Arc<dyn Clock>,
}

impl EventCache {
    pub(crate) fn new(subscribers: Arc<Subscribers>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            subscribers,
            clock,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation contract
    // ─────────────────────────────────────────────────────────────────────

    /// Normalize and insert or replace many records, computing user-relative
    /// fields against `current_user`. Returns the affected ids.
    pub fn upsert_many(&self, raws: &[RawEvent], current_user: &str) -> Vec<String> {
        let now_ms = self.clock.now_ms();
        let mut ids = Vec::with_capacity(raws.len());
        {
            let mut records = self.records.lock();
            for raw in raws {
                let mut record = normalize_event(raw, current_user, now_ms);
                record.updated_at = now_ms;
                ids.push(record.id.clone());
                let _ = records.insert(record.id.clone(), record);
            }
        }
        if !ids.is_empty() {
            self.subscribers
                .notify(&StoreEvent::EventsUpserted { ids: ids.clone() });
        }
        ids
    }

    /// Single-record [`Self::upsert_many`].
    pub fn upsert_one(&self, raw: &RawEvent, current_user: &str) {
        let _ = self.upsert_many(std::slice::from_ref(raw), current_user);
    }

    /// Shallow-merge `patch` into an existing record and bump `updated_at`.
    /// A missing id is a silent no-op, not an error. Returns whether a
    /// record was patched.
    pub fn patch(&self, event_id: &str, patch: &EventPatch) -> bool {
        let now_ms = self.clock.now_ms();
        let patched = {
            let mut records = self.records.lock();
            match records.get_mut(event_id) {
                Some(record) => {
                    let _ = record.apply_patch(patch);
                    record.updated_at = now_ms;
                    true
                }
                None => false,
            }
        };
        if patched {
            self.subscribers.notify(&StoreEvent::EventUpdated {
                id: event_id.to_string(),
            });
        } else {
            debug!(event_id, "patch for unknown event ignored");
        }
        patched
    }

    /// Empty the cache. Notification is the store's job so that a session
    /// teardown emits a single `Cleared` for both caches.
    pub(crate) fn clear_silent(&self) {
        self.records.lock().clear();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read contract
    // ─────────────────────────────────────────────────────────────────────

    /// Snapshot of one record.
    pub fn get(&self, event_id: &str) -> Option<EventRecord> {
        self.records.lock().get(event_id).cloned()
    }

    /// Snapshot of every record, ordered by start time then id for stable
    /// iteration.
    pub fn to_vec(&self) -> Vec<EventRecord> {
        let mut records: Vec<EventRecord> = self.records.lock().values().cloned().collect();
        records.sort_by(|a, b| (a.starts_at, &a.id).cmp(&(b.starts_at, &b.id)));
        records
    }

    /// Records matching a named preset, in [`Self::to_vec`] order.
    pub fn filter(&self, preset: FilterPreset) -> Vec<EventRecord> {
        let now_ms = self.clock.now_ms();
        self.to_vec()
            .into_iter()
            .filter(|record| preset.matches(record, now_ms))
            .collect()
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Engine-internal mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Mutate a record in place. When the closure actually changed the
    /// record, `updated_at` is bumped to the current logical clock (never
    /// backwards) and subscribers are notified; a no-op mutation (a replayed
    /// push update, say) leaves the timestamp alone and emits nothing.
    /// Returns `None` when the id is unknown.
    pub(crate) fn mutate<R>(
        &self,
        event_id: &str,
        f: impl FnOnce(&mut EventRecord) -> R,
    ) -> Option<R> {
        let now_ms = self.clock.now_ms();
        let outcome = {
            let mut records = self.records.lock();
            records.get_mut(event_id).map(|record| {
                let before = record.clone();
                let result = f(record);
                let changed = *record != before;
                if changed {
                    record.updated_at = now_ms.max(record.updated_at);
                }
                (result, changed)
            })
        };
        let (result, changed) = outcome?;
        if changed {
            self.subscribers.notify(&StoreEvent::EventUpdated {
                id: event_id.to_string(),
            });
        }
        Some(result)
    }

    /// Replace a record wholesale without touching `updated_at` — rollback
    /// restores the pre-mutation snapshot bit-for-bit.
    pub(crate) fn restore(&self, snapshot: EventRecord) {
        let id = snapshot.id.clone();
        {
            let mut records = self.records.lock();
            let _ = records.insert(id.clone(), snapshot);
        }
        self.subscribers.notify(&StoreEvent::EventUpdated { id });
    }

    /// Insert a record without notifying; the merge engine batches one
    /// notification for the whole page.
    pub(crate) fn insert_silent(&self, record: EventRecord) {
        let _ = self
            .records
            .lock()
            .insert(record.id.clone(), record);
    }
}
