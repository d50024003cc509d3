//! Last-writer-wins merge of server records into the cache.
//!
//! Freshness is decided on the client-assigned `updated_at` logical clock.
//! An incoming record without a timestamp is a server snapshot, treated as
//! at least as fresh as any non-dirty local record. A record with an RSVP
//! operation in flight is never overwritten — that is the bug class where a
//! background feed refresh silently reverts a pending toggle.

use metrics::counter;
use tracing::debug;

use gather_core::normalize::normalize_event;
use gather_core::wire::RawEvent;

use crate::store::EventStore;
use crate::subscription::StoreEvent;

impl EventStore {
    /// Reconcile records arriving from a feed page or a direct fetch.
    /// Returns the ids that were inserted or overwritten.
    pub fn merge_from_feed(&self, raws: &[RawEvent]) -> Vec<String> {
        let now_ms = self.clock.now_ms();
        let mut merged = Vec::with_capacity(raws.len());

        for raw in raws {
            if self.in_flight.contains(&raw.id) {
                counter!("gather_merge_skipped_inflight_total").increment(1);
                debug!(event_id = %raw.id, "merge skipped, rsvp in flight");
                continue;
            }

            let local = self.events.get(&raw.id);
            let fresh_enough = match (&local, raw.updated_at) {
                (None, _) | (Some(_), None) => true,
                (Some(local), Some(incoming)) => incoming >= local.updated_at,
            };
            if !fresh_enough {
                debug!(event_id = %raw.id, "merge skipped, local record is newer");
                continue;
            }

            let mut record = normalize_event(raw, &self.current_user, now_ms);
            if let Some(local) = local {
                // Client-local state the server knows nothing about.
                record.user_has_paid = local.user_has_paid;
                record.join_request_pending = local.join_request_pending;
                // `updated_at` never regresses across a merge.
                record.updated_at = record.updated_at.max(local.updated_at);
            }
            merged.push(record.id.clone());
            self.events.insert_silent(record);
        }

        if !merged.is_empty() {
            self.subscribers.notify(&StoreEvent::EventsUpserted {
                ids: merged.clone(),
            });
        }
        merged
    }
}
