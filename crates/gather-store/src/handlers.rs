//! Host bulk operations and the push-update ingestion point.

use metrics::counter;
use tracing::{debug, instrument};

use gather_core::push::PushUpdate;

use crate::errors::{Result, StoreError};
use crate::store::EventStore;

impl EventStore {
    /// Host removes a participant. The cache is only touched after the
    /// server confirms — there is no optimistic leg to roll back.
    #[instrument(skip(self))]
    pub async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<()> {
        if self.events.get(event_id).is_none() {
            return Err(StoreError::NotHydrated {
                event_id: event_id.to_string(),
            });
        }
        self.api.remove_attendee(event_id, user_id).await?;
        let current_user = self.current_user.clone();
        let _ = self.events.mutate(event_id, |record| {
            let _ = record.apply_leave(user_id);
            if user_id == current_user {
                record.is_attending = false;
            }
        });
        Ok(())
    }

    /// Batch check-in. The server may apply a subset; only the ids it
    /// confirms (falling back to the request on silence) are unioned in,
    /// and the count is recomputed from the set — never from the request
    /// payload length. Returns the record's new checked-in count.
    #[instrument(skip(self, attendee_ids), fields(requested = attendee_ids.len()))]
    pub async fn bulk_check_in(&self, event_id: &str, attendee_ids: &[String]) -> Result<usize> {
        if self.events.get(event_id).is_none() {
            return Err(StoreError::NotHydrated {
                event_id: event_id.to_string(),
            });
        }
        let resp = self.api.bulk_check_in(event_id, attendee_ids).await?;
        let applied = resp
            .checked_in
            .unwrap_or_else(|| attendee_ids.to_vec());
        let new_count = self
            .events
            .mutate(event_id, |record| {
                for user_id in &applied {
                    let _ = record.apply_check_in(user_id);
                }
                record.checked_in_count
            })
            .unwrap_or(0);
        Ok(new_count)
    }

    /// Ingest an externally delivered incremental update — the seam for a
    /// future real-time transport. Applies the same invariant-preserving
    /// mutations as the corresponding direct API calls, without a network
    /// call. Idempotent: applying the same update twice yields the same
    /// state. Updates for unknown events are dropped.
    pub fn apply_push_update(&self, update: &PushUpdate) {
        let event_id = update.event_id();
        let current_user = self.current_user.clone();
        let applied = self.events.mutate(event_id, |record| match update {
            PushUpdate::AttendeeJoined { user_id, .. } => {
                let _ = record.apply_join(user_id);
                if *user_id == current_user {
                    record.is_attending = true;
                }
            }
            PushUpdate::AttendeeLeft { user_id, .. } => {
                // Only a known member is removed. An unknown id on a
                // scalar-count-only record waits for the next hydration,
                // so a replayed update cannot drift the count.
                if record.attendee_ids.contains(user_id.as_str()) {
                    let _ = record.apply_leave(user_id);
                }
                if *user_id == current_user {
                    record.is_attending = false;
                }
            }
            PushUpdate::CheckedIn { user_id, .. } => {
                let _ = record.apply_check_in(user_id);
            }
            PushUpdate::FieldsChanged { changes, .. } => {
                let _ = record.apply_patch(changes);
            }
        });
        match applied {
            Some(()) => counter!("gather_push_updates_total").increment(1),
            None => debug!(event_id, "push update for unknown event dropped"),
        }
    }
}
