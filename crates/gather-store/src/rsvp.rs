//! RSVP reconciliation — optimistic toggle with exact rollback.
//!
//! Conceptual state machine per event:
//! `NotAttending → OptimisticJoining → {Attending | NotAttending | RequestPending}`
//! and symmetrically `Attending → OptimisticLeaving → {NotAttending | Attending}`.
//! The optimistic leg applies synchronously before the network call; the
//! pre-toggle snapshot is restored bit-for-bit on any failure.
//!
//! Expected rejections never propagate as `Err` — callers branch on the
//! [`ToggleOutcome`] tagged union. Only an unhydrated event id is an error.

use metrics::counter;
use tracing::{debug, instrument, warn};

use gather_api::ApiError;
use gather_core::normalize::reconcile_attend;
use gather_core::record::{EventRecord, Pricing};
use gather_core::wire::PaymentProof;

use crate::errors::{Result, StoreError};
use crate::store::EventStore;

/// Outcome of an RSVP action.
#[derive(Clone, Debug, PartialEq)]
pub enum ToggleOutcome {
    /// Joined; the cache reflects confirmed (or kept-optimistic) membership.
    Attended,
    /// Left the event.
    Left,
    /// Approval-required event: a join request was issued. Membership is
    /// unchanged; `join_request_pending` is set on the record.
    Requested,
    /// A payment flow must complete first; no network call was made. Route
    /// the user to payment, then call
    /// [`EventStore::confirm_payment`].
    PaymentRequired {
        /// Pricing descriptor, from the record or the server's 402 payload.
        pricing: Option<Pricing>,
    },
    /// Another RSVP operation for this event is still in flight; the call
    /// was rejected synchronously without touching the cache.
    Busy,
    /// The server refused the actor (HTTP 403); rolled back.
    Denied {
        /// Server-provided message.
        message: String,
    },
    /// Transport or validation failure; rolled back.
    Failed(ApiError),
}

impl ToggleOutcome {
    /// Whether the action took effect (including an issued join request).
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Attended | Self::Left | Self::Requested)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Attended => "attended",
            Self::Left => "left",
            Self::Requested => "requested",
            Self::PaymentRequired { .. } => "payment_required",
            Self::Busy => "busy",
            Self::Denied { .. } => "denied",
            Self::Failed(_) => "failed",
        }
    }
}

impl EventStore {
    /// Toggle the session user's attendance for `event_id`.
    ///
    /// The record must already be hydrated in the cache; operating on an
    /// unknown id is a programmer error. `join_message` rides along on the
    /// request-to-join path and is ignored otherwise.
    #[instrument(skip(self, join_message))]
    pub async fn toggle_rsvp(
        &self,
        event_id: &str,
        join_message: Option<&str>,
    ) -> Result<ToggleOutcome> {
        let Some(_guard) = self.in_flight.try_begin(event_id) else {
            debug!(event_id, "toggle rejected, rsvp already in flight");
            counter!("gather_rsvp_outcomes_total", "outcome" => "busy").increment(1);
            return Ok(ToggleOutcome::Busy);
        };

        let snapshot = self
            .events
            .get(event_id)
            .ok_or_else(|| StoreError::NotHydrated {
                event_id: event_id.to_string(),
            })?;

        let outcome = if snapshot.is_attending {
            self.leave_flow(event_id, &snapshot).await
        } else {
            self.join_flow(event_id, &snapshot, join_message).await
        };
        counter!("gather_rsvp_outcomes_total", "outcome" => outcome.label()).increment(1);
        Ok(outcome)
    }

    /// Join after an external payment flow completed. Performs the direct
    /// join with a payment-confirmed marker; on success the record carries
    /// `is_attending = true` and `user_has_paid = true`.
    #[instrument(skip(self, proof))]
    pub async fn confirm_payment(
        &self,
        event_id: &str,
        proof: &PaymentProof,
    ) -> Result<ToggleOutcome> {
        let Some(_guard) = self.in_flight.try_begin(event_id) else {
            counter!("gather_rsvp_outcomes_total", "outcome" => "busy").increment(1);
            return Ok(ToggleOutcome::Busy);
        };

        let snapshot = self
            .events
            .get(event_id)
            .ok_or_else(|| StoreError::NotHydrated {
                event_id: event_id.to_string(),
            })?;

        let user = self.current_user.clone();
        let _ = self.events.mutate(event_id, |record| {
            let _ = record.apply_join(&user);
            record.is_attending = true;
            record.user_has_paid = true;
        });

        let outcome = match self.api.confirm_attendance(event_id, proof).await {
            Ok(resp) => {
                let _ = self.events.mutate(event_id, |record| {
                    reconcile_attend(record, &resp, &user);
                    record.is_attending = true;
                    record.user_has_paid = true;
                });
                ToggleOutcome::Attended
            }
            Err(err) => {
                self.rollback(event_id, snapshot.clone());
                classify(err, &snapshot)
            }
        };
        counter!("gather_rsvp_outcomes_total", "outcome" => outcome.label()).increment(1);
        Ok(outcome)
    }

    async fn join_flow(
        &self,
        event_id: &str,
        snapshot: &EventRecord,
        join_message: Option<&str>,
    ) -> ToggleOutcome {
        if snapshot.permissions.approval_required {
            // A request is not membership: the count stays put, only the
            // pending flag is set optimistically.
            let _ = self
                .events
                .mutate(event_id, |record| record.join_request_pending = true);
            return match self.api.request_join(event_id, join_message).await {
                Ok(()) => ToggleOutcome::Requested,
                Err(err) => {
                    self.rollback(event_id, snapshot.clone());
                    classify(err, snapshot)
                }
            };
        }

        let payment_gated = snapshot
            .pricing
            .as_ref()
            .is_some_and(Pricing::requires_payment)
            && !snapshot.user_has_paid;
        if payment_gated {
            // Gated before the optimistic patch: no membership endpoint is
            // called and the record is left untouched.
            return ToggleOutcome::PaymentRequired {
                pricing: snapshot.pricing.clone(),
            };
        }

        let user = self.current_user.clone();
        let _ = self.events.mutate(event_id, |record| {
            let _ = record.apply_join(&user);
            record.is_attending = true;
        });
        match self.api.attend(event_id).await {
            Ok(resp) => {
                let _ = self
                    .events
                    .mutate(event_id, |record| reconcile_attend(record, &resp, &user));
                ToggleOutcome::Attended
            }
            Err(err) => {
                self.rollback(event_id, snapshot.clone());
                classify(err, snapshot)
            }
        }
    }

    async fn leave_flow(&self, event_id: &str, snapshot: &EventRecord) -> ToggleOutcome {
        let user = self.current_user.clone();
        let _ = self.events.mutate(event_id, |record| {
            let _ = record.apply_leave(&user);
            record.is_attending = false;
        });
        match self.api.leave(event_id).await {
            Ok(resp) => {
                let _ = self
                    .events
                    .mutate(event_id, |record| reconcile_attend(record, &resp, &user));
                ToggleOutcome::Left
            }
            Err(err) => {
                self.rollback(event_id, snapshot.clone());
                classify(err, snapshot)
            }
        }
    }

    /// Restore the pre-mutation snapshot exactly (fields and timestamp).
    fn rollback(&self, event_id: &str, snapshot: EventRecord) {
        warn!(event_id, "rolling back optimistic rsvp mutation");
        counter!("gather_rsvp_rollbacks_total").increment(1);
        self.events.restore(snapshot);
    }
}

/// Map a transport error to the caller-facing outcome. The cache has
/// already been rolled back by the time this runs.
fn classify(err: ApiError, snapshot: &EventRecord) -> ToggleOutcome {
    match err {
        ApiError::PermissionDenied { message } => ToggleOutcome::Denied { message },
        ApiError::PaymentRequired { pricing } => ToggleOutcome::PaymentRequired {
            pricing: pricing.or_else(|| snapshot.pricing.clone()),
        },
        other => ToggleOutcome::Failed(other),
    }
}
