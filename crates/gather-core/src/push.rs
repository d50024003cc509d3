//! Incremental push updates — the seam for a future real-time transport.
//!
//! No transport is wired today; whatever delivers these (WebSocket, SSE,
//! polling) hands them to the store's `apply_push_update`, which performs
//! the same invariant-preserving mutations as the corresponding direct API
//! calls, without a network round trip. Application is idempotent.

use serde::{Deserialize, Serialize};

use crate::record::EventPatch;

/// A discriminated incremental update for one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PushUpdate {
    /// A user joined the event.
    #[serde(rename_all = "camelCase")]
    AttendeeJoined {
        /// Target event.
        event_id: String,
        /// Joining user.
        user_id: String,
    },
    /// A user left (or was removed from) the event.
    #[serde(rename_all = "camelCase")]
    AttendeeLeft {
        /// Target event.
        event_id: String,
        /// Leaving user.
        user_id: String,
    },
    /// A user was checked in.
    #[serde(rename_all = "camelCase")]
    CheckedIn {
        /// Target event.
        event_id: String,
        /// Checked-in user.
        user_id: String,
    },
    /// Descriptive fields changed.
    #[serde(rename_all = "camelCase")]
    FieldsChanged {
        /// Target event.
        event_id: String,
        /// Shallow field patch.
        changes: EventPatch,
    },
}

impl PushUpdate {
    /// Id of the event this update targets.
    pub fn event_id(&self) -> &str {
        match self {
            Self::AttendeeJoined { event_id, .. }
            | Self::AttendeeLeft { event_id, .. }
            | Self::CheckedIn { event_id, .. }
            | Self::FieldsChanged { event_id, .. } => event_id,
        }
    }
}
