//! Store error types.
//!
//! Expected RSVP failure modes (`Busy`, permission, payment) are *not*
//! errors — they travel inside [`crate::ToggleOutcome`] so callers branch
//! explicitly. `Err` is reserved for programmer errors and for operations
//! whose transport failures have nothing to roll back.

use thiserror::Error;

use gather_api::ApiError;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Operation on an event the cache has never seen. Programmer error:
    /// the caller must upsert a hydrated record first.
    #[error("event {event_id} is not hydrated in the cache")]
    NotHydrated {
        /// The unknown event id.
        event_id: String,
    },

    /// Transport failure propagated from the API layer.
    #[error(transparent)]
    Api(#[from] ApiError),
}
