//! The verb-based client trait the engine consumes.

use async_trait::async_trait;
use gather_core::record::FeedKind;
use gather_core::wire::{
    AttendResponse, BulkCheckInResponse, EventFilters, FeedPage, PaymentProof,
};

use crate::error::Result;

/// One async method per consumed endpoint.
///
/// Implementations return parsed wire types or a structured
/// [`crate::ApiError`]; they never retry on their own and never interpret
/// event semantics — that is the store's job.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// `POST /events/attend/{id}` — direct join.
    async fn attend(&self, event_id: &str) -> Result<AttendResponse>;

    /// `DELETE /events/attend/{id}` — leave.
    async fn leave(&self, event_id: &str) -> Result<AttendResponse>;

    /// `POST /events/request-join/{id}` — approval-required join request.
    async fn request_join(&self, event_id: &str, message: Option<&str>) -> Result<()>;

    /// `POST /events/attend/{id}` with a payment-confirmed marker — join
    /// after an external payment flow completed.
    async fn confirm_attendance(
        &self,
        event_id: &str,
        proof: &PaymentProof,
    ) -> Result<AttendResponse>;

    /// `POST /events/{id}/remove-attendee` — host removes a participant.
    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<()>;

    /// `POST /events/{id}/bulk-checkin` — batch check-in.
    async fn bulk_check_in(
        &self,
        event_id: &str,
        attendee_ids: &[String],
    ) -> Result<BulkCheckInResponse>;

    /// `GET /feed/events?feed&page&limit` — one feed page.
    async fn fetch_feed(&self, kind: FeedKind, page: u32, limit: u32) -> Result<FeedPage>;

    /// `GET /events?...` — filtered event listing.
    async fn fetch_events(&self, filters: &EventFilters) -> Result<FeedPage>;
}
