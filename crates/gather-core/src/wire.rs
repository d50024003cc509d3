//! Wire shapes — the duck-typed JSON the server actually sends.
//!
//! The server is inconsistent about event payloads: sometimes an `attendees`
//! array, sometimes only `attendeeCount`, sometimes an `isAttending` hint.
//! These types capture every observed shape; [`crate::normalize`] is the one
//! place that resolves them into a canonical [`crate::record::EventRecord`].
//! Nothing downstream of the normalizer branches on response shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Permissions, Pricing};

/// Raw event object as returned by feed and detail endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Event id.
    pub id: String,
    /// Host user id.
    #[serde(default)]
    pub host_id: String,
    /// Co-host user ids.
    #[serde(default)]
    pub co_host_ids: Vec<String>,
    /// Full attendee id array, when the server sends it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    /// Checked-in id array, when the server sends it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in: Option<Vec<String>>,
    /// Scalar attendee count, when the array is omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_count: Option<usize>,
    /// Scalar checked-in count, when the array is omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_count: Option<usize>,
    /// Server-side attendance hint for the requesting user. Only consulted
    /// when no attendee array is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_attending: Option<bool>,
    /// Join/view/share policy.
    #[serde(default)]
    pub permissions: Permissions,
    /// Pricing descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Scheduled start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// Scheduled end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    /// Server-assigned update timestamp (epoch millis). The production
    /// server does not currently send this; absence means "server snapshot,
    /// at least as fresh as any non-dirty local record".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// One page of a feed or filtered event listing: `{events, hasMore}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    /// Events in server page order.
    #[serde(default)]
    pub events: Vec<RawEvent>,
    /// Whether another page exists.
    #[serde(default)]
    pub has_more: bool,
}

/// Response of the direct join/leave endpoints. Every field is optional —
/// the server may confirm with an authoritative membership list, a bare
/// count, or nothing at all.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendResponse {
    /// Authoritative attendee ids, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    /// Authoritative attendee count, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_count: Option<usize>,
    /// Attendance confirmation for the requesting user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_attending: Option<bool>,
}

/// Response of the batch check-in endpoint.
///
/// `checked_in` lists the ids the server actually applied — it may be a
/// strict subset of the request on partial application.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCheckInResponse {
    /// Ids the server recorded as checked in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in: Option<Vec<String>>,
}

/// Proof handed back by an external payment flow, forwarded verbatim when
/// confirming a paid attendance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Payment provider identifier.
    pub provider: String,
    /// Provider-side transaction reference.
    pub reference: String,
}

/// Query filters for the general event listing endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilters {
    /// Free-text search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Restrict to a host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    /// Only events starting at or after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_after: Option<DateTime<Utc>>,
    /// Page index, zero-based.
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
