//! The single boundary where raw server objects become canonical records.
//!
//! User-relative fields (`is_attending`, `is_host`) are always recomputed
//! here against the session user — a server-sent hint is only consulted when
//! no membership array exists to derive from. Downstream code never branches
//! on wire shape.

use std::collections::BTreeSet;

use crate::record::EventRecord;
use crate::wire::{AttendResponse, RawEvent};

/// Convert a raw server event into a canonical [`EventRecord`], computing
/// derived fields relative to `current_user`.
///
/// `now_ms` becomes the record's `updated_at` when the server sent none.
/// Count fields fall back to the known set sizes and never undershoot them,
/// so the record satisfies the cache invariants from birth.
pub fn normalize_event(raw: &RawEvent, current_user: &str, now_ms: i64) -> EventRecord {
    let mut attendee_ids: BTreeSet<String> = raw
        .attendees
        .as_ref()
        .map(|ids| ids.iter().cloned().collect())
        .unwrap_or_default();

    let is_attending = match &raw.attendees {
        Some(_) => attendee_ids.contains(current_user),
        None => raw.is_attending.unwrap_or(false),
    };
    // A positive hint without an array still names one known member.
    if raw.attendees.is_none() && is_attending {
        let _ = attendee_ids.insert(current_user.to_string());
    }

    let checked_in_ids: BTreeSet<String> = raw
        .checked_in
        .as_ref()
        .map(|ids| ids.iter().cloned().collect())
        .unwrap_or_default();
    // Check-ins imply membership.
    for id in &checked_in_ids {
        let _ = attendee_ids.insert(id.clone());
    }

    let attendee_count = match (&raw.attendees, raw.attendee_count) {
        (Some(_), _) => attendee_ids.len(),
        (None, Some(count)) => count.max(attendee_ids.len()),
        (None, None) => attendee_ids.len(),
    };
    let checked_in_count = match (&raw.checked_in, raw.checked_in_count) {
        (Some(_), _) => checked_in_ids.len(),
        (None, Some(count)) => count.max(checked_in_ids.len()),
        (None, None) => checked_in_ids.len(),
    };

    let is_host = raw.host_id == current_user
        || raw.co_host_ids.iter().any(|id| id == current_user);

    EventRecord {
        id: raw.id.clone(),
        host_id: raw.host_id.clone(),
        co_host_ids: raw.co_host_ids.clone(),
        attendee_ids,
        checked_in_ids,
        attendee_count,
        checked_in_count,
        is_attending,
        is_host,
        join_request_pending: false,
        user_has_paid: false,
        permissions: raw.permissions,
        pricing: raw.pricing.clone(),
        title: raw.title.clone(),
        starts_at: raw.starts_at,
        ends_at: raw.ends_at,
        updated_at: raw.updated_at.unwrap_or(now_ms),
    }
}

/// Fold a join/leave confirmation into `record`, preferring the server's
/// authoritative membership over the optimistic local value wherever the
/// response carries one.
pub fn reconcile_attend(record: &mut EventRecord, resp: &AttendResponse, current_user: &str) {
    if let Some(attendees) = &resp.attendees {
        record.attendee_ids = attendees.iter().cloned().collect();
        record.attendee_count = record.attendee_ids.len();
        record.checked_in_ids = record
            .checked_in_ids
            .intersection(&record.attendee_ids)
            .cloned()
            .collect();
        record.checked_in_count = record.checked_in_ids.len();
        record.is_attending = record.attendee_ids.contains(current_user);
    } else if let Some(count) = resp.attendee_count {
        record.attendee_count = count.max(record.attendee_ids.len());
    }
    if let Some(is_attending) = resp.is_attending {
        record.is_attending = is_attending;
    }
    record.join_request_pending = false;
}
