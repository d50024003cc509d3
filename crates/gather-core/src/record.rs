//! Canonical event records and their invariant-preserving mutations.
//!
//! An [`EventRecord`] is the single cached representation of one event.
//! Membership lives in id sets; the count fields track the *true* server-side
//! sizes, which equal the set sizes whenever the server has sent the full
//! membership array (a "hydrated" record). Every mutation goes through the
//! `apply_*` helpers so the two never drift:
//!
//! - hydrated records keep `attendee_count == |attendee_ids|` exactly;
//! - partially hydrated records (scalar-count-only wire shapes) keep
//!   `attendee_count >= |attendee_ids|`, converging to equality once a
//!   membership array is observed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Policy descriptors
// ─────────────────────────────────────────────────────────────────────────────

/// Who may join an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinPolicy {
    /// Open to anyone.
    #[default]
    Anyone,
    /// Open to the host's followers.
    Followers,
    /// Invitation only.
    InvitedOnly,
}

/// Join/view/share policy for an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    /// Join policy.
    #[serde(default)]
    pub can_join: JoinPolicy,
    /// Whether joining requires host approval (request-to-join flow).
    #[serde(default)]
    pub approval_required: bool,
}

/// Pricing descriptor. Presence of a non-free price gates RSVP into a
/// payment flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    /// Whether attendance is free.
    pub is_free: bool,
    /// Price in minor currency units.
    #[serde(default)]
    pub amount_cents: u64,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency: String,
}

impl Pricing {
    /// Whether this pricing requires payment before a direct join.
    pub fn requires_payment(&self) -> bool {
        !self.is_free
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feed kinds and filter presets
// ─────────────────────────────────────────────────────────────────────────────

/// A paginated feed surface. Each kind has its own cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Events from followed hosts.
    Following,
    /// Server-curated discovery feed.
    Discover,
    /// Geographically nearby events.
    Nearby,
}

impl FeedKind {
    /// Wire name used in query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Following => "following",
            Self::Discover => "discover",
            Self::Nearby => "nearby",
        }
    }
}

/// Named filter presets over the event cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterPreset {
    /// Events the session user is attending.
    Attending,
    /// Events the session user hosts or co-hosts.
    Hosting,
    /// Events that start at or after the given instant.
    Upcoming,
    /// Events that have already ended (or started, when no end is known).
    Past,
    /// Events with a non-free price.
    Paid,
    /// Free events.
    Free,
}

impl FilterPreset {
    /// Whether `record` matches this preset at wall-clock `now_ms`.
    pub fn matches(self, record: &EventRecord, now_ms: i64) -> bool {
        match self {
            Self::Attending => record.is_attending,
            Self::Hosting => record.is_host,
            Self::Upcoming => record
                .starts_at
                .is_some_and(|t| t.timestamp_millis() >= now_ms),
            Self::Past => {
                let boundary = record.ends_at.or(record.starts_at);
                boundary.is_some_and(|t| t.timestamp_millis() < now_ms)
            }
            Self::Paid => record
                .pricing
                .as_ref()
                .is_some_and(Pricing::requires_payment),
            Self::Free => !record
                .pricing
                .as_ref()
                .is_some_and(Pricing::requires_payment),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventRecord
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical cached representation of one event.
///
/// Created on first normalization and updated in place; never deleted
/// individually (only a whole-cache clear on session teardown). Consumers
/// receive cloned snapshots — cached state is never handed out by reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Opaque event id, immutable after creation.
    pub id: String,
    /// Host user id.
    pub host_id: String,
    /// Co-host user ids.
    #[serde(default)]
    pub co_host_ids: Vec<String>,
    /// Known attendee ids. Complete when `attendee_count` equals its size.
    #[serde(default)]
    pub attendee_ids: BTreeSet<String>,
    /// Checked-in attendee ids. Always a subset of `attendee_ids`.
    #[serde(default)]
    pub checked_in_ids: BTreeSet<String>,
    /// True attendee count as last reported or derived.
    pub attendee_count: usize,
    /// True checked-in count as last reported or derived.
    pub checked_in_count: usize,
    /// Whether the session user attends. Recomputed at normalization,
    /// flipped optimistically during an in-flight RSVP.
    pub is_attending: bool,
    /// Whether the session user hosts or co-hosts.
    pub is_host: bool,
    /// Set when an approval-required join request was issued and not yet
    /// resolved by the host.
    #[serde(default)]
    pub join_request_pending: bool,
    /// Set once a payment flow completed for the session user.
    #[serde(default)]
    pub user_has_paid: bool,
    /// Join/view/share policy.
    #[serde(default)]
    pub permissions: Permissions,
    /// Optional pricing; non-free gates RSVP into a payment flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Display title, carried through normalization untouched.
    #[serde(default)]
    pub title: String,
    /// Scheduled start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// Scheduled end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    /// Client-assigned logical timestamp (epoch millis). Merge conflict
    /// resolution only — never a display field.
    pub updated_at: i64,
}

impl EventRecord {
    /// Whether the full membership array has been observed, i.e. the
    /// attendee set is authoritative for the count.
    pub fn is_membership_complete(&self) -> bool {
        self.attendee_count == self.attendee_ids.len()
    }

    /// Add `user_id` to the attendee set, bumping the count when membership
    /// actually changes. Returns whether state changed.
    pub fn apply_join(&mut self, user_id: &str) -> bool {
        if self.attendee_ids.insert(user_id.to_string()) {
            self.attendee_count += 1;
            true
        } else {
            false
        }
    }

    /// Remove `user_id` from membership and check-in. Returns whether state
    /// changed.
    ///
    /// When the member is unknown locally (scalar-count-only record) the
    /// count is still decremented, but never below the number of known
    /// members.
    pub fn apply_leave(&mut self, user_id: &str) -> bool {
        if self.attendee_ids.remove(user_id) {
            self.attendee_count = self.attendee_count.saturating_sub(1);
            if self.checked_in_ids.remove(user_id) {
                self.checked_in_count = self.checked_in_count.saturating_sub(1);
            }
            true
        } else if self.attendee_count > self.attendee_ids.len() {
            self.attendee_count -= 1;
            true
        } else {
            false
        }
    }

    /// Mark `user_id` as checked in. A check-in implies membership, so the
    /// attendee set is updated too. Returns whether state changed.
    pub fn apply_check_in(&mut self, user_id: &str) -> bool {
        let joined = self.apply_join(user_id);
        if self.checked_in_ids.insert(user_id.to_string()) {
            self.checked_in_count += 1;
            true
        } else {
            joined
        }
    }

    /// Shallow-merge `patch` into this record. Returns whether any field
    /// changed.
    pub fn apply_patch(&mut self, patch: &EventPatch) -> bool {
        let mut changed = false;
        if let Some(title) = &patch.title {
            changed |= &self.title != title;
            self.title = title.clone();
        }
        if let Some(starts_at) = patch.starts_at {
            changed |= self.starts_at != Some(starts_at);
            self.starts_at = Some(starts_at);
        }
        if let Some(ends_at) = patch.ends_at {
            changed |= self.ends_at != Some(ends_at);
            self.ends_at = Some(ends_at);
        }
        if let Some(permissions) = patch.permissions {
            changed |= self.permissions != permissions;
            self.permissions = permissions;
        }
        if let Some(pricing) = &patch.pricing {
            changed |= self.pricing.as_ref() != Some(pricing);
            self.pricing = Some(pricing.clone());
        }
        changed
    }

    /// Whether the record currently satisfies the cache invariants:
    /// check-ins are members, counts never undershoot the known sets, and
    /// complete records keep counts equal to set sizes.
    pub fn invariants_hold(&self) -> bool {
        self.checked_in_ids.is_subset(&self.attendee_ids)
            && self.attendee_count >= self.attendee_ids.len()
            && self.checked_in_count >= self.checked_in_ids.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Patches
// ─────────────────────────────────────────────────────────────────────────────

/// Shallow partial update of an [`EventRecord`]'s descriptive fields.
///
/// Membership is deliberately excluded: it only moves through the RSVP,
/// bulk, and push paths, which keep the count invariants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// New end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    /// New permissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    /// New pricing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

impl EventPatch {
    /// Whether the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
