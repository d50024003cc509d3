//! # gather-store
//!
//! The client-side event state synchronization engine.
//!
//! One [`EventStore`] is constructed per session and injected into every
//! consumer. It owns the two shared mutable resources:
//!
//! - **[`EventCache`]**: keyed store of normalized [`EventRecord`]s — the
//!   single source of truth every surface reads from
//! - **[`FeedCache`]**: per-feed paginated id lists with staleness tracking,
//!   resolved against the event cache at read time
//!
//! and the engines that mutate them:
//!
//! - **RSVP reconciliation** ([`EventStore::toggle_rsvp`],
//!   [`EventStore::confirm_payment`]): optimistic update with exact rollback,
//!   permission- and payment-gated flows, per-event in-flight guard
//! - **Merge/sync** ([`EventStore::merge_from_feed`]): last-writer-wins on a
//!   client-assigned logical clock; in-flight records are never clobbered
//! - **Bulk & push handlers** ([`EventStore::remove_attendee`],
//!   [`EventStore::bulk_check_in`], [`EventStore::apply_push_update`])
//!
//! Consumers re-render from the caches via the synchronous subscription API
//! ([`EventStore::subscribe`]). Nothing here persists to disk; `clear()` on
//! session teardown empties everything.

#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod errors;
pub mod event_cache;
pub mod feed_cache;
mod in_flight;
pub mod rsvp;
pub mod store;
pub mod subscription;

mod feeds;
mod handlers;
mod merge;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use errors::{Result, StoreError};
pub use event_cache::EventCache;
pub use feed_cache::{FeedCache, FeedCacheEntry};
pub use gather_core::record::EventRecord;
pub use rsvp::ToggleOutcome;
pub use store::EventStore;
pub use subscription::{StoreEvent, SubscriptionId};
