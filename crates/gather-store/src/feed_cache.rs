//! Per-feed paginated id lists with staleness tracking.
//!
//! Feed entries hold event *ids*, never record copies — consumers resolve
//! them against the [`crate::EventCache`] at read time so attendee counts
//! are always live. Ordering is caller-determined (server page order); the
//! cache never re-sorts.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use parking_lot::Mutex;
use tracing::debug;

use gather_core::record::FeedKind;

use crate::clock::Clock;
use crate::subscription::{StoreEvent, Subscribers};

/// Cached state of one feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedCacheEntry {
    /// Event ids in display order.
    pub ids: Vec<String>,
    /// When this feed was last replaced; `None` if never fetched.
    pub last_fetched_at: Option<i64>,
    /// Whether another page exists.
    pub has_more: bool,
}

impl Default for FeedCacheEntry {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            last_fetched_at: None,
            has_more: true,
        }
    }
}

/// Per-[`FeedKind`] cache of paginated id lists.
pub struct FeedCache {
    feeds: Mutex<HashMap<FeedKind, FeedCacheEntry>>,
    subscribers: Arc<Subscribers>,
    clock: Arc<dyn Clock>,
}

impl FeedCache {
    pub(crate) fn new(subscribers: Arc<Subscribers>, clock: Arc<dyn Clock>) -> Self {
        Self {
            feeds: Mutex::new(HashMap::new()),
            subscribers,
            clock,
        }
    }

    /// Current entry for `kind`. An unpopulated feed reads as empty but
    /// valid (`ids: [], has_more: true, last_fetched_at: None`) — never an
    /// error.
    pub fn read(&self, kind: FeedKind) -> FeedCacheEntry {
        self.feeds.lock().get(&kind).cloned().unwrap_or_default()
    }

    /// Whether `kind` was never fetched or its last fetch is older than
    /// `max_age_ms`.
    pub fn is_stale(&self, kind: FeedKind, max_age_ms: i64) -> bool {
        let now_ms = self.clock.now_ms();
        match self.read(kind).last_fetched_at {
            Some(fetched_at) => now_ms - fetched_at > max_age_ms,
            None => true,
        }
    }

    /// Replace the feed wholesale (cold start / pull-to-refresh), setting
    /// `last_fetched_at` to now.
    ///
    /// `started_at_ms` is the instant the fetch was issued: a result whose
    /// fetch started before the feed was last replaced has been superseded
    /// by a newer refresh and is dropped. Returns whether the replace
    /// applied.
    pub(crate) fn replace(
        &self,
        kind: FeedKind,
        ids: Vec<String>,
        has_more: bool,
        started_at_ms: i64,
    ) -> bool {
        let now_ms = self.clock.now_ms();
        {
            let mut feeds = self.feeds.lock();
            let entry = feeds.entry(kind).or_default();
            if entry.last_fetched_at.is_some_and(|t| t > started_at_ms) {
                counter!("gather_feed_superseded_total").increment(1);
                debug!(feed = kind.as_str(), "dropping superseded feed fetch");
                return false;
            }
            *entry = FeedCacheEntry {
                ids,
                last_fetched_at: Some(now_ms),
                has_more,
            };
        }
        self.subscribers.notify(&StoreEvent::FeedReplaced { kind });
        true
    }

    /// Append a page (load-more). Does not touch `last_fetched_at`. Ids
    /// already present are skipped — server pages can overlap when the feed
    /// shifts between requests.
    pub(crate) fn append(&self, kind: FeedKind, ids: Vec<String>, has_more: bool) {
        {
            let mut feeds = self.feeds.lock();
            let entry = feeds.entry(kind).or_default();
            for id in ids {
                if !entry.ids.contains(&id) {
                    entry.ids.push(id);
                }
            }
            entry.has_more = has_more;
        }
        self.subscribers.notify(&StoreEvent::FeedAppended { kind });
    }

    /// Empty all feeds; the store emits the teardown notification.
    pub(crate) fn clear_silent(&self) {
        self.feeds.lock().clear();
    }
}
