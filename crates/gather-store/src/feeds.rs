//! Feed fetch actions: refresh, load-more, and filtered listings.
//!
//! Fetches merge their records through [`EventStore::merge_from_feed`] and
//! store only ids in the feed cache. A refresh that resolves after a newer
//! one has already replaced the feed is dropped (superseded, not cancelled).

use tracing::{debug, instrument};

use gather_core::record::{EventRecord, FeedKind};
use gather_core::wire::{EventFilters, RawEvent};

use crate::errors::Result;
use crate::feed_cache::FeedCacheEntry;
use crate::store::EventStore;

fn page_ids(events: &[RawEvent]) -> Vec<String> {
    events.iter().map(|e| e.id.clone()).collect()
}

impl EventStore {
    /// Cold start / pull-to-refresh: fetch page zero and replace the feed.
    #[instrument(skip(self))]
    pub async fn refresh_feed(&self, kind: FeedKind) -> Result<FeedCacheEntry> {
        let started_at = self.clock.now_ms();
        let page = self
            .api
            .fetch_feed(kind, 0, self.config.feed_page_size)
            .await?;
        let _ = self.merge_from_feed(&page.events);
        let _ = self
            .feeds
            .replace(kind, page_ids(&page.events), page.has_more, started_at);
        Ok(self.feeds.read(kind))
    }

    /// Fetch the next page and append it. Returns whether more pages remain;
    /// a feed already at its end is a no-op returning `false`.
    #[instrument(skip(self))]
    pub async fn load_more(&self, kind: FeedKind) -> Result<bool> {
        let entry = self.feeds.read(kind);
        if !entry.has_more {
            debug!(feed = kind.as_str(), "load_more on exhausted feed");
            return Ok(false);
        }

        let limit = self.config.feed_page_size.max(1);
        let next_page = (entry.ids.len() as u32).div_ceil(limit);
        let page = self.api.fetch_feed(kind, next_page, limit).await?;
        let _ = self.merge_from_feed(&page.events);
        self.feeds
            .append(kind, page_ids(&page.events), page.has_more);
        Ok(page.has_more)
    }

    /// Filtered listing for discovery surfaces. Records flow through the
    /// same merge as feed pages; results come back in server order.
    #[instrument(skip(self, filters))]
    pub async fn search_events(&self, filters: &EventFilters) -> Result<Vec<EventRecord>> {
        let page = self.api.fetch_events(filters).await?;
        let _ = self.merge_from_feed(&page.events);
        Ok(page
            .events
            .iter()
            .filter_map(|raw| self.events.get(&raw.id))
            .collect())
    }
}
