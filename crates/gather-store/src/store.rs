//! The per-session state manager facade.
//!
//! One `EventStore` is constructed at sign-in and injected into every
//! consumer (no module-level global); `clear()` at sign-out is the explicit
//! teardown. Consumers read snapshots and subscribe for change notifications;
//! all mutation goes through the action methods defined across the engine
//! modules.

use std::sync::Arc;

use gather_api::ApiClient;
use gather_core::record::{EventRecord, FeedKind, FilterPreset};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::event_cache::EventCache;
use crate::feed_cache::{FeedCache, FeedCacheEntry};
use crate::in_flight::InFlight;
use crate::subscription::{StoreEvent, Subscribers, SubscriptionId};

/// Centralized event state for one signed-in session.
pub struct EventStore {
    pub(crate) api: Arc<dyn ApiClient>,
    pub(crate) events: EventCache,
    pub(crate) feeds: FeedCache,
    pub(crate) in_flight: Arc<InFlight>,
    pub(crate) subscribers: Arc<Subscribers>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: StoreConfig,
    pub(crate) current_user: String,
}

impl EventStore {
    /// Create a store for the given session user, on the system clock.
    pub fn new(api: Arc<dyn ApiClient>, current_user: impl Into<String>, config: StoreConfig) -> Self {
        Self::with_clock(api, current_user, config, Arc::new(SystemClock))
    }

    /// Create a store with an explicit clock (tests drive a
    /// [`crate::ManualClock`]).
    pub fn with_clock(
        api: Arc<dyn ApiClient>,
        current_user: impl Into<String>,
        config: StoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let subscribers = Arc::new(Subscribers::new());
        Self {
            events: EventCache::new(Arc::clone(&subscribers), Arc::clone(&clock)),
            feeds: FeedCache::new(Arc::clone(&subscribers), Arc::clone(&clock)),
            in_flight: InFlight::new(),
            subscribers,
            clock,
            api,
            config,
            current_user: current_user.into(),
        }
    }

    /// The session user id all derived fields are relative to.
    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    /// Direct access to the event cache (hydration and reads).
    pub fn event_cache(&self) -> &EventCache {
        &self.events
    }

    /// Direct access to the feed cache (reads).
    pub fn feed_cache(&self) -> &FeedCache {
        &self.feeds
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read surface
    // ─────────────────────────────────────────────────────────────────────

    /// Snapshot of one event.
    pub fn get_event(&self, event_id: &str) -> Option<EventRecord> {
        self.events.get(event_id)
    }

    /// Snapshot of every cached event.
    pub fn all_events(&self) -> Vec<EventRecord> {
        self.events.to_vec()
    }

    /// Cached events matching a named preset.
    pub fn filter(&self, preset: FilterPreset) -> Vec<EventRecord> {
        self.events.filter(preset)
    }

    /// Current entry for a feed.
    pub fn feed(&self, kind: FeedKind) -> FeedCacheEntry {
        self.feeds.read(kind)
    }

    /// Feed ids resolved against the event cache, in feed order. Ids whose
    /// record is missing (cleared mid-scroll) are skipped.
    pub fn feed_events(&self, kind: FeedKind) -> Vec<EventRecord> {
        self.feeds
            .read(kind)
            .ids
            .iter()
            .filter_map(|id| self.events.get(id))
            .collect()
    }

    /// Whether a feed is older than the configured TTL (or never fetched).
    pub fn is_feed_stale(&self, kind: FeedKind) -> bool {
        self.feeds.is_stale(kind, self.config.feed_ttl_ms)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Subscription & lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Register a callback invoked synchronously after every mutation.
    /// Callbacks may subscribe or unsubscribe from within their own
    /// invocation.
    pub fn subscribe(
        &self,
        callback: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(Arc::new(callback))
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.unsubscribe(id);
    }

    /// Session teardown: empty both caches and emit a single `Cleared`.
    pub fn clear(&self) {
        self.events.clear_silent();
        self.feeds.clear_silent();
        self.subscribers.notify(&StoreEvent::Cleared);
    }
}
