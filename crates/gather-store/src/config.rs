//! Store tuning knobs.

/// Configuration for an [`crate::EventStore`].
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Maximum age before a feed is considered stale.
    pub feed_ttl_ms: i64,
    /// Page size requested from feed endpoints.
    pub feed_page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            feed_ttl_ms: 5 * 60 * 1_000,
            feed_page_size: 20,
        }
    }
}
