//! Synchronous observer registry.
//!
//! Subscribers are notified inline, after a mutation completes and after the
//! cache lock is released, so a consumer re-reading the store from its
//! callback always sees the post-mutation state within the same tick. The
//! callback list is snapshotted before dispatch, so a callback may subscribe
//! or unsubscribe (including detaching itself) without deadlocking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use gather_core::record::FeedKind;

/// What changed in the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// Records were normalized and inserted or replaced.
    EventsUpserted {
        /// Affected event ids.
        ids: Vec<String>,
    },
    /// A single record was mutated in place (patch, RSVP, push, rollback).
    EventUpdated {
        /// Affected event id.
        id: String,
    },
    /// A feed was replaced wholesale.
    FeedReplaced {
        /// Affected feed.
        kind: FeedKind,
    },
    /// A page was appended to a feed.
    FeedAppended {
        /// Affected feed.
        kind: FeedKind,
    },
    /// The whole store was cleared (session teardown).
    Cleared,
}

/// Handle returned by [`crate::EventStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Registered subscriber callbacks, shared by both caches and the store.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(u64, Callback)>>,
}

impl Subscribers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self, callback: Callback) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.write().push((id, callback));
        SubscriptionId(id)
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) {
        self.callbacks.write().retain(|(cb_id, _)| *cb_id != id.0);
    }

    /// Invoke every callback synchronously, in subscription order.
    ///
    /// The list is cloned out of the lock first: a callback registering or
    /// removing subscriptions (a one-shot listener detaching itself, say)
    /// must not block on the registry it is being dispatched from. A
    /// callback unsubscribed mid-dispatch may still see the current event.
    pub(crate) fn notify(&self, event: &StoreEvent) {
        let callbacks: Vec<Callback> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in &callbacks {
            callback(event);
        }
    }
}
