//! Shared test fixtures: a programmable in-memory `ApiClient` and store
//! builders on a manual clock.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use gather_api::{ApiClient, ApiError};
use gather_core::record::FeedKind;
use gather_core::wire::{
    AttendResponse, BulkCheckInResponse, EventFilters, FeedPage, PaymentProof, RawEvent,
};
use gather_store::{EventStore, ManualClock, StoreConfig};

type ApiResult<T> = Result<T, ApiError>;

/// Fake transport with per-endpoint response queues and an optional gate
/// that holds the next call until released — used to observe optimistic
/// state and interleavings while a request is in flight.
#[derive(Default)]
pub struct FakeApi {
    pub attend_results: Mutex<VecDeque<ApiResult<AttendResponse>>>,
    pub leave_results: Mutex<VecDeque<ApiResult<AttendResponse>>>,
    pub request_join_results: Mutex<VecDeque<ApiResult<()>>>,
    pub confirm_results: Mutex<VecDeque<ApiResult<AttendResponse>>>,
    pub remove_results: Mutex<VecDeque<ApiResult<()>>>,
    pub bulk_results: Mutex<VecDeque<ApiResult<BulkCheckInResponse>>>,
    pub feed_results: Mutex<VecDeque<ApiResult<FeedPage>>>,
    pub search_results: Mutex<VecDeque<ApiResult<FeedPage>>>,
    calls: Mutex<Vec<String>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold the next incoming call until the returned handle is notified.
    pub fn hold_next_call(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Names (with arguments) of every call received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn saw_call(&self, name: &str) -> bool {
        self.calls.lock().iter().any(|c| c == name)
    }

    async fn enter(&self, call: String) {
        self.calls.lock().push(call);
        let gate = self.hold.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn pop<T: Default>(queue: &Mutex<VecDeque<ApiResult<T>>>) -> ApiResult<T> {
        queue.lock().pop_front().unwrap_or_else(|| Ok(T::default()))
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn attend(&self, event_id: &str) -> ApiResult<AttendResponse> {
        self.enter(format!("attend:{event_id}")).await;
        Self::pop(&self.attend_results)
    }

    async fn leave(&self, event_id: &str) -> ApiResult<AttendResponse> {
        self.enter(format!("leave:{event_id}")).await;
        Self::pop(&self.leave_results)
    }

    async fn request_join(&self, event_id: &str, _message: Option<&str>) -> ApiResult<()> {
        self.enter(format!("request_join:{event_id}")).await;
        Self::pop(&self.request_join_results)
    }

    async fn confirm_attendance(
        &self,
        event_id: &str,
        _proof: &PaymentProof,
    ) -> ApiResult<AttendResponse> {
        self.enter(format!("confirm:{event_id}")).await;
        Self::pop(&self.confirm_results)
    }

    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> ApiResult<()> {
        self.enter(format!("remove:{event_id}:{user_id}")).await;
        Self::pop(&self.remove_results)
    }

    async fn bulk_check_in(
        &self,
        event_id: &str,
        _attendee_ids: &[String],
    ) -> ApiResult<BulkCheckInResponse> {
        self.enter(format!("bulk_check_in:{event_id}")).await;
        Self::pop(&self.bulk_results)
    }

    async fn fetch_feed(&self, kind: FeedKind, page: u32, _limit: u32) -> ApiResult<FeedPage> {
        self.enter(format!("fetch_feed:{}:{page}", kind.as_str())).await;
        Self::pop(&self.feed_results)
    }

    async fn fetch_events(&self, _filters: &EventFilters) -> ApiResult<FeedPage> {
        self.enter("fetch_events".to_string()).await;
        Self::pop(&self.search_results)
    }
}

/// Session user id used by all fixtures.
pub const ME: &str = "me";

/// Store on a manual clock starting at `now_ms`.
pub fn store_at(api: Arc<FakeApi>, now_ms: i64) -> (Arc<EventStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now_ms));
    let store = EventStore::with_clock(
        api,
        ME,
        StoreConfig::default(),
        Arc::clone(&clock) as Arc<dyn gather_store::Clock>,
    );
    (Arc::new(store), clock)
}

/// Hydrated raw event with a full attendee array.
pub fn raw_event(id: &str, attendees: &[&str]) -> RawEvent {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "hostId": "host-1",
        "attendees": attendees,
        "title": "Fixture event",
    }))
    .unwrap()
}

/// A feed page wrapping the given raw events.
pub fn page(events: Vec<RawEvent>, has_more: bool) -> FeedPage {
    FeedPage { events, has_more }
}

/// Spin until the fake API has seen `call` (lets a spawned task progress on
/// a current-thread runtime).
pub async fn wait_for_call(api: &FakeApi, call: &str) {
    while !api.saw_call(call) {
        tokio::task::yield_now().await;
    }
}
