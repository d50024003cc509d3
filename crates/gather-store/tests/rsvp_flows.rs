//! RSVP toggle flows: optimistic join/leave, gated paths, rollback, and the
//! per-event busy guard.

mod support;

use std::sync::Arc;

use assert_matches::assert_matches;

use gather_api::ApiError;
use gather_core::wire::{AttendResponse, PaymentProof};
use gather_store::{StoreError, ToggleOutcome};

use support::{FakeApi, ME, raw_event, store_at, wait_for_call};

fn five_attendees() -> gather_core::wire::RawEvent {
    raw_event("evt-1", &["a1", "a2", "a3", "a4", "a5"])
}

#[tokio::test]
async fn open_join_is_optimistic_and_confirmed_by_server_count() {
    let api = FakeApi::new();
    api.attend_results.lock().push_back(Ok(AttendResponse {
        attendee_count: Some(6),
        ..AttendResponse::default()
    }));
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    store.event_cache().upsert_one(&five_attendees(), ME);

    // Observe the optimistic state while the request is held in flight.
    let gate = api.hold_next_call();
    let task = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.toggle_rsvp("evt-1", None).await })
    };
    wait_for_call(&api, "attend:evt-1").await;

    let mid_flight = store.get_event("evt-1").unwrap();
    assert_eq!(mid_flight.attendee_count, 6);
    assert!(mid_flight.is_attending);

    gate.notify_one();
    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome, ToggleOutcome::Attended);
    assert!(outcome.is_success());

    let record = store.get_event("evt-1").unwrap();
    assert_eq!(record.attendee_count, 6);
    assert!(record.is_attending);
    assert!(record.invariants_hold());
}

#[tokio::test]
async fn leave_removes_membership() {
    let api = FakeApi::new();
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    store
        .event_cache()
        .upsert_one(&raw_event("evt-1", &[ME, "a1", "a2"]), ME);
    assert!(store.get_event("evt-1").unwrap().is_attending);

    let outcome = store.toggle_rsvp("evt-1", None).await.unwrap();
    assert_eq!(outcome, ToggleOutcome::Left);
    assert!(api.saw_call("leave:evt-1"));

    let record = store.get_event("evt-1").unwrap();
    assert!(!record.is_attending);
    assert_eq!(record.attendee_count, 2);
    assert!(!record.attendee_ids.contains(ME));
    assert!(record.invariants_hold());
}

#[tokio::test]
async fn approval_required_issues_request_without_membership_change() {
    let api = FakeApi::new();
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    let mut raw = five_attendees();
    raw.permissions.approval_required = true;
    store.event_cache().upsert_one(&raw, ME);

    let outcome = store.toggle_rsvp("evt-1", Some("let me in")).await.unwrap();
    assert_eq!(outcome, ToggleOutcome::Requested);
    assert!(api.saw_call("request_join:evt-1"));
    assert!(!api.saw_call("attend:evt-1"));

    let record = store.get_event("evt-1").unwrap();
    assert_eq!(record.attendee_count, 5);
    assert!(!record.is_attending);
    assert!(record.join_request_pending);
}

#[tokio::test]
async fn failed_join_request_rolls_back_pending_flag() {
    let api = FakeApi::new();
    api.request_join_results
        .lock()
        .push_back(Err(ApiError::Network("timeout".into())));
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    let mut raw = five_attendees();
    raw.permissions.approval_required = true;
    store.event_cache().upsert_one(&raw, ME);
    let snapshot = store.get_event("evt-1").unwrap();

    let outcome = store.toggle_rsvp("evt-1", None).await.unwrap();
    assert_matches!(outcome, ToggleOutcome::Failed(ApiError::Network(_)));
    assert_eq!(store.get_event("evt-1").unwrap(), snapshot);
}

#[tokio::test]
async fn paid_event_gates_into_payment_flow_without_network() {
    let api = FakeApi::new();
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    let mut raw = five_attendees();
    raw.pricing = Some(gather_core::record::Pricing {
        is_free: false,
        amount_cents: 2_500,
        currency: "USD".into(),
    });
    store.event_cache().upsert_one(&raw, ME);
    let snapshot = store.get_event("evt-1").unwrap();

    let outcome = store.toggle_rsvp("evt-1", None).await.unwrap();
    assert_matches!(
        outcome,
        ToggleOutcome::PaymentRequired { pricing: Some(p) } if p.amount_cents == 2_500
    );
    assert!(api.calls().is_empty());
    assert_eq!(store.get_event("evt-1").unwrap(), snapshot);
}

#[tokio::test]
async fn confirm_payment_joins_and_marks_paid() {
    let api = FakeApi::new();
    api.confirm_results.lock().push_back(Ok(AttendResponse {
        attendee_count: Some(6),
        is_attending: Some(true),
        ..AttendResponse::default()
    }));
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    let mut raw = five_attendees();
    raw.pricing = Some(gather_core::record::Pricing {
        is_free: false,
        amount_cents: 2_500,
        currency: "USD".into(),
    });
    store.event_cache().upsert_one(&raw, ME);

    let proof = PaymentProof {
        provider: "stripe".into(),
        reference: "pi_42".into(),
    };
    let outcome = store.confirm_payment("evt-1", &proof).await.unwrap();
    assert_eq!(outcome, ToggleOutcome::Attended);
    assert!(api.saw_call("confirm:evt-1"));

    let record = store.get_event("evt-1").unwrap();
    assert!(record.is_attending);
    assert!(record.user_has_paid);
    assert_eq!(record.attendee_count, 6);
}

#[tokio::test]
async fn network_failure_restores_snapshot_exactly() {
    let api = FakeApi::new();
    api.attend_results
        .lock()
        .push_back(Err(ApiError::Network("connection reset".into())));
    let (store, clock) = store_at(Arc::clone(&api), 1_000);
    store.event_cache().upsert_one(&five_attendees(), ME);
    let snapshot = store.get_event("evt-1").unwrap();

    clock.advance(500); // the rollback must not keep the bumped timestamp
    let outcome = store.toggle_rsvp("evt-1", None).await.unwrap();
    assert_matches!(outcome, ToggleOutcome::Failed(ApiError::Network(_)));
    assert_eq!(store.get_event("evt-1").unwrap(), snapshot);
}

#[tokio::test]
async fn forbidden_join_surfaces_denied_and_rolls_back() {
    let api = FakeApi::new();
    api.attend_results
        .lock()
        .push_back(Err(ApiError::PermissionDenied {
            message: "followers only".into(),
        }));
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    store.event_cache().upsert_one(&five_attendees(), ME);
    let snapshot = store.get_event("evt-1").unwrap();

    let outcome = store.toggle_rsvp("evt-1", None).await.unwrap();
    assert_matches!(outcome, ToggleOutcome::Denied { message } if message == "followers only");
    assert_eq!(store.get_event("evt-1").unwrap(), snapshot);
}

#[tokio::test]
async fn second_toggle_while_in_flight_is_busy() {
    let api = FakeApi::new();
    api.attend_results.lock().push_back(Ok(AttendResponse {
        attendee_count: Some(6),
        ..AttendResponse::default()
    }));
    let (store, _) = store_at(Arc::clone(&api), 1_000);
    store.event_cache().upsert_one(&five_attendees(), ME);

    let gate = api.hold_next_call();
    let task = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.toggle_rsvp("evt-1", None).await })
    };
    wait_for_call(&api, "attend:evt-1").await;

    let second = store.toggle_rsvp("evt-1", None).await.unwrap();
    assert_eq!(second, ToggleOutcome::Busy);
    // The busy rejection must not double-adjust the optimistic count.
    assert_eq!(store.get_event("evt-1").unwrap().attendee_count, 6);

    gate.notify_one();
    assert_eq!(task.await.unwrap().unwrap(), ToggleOutcome::Attended);
    assert_eq!(store.get_event("evt-1").unwrap().attendee_count, 6);

    // The guard is released after resolution; a later toggle proceeds.
    let third = store.toggle_rsvp("evt-1", None).await.unwrap();
    assert_eq!(third, ToggleOutcome::Left);
}

#[tokio::test]
async fn toggle_on_unhydrated_event_is_an_error() {
    let api = FakeApi::new();
    let (store, _) = store_at(api, 1_000);
    let err = store.toggle_rsvp("missing", None).await.unwrap_err();
    assert_matches!(err, StoreError::NotHydrated { event_id } if event_id == "missing");
}
