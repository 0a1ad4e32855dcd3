//! End-to-end checkout finalization scenarios.
//!
//! Each test runs the real finalizer against the in-memory store and a
//! scripted gateway: confirm the charge, persist the order, retire the
//! pending record, drain the cart.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use face_calendar_core::{Amount, PendingOrderStatus};
use face_calendar_integration_tests::{
    MemoryStore, ScriptedGateway, cart_item, pending_order,
};
use face_calendar_storefront::services::CheckoutService;
use face_calendar_storefront::services::checkout::{CallbackParams, CheckoutError};

fn callback(order_id: &str, amount: &str) -> CallbackParams {
    CallbackParams {
        payment_key: Some("pk1".to_string()),
        order_id: Some(order_id.to_string()),
        amount: Some(amount.to_string()),
    }
}

// =============================================================================
// Scenario A: happy path
// =============================================================================

#[tokio::test]
async fn happy_path_persists_order_and_drains_cart() {
    let store = MemoryStore::new();
    store.seed(pending_order("u1", "o1", 50000, vec![cart_item("c1", "u1")]));
    let gateway = ScriptedGateway::approving(Amount::won(50000));
    let service = CheckoutService::new(store.clone(), gateway.clone());

    let receipt = service.finalize(callback("o1", "50000")).await.unwrap();

    // Order persisted with the gateway's authoritative total
    let orders = store.orders();
    assert_eq!(orders.len(), 1);
    let order = orders.first().unwrap();
    assert_eq!(order.total_amount, Amount::won(50000));
    assert_eq!(order.user_id.as_str(), "u1");
    assert_eq!(order.items.len(), 1);

    // Pending order retired, cart drained
    assert!(store.pending("o1").is_none());
    assert_eq!(store.cart_len(), 0);

    assert_eq!(gateway.call_count(), 1);
    assert_eq!(receipt.items_removed, 1);
    assert_eq!(receipt.items_failed, 0);
    assert_eq!(receipt.status, "DONE");
}

// =============================================================================
// Scenario B: tampered callback amount
// =============================================================================

#[tokio::test]
async fn tampered_amount_fails_without_gateway_call() {
    let store = MemoryStore::new();
    store.seed(pending_order("u1", "o1", 50000, vec![cart_item("c1", "u1")]));
    let gateway = ScriptedGateway::approving(Amount::won(50000));
    let service = CheckoutService::new(store.clone(), gateway.clone());

    let result = service.finalize(callback("o1", "40000")).await;

    assert!(matches!(result, Err(CheckoutError::AmountMismatch { .. })));
    // The security control: zero gateway invocations
    assert_eq!(gateway.call_count(), 0);
    // Nothing persisted, pending order still present and claimable
    assert!(store.orders().is_empty());
    let pending = store.pending("o1").unwrap();
    assert_eq!(pending.status, PendingOrderStatus::Pending);
    assert_eq!(store.cart_len(), 1);
}

// =============================================================================
// Scenario C: gateway rejection
// =============================================================================

#[tokio::test]
async fn gateway_rejection_leaves_pending_order_for_retry() {
    let store = MemoryStore::new();
    store.seed(pending_order("u1", "o1", 50000, vec![cart_item("c1", "u1")]));
    let gateway = ScriptedGateway::rejecting("PAY_PROCESS_CANCELED", "결제가 취소되었습니다.");
    let service = CheckoutService::new(store.clone(), gateway.clone());

    let result = service.finalize(callback("o1", "50000")).await;

    match result {
        Err(CheckoutError::Gateway(e)) => {
            assert_eq!(e.gateway_code(), Some("PAY_PROCESS_CANCELED"));
            assert_eq!(
                e.to_string(),
                "결제가 취소되었습니다. (코드: PAY_PROCESS_CANCELED)"
            );
        }
        other => panic!("expected gateway rejection, got {other:?}"),
    }

    assert_eq!(gateway.call_count(), 1);
    assert!(store.orders().is_empty());
    // Released back to claimable so the user can retry
    let pending = store.pending("o1").unwrap();
    assert_eq!(pending.status, PendingOrderStatus::Pending);
}

// =============================================================================
// Missing pending order
// =============================================================================

#[tokio::test]
async fn unknown_order_fails_before_gateway() {
    let store = MemoryStore::new();
    let gateway = ScriptedGateway::approving(Amount::won(50000));
    let service = CheckoutService::new(store, gateway.clone());

    let result = service.finalize(callback("o-missing", "50000")).await;

    assert!(matches!(result, Err(CheckoutError::UnknownOrder(_))));
    assert_eq!(gateway.call_count(), 0);
}

// =============================================================================
// Idempotence probe: duplicate success redirects
// =============================================================================

#[tokio::test]
async fn duplicate_redirect_produces_exactly_one_order() {
    let store = MemoryStore::new();
    store.seed(pending_order("u1", "o1", 50000, vec![cart_item("c1", "u1")]));
    // Gateway latency holds the first run mid-flight while the second run
    // races through lookup and hits the claim
    let gateway =
        ScriptedGateway::approving(Amount::won(50000)).with_delay(Duration::from_millis(50));
    let service = CheckoutService::new(store.clone(), gateway.clone());

    let (first, second) = tokio::join!(
        service.finalize(callback("o1", "50000")),
        service.finalize(callback("o1", "50000")),
    );

    // Exactly one run wins; the other stops at the claim or the lookup
    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in [first, second] {
        if let Err(e) = result {
            assert!(
                matches!(
                    e,
                    CheckoutError::AlreadyClaimed(_) | CheckoutError::UnknownOrder(_)
                ),
                "unexpected loser error: {e:?}"
            );
        }
    }

    assert_eq!(store.orders().len(), 1);
    assert!(store.pending("o1").is_none());
}

#[tokio::test]
async fn duplicate_redirect_without_claim_guard_demonstrates_the_race() {
    // The original ledger had no claim column; this reproduces its behavior
    // and shows why the guard exists
    let store = MemoryStore::without_claim_guard();
    store.seed(pending_order("u1", "o1", 50000, vec![cart_item("c1", "u1")]));
    let gateway =
        ScriptedGateway::approving(Amount::won(50000)).with_delay(Duration::from_millis(50));
    let service = CheckoutService::new(store.clone(), gateway.clone());

    let (first, second) = tokio::join!(
        service.finalize(callback("o1", "50000")),
        service.finalize(callback("o1", "50000")),
    );

    // Both runs read the same pending order, both confirm, both persist
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(gateway.call_count(), 2);
    assert_eq!(store.orders().len(), 2, "duplicate-order race reproduced");
}

// =============================================================================
// Sequential replay (reloaded success page after completion)
// =============================================================================

#[tokio::test]
async fn replayed_redirect_after_completion_is_unknown_order() {
    let store = MemoryStore::new();
    store.seed(pending_order("u1", "o1", 50000, vec![cart_item("c1", "u1")]));
    let gateway = ScriptedGateway::approving(Amount::won(50000));
    let service = CheckoutService::new(store.clone(), gateway.clone());

    service.finalize(callback("o1", "50000")).await.unwrap();
    let replay = service.finalize(callback("o1", "50000")).await;

    assert!(matches!(replay, Err(CheckoutError::UnknownOrder(_))));
    assert_eq!(store.orders().len(), 1);
    assert_eq!(gateway.call_count(), 1);
}

// =============================================================================
// Multi-item drain
// =============================================================================

#[tokio::test]
async fn drain_removes_every_snapshot_item() {
    let store = MemoryStore::new();
    store.seed(pending_order(
        "u1",
        "o1",
        114_000,
        vec![
            cart_item("c1", "u1"),
            cart_item("c2", "u1"),
            cart_item("c3", "u1"),
        ],
    ));
    let service = CheckoutService::new(store.clone(), ScriptedGateway::approving(Amount::won(114_000)));

    let receipt = service.finalize(callback("o1", "114000")).await.unwrap();

    assert_eq!(receipt.items_removed, 3);
    assert_eq!(receipt.items_failed, 0);
    assert_eq!(store.cart_len(), 0);
}
