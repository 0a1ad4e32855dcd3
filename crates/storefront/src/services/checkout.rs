//! Order finalization: payment confirmation and cart-to-order reconciliation.
//!
//! This is the one flow in the service with real invariants. A checkout
//! attempt moves a pending order through confirmation with the payment
//! processor, persists the final order, retires the staging record, and
//! drains the cart. The rules that must hold:
//!
//! - The callback amount is only trusted after it matches the amount
//!   snapshotted at checkout time; a mismatch fails before the gateway is
//!   ever contacted.
//! - The persisted order always carries the processor's returned total, not
//!   the callback's.
//! - At most one order per `order_id`: concurrent finalization runs race for
//!   an atomic claim on the pending record, and the losers stop there.
//! - Once the charge is confirmed, cart-cleanup failures never undo order
//!   success.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use face_calendar_core::{Amount, CartItemId, OrderId, OrderStatus, PaymentKey};

use crate::supabase::types::{NewOrder, Order, PendingOrder};
use crate::supabase::{StoreError, SupabaseStore};
use crate::toss::{ApprovalRequest, PaymentApproval, TossClient, TossError};

/// The store operations finalization needs.
///
/// A seam so the orchestration can run against an in-memory store in tests;
/// the production implementation is [`SupabaseStore`].
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    async fn get_pending_order(&self, order_id: &OrderId)
    -> Result<Option<PendingOrder>, StoreError>;

    /// Atomically transition the pending order to its claimed state,
    /// returning the claimed row. `None` means another run holds the claim
    /// (or the record is gone).
    async fn claim_pending_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PendingOrder>, StoreError>;

    /// Return a claimed pending order to the claimable state.
    async fn release_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError>;

    async fn delete_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError>;

    async fn save_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

    async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), StoreError>;
}

#[async_trait]
impl CheckoutStore for SupabaseStore {
    async fn get_pending_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PendingOrder>, StoreError> {
        Self::get_pending_order(self, order_id).await
    }

    async fn claim_pending_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PendingOrder>, StoreError> {
        Self::claim_pending_order(self, order_id).await
    }

    async fn release_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
        Self::release_pending_order(self, order_id).await
    }

    async fn delete_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
        Self::delete_pending_order(self, order_id).await
    }

    async fn save_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        Self::save_order(self, order).await
    }

    async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), StoreError> {
        Self::remove_from_cart(self, id).await
    }
}

/// The confirmation call finalization needs from the payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn approve_payment(
        &self,
        request: &ApprovalRequest,
    ) -> Result<PaymentApproval, TossError>;
}

#[async_trait]
impl PaymentGateway for TossClient {
    async fn approve_payment(
        &self,
        request: &ApprovalRequest,
    ) -> Result<PaymentApproval, TossError> {
        Self::approve_payment(self, request).await
    }
}

/// Errors terminating a finalization attempt.
///
/// Messages are the user-facing failure-page copy; the machine-usable detail
/// rides in the variant fields.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Callback parameters missing or malformed; nothing was touched.
    #[error("{0}")]
    MalformedCallback(&'static str),

    /// No pending order matches the callback. The charge may still exist at
    /// the processor but cannot be reconciled here.
    #[error("주문 정보를 찾을 수 없습니다. (주문번호: {0})")]
    UnknownOrder(OrderId),

    /// Callback amount differs from the snapshotted amount - tampered or
    /// stale redirect parameters. The gateway is never contacted.
    #[error("결제 금액이 일치하지 않습니다. 결제가 취소되었습니다.")]
    AmountMismatch { expected: Amount, received: Amount },

    /// Another finalization run already claimed this order.
    #[error("이미 처리 중인 주문입니다. (주문번호: {0})")]
    AlreadyClaimed(OrderId),

    /// The processor rejected the charge; the pending order was released.
    #[error(transparent)]
    Gateway(#[from] TossError),

    /// A store operation failed mid-flow.
    #[error("주문 처리 중 오류가 발생했습니다. ({0})")]
    Store(#[from] StoreError),
}

/// Callback-parameter copy shown when required parameters are absent.
const MSG_BAD_CALLBACK: &str = "결제 정보가 올바르지 않습니다.";
/// Callback-parameter copy shown when the amount is not a positive integer.
const MSG_BAD_AMOUNT: &str = "결제 금액이 올바르지 않습니다.";

/// Raw redirect parameters from the gateway's hosted checkout UI.
///
/// Everything is optional and stringly typed here on purpose: these come
/// straight off the query string and are untrusted until validated.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub payment_key: Option<String>,
    pub order_id: Option<String>,
    pub amount: Option<String>,
}

/// Progress of a finalization attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Started,
    AmountVerified,
    GatewayConfirmed,
    OrderPersisted,
    PendingCleared,
    CartDrained,
}

impl CheckoutStage {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::AmountVerified => "amount_verified",
            Self::GatewayConfirmed => "gateway_confirmed",
            Self::OrderPersisted => "order_persisted",
            Self::PendingCleared => "pending_cleared",
            Self::CartDrained => "cart_drained",
        }
    }
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed finalization.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub payment_key: PaymentKey,
    pub total_amount: Amount,
    pub status: String,
    pub approved_at: DateTime<FixedOffset>,
    /// Cart items removed during the drain step
    pub items_removed: usize,
    /// Cart items that failed to delete (logged, never fatal)
    pub items_failed: usize,
}

/// The order finalizer.
#[derive(Debug, Clone)]
pub struct CheckoutService<S, G> {
    store: S,
    gateway: G,
}

impl<S, G> CheckoutService<S, G>
where
    S: CheckoutStore,
    G: PaymentGateway,
{
    pub const fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// Run one finalization attempt for a gateway success redirect.
    ///
    /// The sequence is strictly linear; each step awaits the previous one's
    /// network response. Steps before the gateway call have no side effects
    /// other than the claim, which is released again if confirmation fails.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] describing the first step that failed.
    /// See the module docs for which failures leave the pending order
    /// behind for reconciliation.
    #[instrument(skip(self, params))]
    pub async fn finalize(&self, params: CallbackParams) -> Result<CheckoutReceipt, CheckoutError> {
        let mut stage = CheckoutStage::Started;
        let request = validate_callback(params)?;
        let order_id = request.order_id.clone();
        debug!(%order_id, "processing payment success callback");

        // Lookup stays read-only so a tampered callback cannot consume the
        // staging record. A store failure here is a transport problem, not
        // absence, and surfaces as such.
        let Some(pending) = self.store.get_pending_order(&order_id).await? else {
            warn!(%order_id, "no pending order for callback; charge may need manual reconciliation");
            return Err(CheckoutError::UnknownOrder(order_id));
        };

        // Amount integrity: the snapshotted amount is the trusted reference.
        // Checked before the gateway call so tampered parameters never reach
        // the processor.
        if pending.amount != request.amount {
            error!(
                expected = pending.amount.as_won(),
                received = request.amount.as_won(),
                "callback amount does not match pending order"
            );
            return Err(CheckoutError::AmountMismatch {
                expected: pending.amount,
                received: request.amount,
            });
        }
        stage = self.advance(stage, CheckoutStage::AmountVerified);

        // Exactly one concurrent run can win the claim; a reloaded success
        // page stops here instead of confirming the charge twice.
        let Some(pending) = self.store.claim_pending_order(&order_id).await? else {
            warn!(%order_id, "pending order already claimed by another run");
            return Err(CheckoutError::AlreadyClaimed(order_id));
        };

        let approval = match self.gateway.approve_payment(&request).await {
            Ok(approval) => approval,
            Err(gateway_err) => {
                // Put the record back so the user can retry or support can
                // reconcile. If even that fails the record is orphaned in
                // the claimed state, which the logs make findable.
                if let Err(release_err) = self.store.release_pending_order(&order_id).await {
                    error!(
                        %order_id,
                        error = %release_err,
                        "failed to release pending order after gateway error"
                    );
                }
                return Err(gateway_err.into());
            }
        };
        stage = self.advance(stage, CheckoutStage::GatewayConfirmed);

        // Persist with the processor's total, the snapshot's items, and the
        // snapshot's owner - none of these come from the callback.
        let new_order = NewOrder {
            user_id: pending.user_id.clone(),
            order_id: order_id.clone(),
            payment_key: approval.payment_key.clone(),
            total_amount: approval.total_amount,
            status: OrderStatus::Done,
            items: pending.cart_items.clone(),
        };
        if let Err(persist_err) = self.store.save_order(&new_order).await {
            // The charge went through but no order exists. Deliberately NOT
            // releasing the claim: a retry would confirm (and charge) again.
            error!(
                %order_id,
                error = %persist_err,
                "charge approved but order persistence failed; manual reconciliation required"
            );
            return Err(persist_err.into());
        }
        stage = self.advance(stage, CheckoutStage::OrderPersisted);

        self.store.delete_pending_order(&order_id).await?;
        stage = self.advance(stage, CheckoutStage::PendingCleared);

        // Cart drain: per-item failures are cleanup noise, never a reason to
        // report the completed order as failed.
        let mut items_removed = 0;
        let mut items_failed = 0;
        for item in &pending.cart_items {
            match self.store.remove_cart_item(&item.id).await {
                Ok(()) => items_removed += 1,
                Err(e) => {
                    items_failed += 1;
                    warn!(
                        cart_item_id = %item.id,
                        error = %e,
                        "failed to remove cart item after order completion"
                    );
                }
            }
        }
        stage = self.advance(stage, CheckoutStage::CartDrained);

        info!(
            %order_id,
            stage = %stage,
            total_amount = approval.total_amount.as_won(),
            items_removed,
            items_failed,
            "checkout finalized"
        );

        Ok(CheckoutReceipt {
            order_id,
            payment_key: approval.payment_key,
            total_amount: approval.total_amount,
            status: approval.status,
            approved_at: approval.approved_at,
            items_removed,
            items_failed,
        })
    }

    fn advance(&self, from: CheckoutStage, to: CheckoutStage) -> CheckoutStage {
        debug!(from = %from, to = %to, "checkout stage");
        to
    }
}

/// Validate raw redirect parameters into a confirmed approval request.
fn validate_callback(params: CallbackParams) -> Result<ApprovalRequest, CheckoutError> {
    let payment_key = params
        .payment_key
        .filter(|v| !v.trim().is_empty())
        .ok_or(CheckoutError::MalformedCallback(MSG_BAD_CALLBACK))?;
    let order_id = params
        .order_id
        .filter(|v| !v.trim().is_empty())
        .ok_or(CheckoutError::MalformedCallback(MSG_BAD_CALLBACK))?;
    let raw_amount = params
        .amount
        .filter(|v| !v.trim().is_empty())
        .ok_or(CheckoutError::MalformedCallback(MSG_BAD_CALLBACK))?;

    let won = raw_amount
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or(CheckoutError::MalformedCallback(MSG_BAD_AMOUNT))?;

    Ok(ApprovalRequest {
        payment_key: PaymentKey::new(payment_key),
        order_id: OrderId::new(order_id),
        amount: Amount::won(won),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use face_calendar_core::{PendingOrderStatus, UserId};

    use crate::supabase::types::CartItem;

    // =========================================================================
    // Test doubles
    // =========================================================================

    #[derive(Default)]
    struct StoreState {
        pending: HashMap<String, PendingOrder>,
        orders: Vec<Order>,
        removed_items: Vec<String>,
    }

    /// In-memory store with injectable faults.
    #[derive(Clone, Default)]
    struct MockStore {
        state: Arc<Mutex<StoreState>>,
        fail_lookup: bool,
        fail_delete_pending: bool,
        fail_item_removal: Arc<Vec<String>>,
    }

    impl MockStore {
        fn with_pending(pending: PendingOrder) -> Self {
            let store = Self::default();
            store
                .state
                .lock()
                .unwrap()
                .pending
                .insert(pending.order_id.as_str().to_string(), pending);
            store
        }

        fn orders(&self) -> Vec<Order> {
            self.state.lock().unwrap().orders.clone()
        }

        fn pending(&self, order_id: &str) -> Option<PendingOrder> {
            self.state.lock().unwrap().pending.get(order_id).cloned()
        }
    }

    fn transport_failure() -> StoreError {
        StoreError::Api {
            status: 503,
            message: "connection reset".to_string(),
        }
    }

    #[async_trait]
    impl CheckoutStore for MockStore {
        async fn get_pending_order(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<PendingOrder>, StoreError> {
            if self.fail_lookup {
                return Err(transport_failure());
            }
            Ok(self.pending(order_id.as_str()))
        }

        async fn claim_pending_order(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<PendingOrder>, StoreError> {
            let mut state = self.state.lock().unwrap();
            let Some(row) = state.pending.get_mut(order_id.as_str()) else {
                return Ok(None);
            };
            if row.status != PendingOrderStatus::Pending {
                return Ok(None);
            }
            row.status = PendingOrderStatus::Processing;
            Ok(Some(row.clone()))
        }

        async fn release_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
            let mut state = self.state.lock().unwrap();
            if let Some(row) = state.pending.get_mut(order_id.as_str()) {
                row.status = PendingOrderStatus::Pending;
            }
            Ok(())
        }

        async fn delete_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
            if self.fail_delete_pending {
                return Err(transport_failure());
            }
            self.state.lock().unwrap().pending.remove(order_id.as_str());
            Ok(())
        }

        async fn save_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
            let stored = Order {
                id: Some("assigned".to_string()),
                user_id: order.user_id.clone(),
                order_id: order.order_id.clone(),
                payment_key: order.payment_key.clone(),
                total_amount: order.total_amount,
                status: order.status,
                items: order.items.clone(),
                created_at: None,
            };
            self.state.lock().unwrap().orders.push(stored.clone());
            Ok(stored)
        }

        async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), StoreError> {
            if self.fail_item_removal.contains(&id.as_str().to_string()) {
                return Err(transport_failure());
            }
            self.state
                .lock()
                .unwrap()
                .removed_items
                .push(id.as_str().to_string());
            Ok(())
        }
    }

    /// Gateway double that counts calls and replays a fixed outcome.
    #[derive(Clone)]
    struct MockGateway {
        calls: Arc<AtomicUsize>,
        outcome: Arc<Result<PaymentApproval, (String, String)>>,
    }

    impl MockGateway {
        fn approving(total: Amount) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                outcome: Arc::new(Ok(PaymentApproval {
                    payment_key: PaymentKey::new("pk1"),
                    order_id: OrderId::new("o1"),
                    status: "DONE".to_string(),
                    total_amount: total,
                    approved_at: Utc::now().fixed_offset(),
                })),
            }
        }

        fn rejecting(code: &str, message: &str) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                outcome: Arc::new(Err((code.to_string(), message.to_string()))),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn approve_payment(
            &self,
            _request: &ApprovalRequest,
        ) -> Result<PaymentApproval, TossError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome.as_ref() {
                Ok(approval) => Ok(approval.clone()),
                Err((code, message)) => Err(TossError::Gateway {
                    code: code.clone(),
                    message: message.clone(),
                }),
            }
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    fn cart_item(id: &str) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            user_id: UserId::new("u1"),
            name: "수분 크림".to_string(),
            image: "https://example.com/cream.jpg".to_string(),
            price: "28,000원".to_string(),
            volume: "50ml".to_string(),
            created_at: None,
        }
    }

    fn pending_order(amount: i64, items: Vec<CartItem>) -> PendingOrder {
        PendingOrder {
            user_id: UserId::new("u1"),
            order_id: OrderId::new("o1"),
            amount: Amount::won(amount),
            cart_items: items,
            status: PendingOrderStatus::Pending,
            created_at: None,
        }
    }

    fn callback(amount: &str) -> CallbackParams {
        CallbackParams {
            payment_key: Some("pk1".to_string()),
            order_id: Some("o1".to_string()),
            amount: Some(amount.to_string()),
        }
    }

    // =========================================================================
    // Callback validation
    // =========================================================================

    #[tokio::test]
    async fn test_missing_payment_key_is_malformed() {
        let store = MockStore::default();
        let gateway = MockGateway::approving(Amount::won(50000));
        let service = CheckoutService::new(store, gateway.clone());

        let result = service
            .finalize(CallbackParams {
                payment_key: None,
                order_id: Some("o1".to_string()),
                amount: Some("50000".to_string()),
            })
            .await;

        assert!(matches!(result, Err(CheckoutError::MalformedCallback(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_amount_is_malformed() {
        let service = CheckoutService::new(
            MockStore::default(),
            MockGateway::approving(Amount::won(50000)),
        );

        let result = service.finalize(callback("fifty-thousand")).await;
        assert!(matches!(result, Err(CheckoutError::MalformedCallback(_))));
    }

    #[tokio::test]
    async fn test_negative_amount_is_malformed() {
        let service = CheckoutService::new(
            MockStore::default(),
            MockGateway::approving(Amount::won(50000)),
        );

        let result = service.finalize(callback("-50000")).await;
        assert!(matches!(result, Err(CheckoutError::MalformedCallback(_))));
    }

    // =========================================================================
    // Lookup and amount integrity
    // =========================================================================

    #[tokio::test]
    async fn test_unknown_order_fails_before_gateway() {
        let gateway = MockGateway::approving(Amount::won(50000));
        let service = CheckoutService::new(MockStore::default(), gateway.clone());

        let result = service.finalize(callback("50000")).await;

        assert!(matches!(result, Err(CheckoutError::UnknownOrder(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_transport_failure_is_not_unknown_order() {
        let store = MockStore {
            fail_lookup: true,
            ..MockStore::default()
        };
        let gateway = MockGateway::approving(Amount::won(50000));
        let service = CheckoutService::new(store, gateway.clone());

        let result = service.finalize(callback("50000")).await;

        // A flaky store must surface as a store failure the caller can
        // retry, never as a missing order
        assert!(matches!(result, Err(CheckoutError::Store(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_amount_mismatch_never_reaches_gateway() {
        let store = MockStore::with_pending(pending_order(50000, vec![cart_item("c1")]));
        let gateway = MockGateway::approving(Amount::won(50000));
        let service = CheckoutService::new(store.clone(), gateway.clone());

        let result = service.finalize(callback("40000")).await;

        assert!(matches!(
            result,
            Err(CheckoutError::AmountMismatch {
                expected,
                received,
            }) if expected == Amount::won(50000) && received == Amount::won(40000)
        ));
        assert_eq!(gateway.call_count(), 0);
        // The staging record is untouched and still claimable
        let pending = store.pending("o1").unwrap();
        assert_eq!(pending.status, PendingOrderStatus::Pending);
    }

    // =========================================================================
    // Claim guard
    // =========================================================================

    #[tokio::test]
    async fn test_already_claimed_order_is_rejected() {
        let store = MockStore::with_pending(pending_order(50000, vec![cart_item("c1")]));
        let gateway = MockGateway::approving(Amount::won(50000));
        let service = CheckoutService::new(store.clone(), gateway.clone());

        // Simulate a concurrent run holding the claim
        store
            .claim_pending_order(&OrderId::new("o1"))
            .await
            .unwrap()
            .unwrap();

        let result = service.finalize(callback("50000")).await;

        assert!(matches!(result, Err(CheckoutError::AlreadyClaimed(_))));
        assert_eq!(gateway.call_count(), 0);
        assert!(store.orders().is_empty());
    }

    // =========================================================================
    // Gateway failure and persistence
    // =========================================================================

    #[tokio::test]
    async fn test_gateway_rejection_releases_pending_order() {
        let store = MockStore::with_pending(pending_order(50000, vec![cart_item("c1")]));
        let gateway = MockGateway::rejecting("PAY_PROCESS_CANCELED", "결제가 취소되었습니다.");
        let service = CheckoutService::new(store.clone(), gateway.clone());

        let result = service.finalize(callback("50000")).await;

        match result {
            Err(CheckoutError::Gateway(e)) => {
                assert_eq!(e.gateway_code(), Some("PAY_PROCESS_CANCELED"));
            }
            other => panic!("expected gateway error, got {other:?}"),
        }
        assert_eq!(gateway.call_count(), 1);
        assert!(store.orders().is_empty());
        // Released for retry / manual reconciliation
        let pending = store.pending("o1").unwrap();
        assert_eq!(pending.status, PendingOrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_pending_delete_failure_propagates_after_order_saved() {
        let store = MockStore {
            fail_delete_pending: true,
            ..MockStore::with_pending(pending_order(50000, vec![cart_item("c1")]))
        };
        let service =
            CheckoutService::new(store.clone(), MockGateway::approving(Amount::won(50000)));

        let result = service.finalize(callback("50000")).await;

        assert!(matches!(result, Err(CheckoutError::Store(_))));
        // The order itself was persisted before the cleanup failure
        assert_eq!(store.orders().len(), 1);
    }

    // =========================================================================
    // Cart drain
    // =========================================================================

    #[tokio::test]
    async fn test_drain_failure_does_not_undo_order_success() {
        let store = MockStore {
            fail_item_removal: Arc::new(vec!["c2".to_string()]),
            ..MockStore::with_pending(pending_order(
                50000,
                vec![cart_item("c1"), cart_item("c2")],
            ))
        };
        let service =
            CheckoutService::new(store.clone(), MockGateway::approving(Amount::won(50000)));

        let receipt = service.finalize(callback("50000")).await.unwrap();

        assert_eq!(receipt.items_removed, 1);
        assert_eq!(receipt.items_failed, 1);
        assert_eq!(store.orders().len(), 1);
        assert!(store.pending("o1").is_none());
    }

    // =========================================================================
    // Authoritative amount
    // =========================================================================

    #[tokio::test]
    async fn test_persisted_order_uses_gateway_total() {
        let store = MockStore::with_pending(pending_order(50000, vec![cart_item("c1")]));
        // Processor reports a different charged total (e.g. processor-side
        // promotion); the stored order must carry the processor's number
        let service =
            CheckoutService::new(store.clone(), MockGateway::approving(Amount::won(48000)));

        let receipt = service.finalize(callback("50000")).await.unwrap();

        assert_eq!(receipt.total_amount, Amount::won(48000));
        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders.first().unwrap().total_amount, Amount::won(48000));
    }
}
