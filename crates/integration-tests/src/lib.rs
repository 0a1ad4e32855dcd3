//! Integration tests for Face Calendar.
//!
//! The checkout flow tests run the real [`CheckoutService`] end-to-end
//! against the in-memory doubles defined here, so the full
//! confirm-persist-drain sequence (and its concurrency behavior) is
//! exercised without network access or live credentials.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Finalization scenarios: happy path, tampered amount,
//!   gateway rejection, duplicate redirects
//!
//! [`CheckoutService`]: face_calendar_storefront::services::CheckoutService

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use face_calendar_core::{Amount, CartItemId, OrderId, PaymentKey, PendingOrderStatus, UserId};
use face_calendar_storefront::services::checkout::{CheckoutStore, PaymentGateway};
use face_calendar_storefront::supabase::types::{CartItem, NewOrder, Order, PendingOrder};
use face_calendar_storefront::supabase::StoreError;
use face_calendar_storefront::toss::{ApprovalRequest, PaymentApproval, TossError};

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
struct MemoryState {
    pending: HashMap<String, PendingOrder>,
    orders: Vec<Order>,
    cart: HashMap<String, CartItem>,
}

/// In-memory stand-in for the remote data store.
///
/// The claim operation takes the state lock for its whole read-check-write,
/// mirroring the atomicity the real store gets from a conditional `PATCH`.
/// Constructing it with [`MemoryStore::without_claim_guard`] downgrades the
/// claim to an unconditional read, which reproduces the behavior of a
/// ledger with no status column.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    claim_guard: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            claim_guard: true,
        }
    }

    /// A store whose claim does not actually guard anything.
    #[must_use]
    pub fn without_claim_guard() -> Self {
        Self {
            claim_guard: false,
            ..Self::new()
        }
    }

    /// Seed a pending order and its cart items.
    pub fn seed(&self, pending: PendingOrder) {
        let mut state = self.state.lock().expect("state lock");
        for item in &pending.cart_items {
            state
                .cart
                .insert(item.id.as_str().to_string(), item.clone());
        }
        state
            .pending
            .insert(pending.order_id.as_str().to_string(), pending);
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().expect("state lock").orders.clone()
    }

    #[must_use]
    pub fn pending(&self, order_id: &str) -> Option<PendingOrder> {
        self.state
            .lock()
            .expect("state lock")
            .pending
            .get(order_id)
            .cloned()
    }

    #[must_use]
    pub fn cart_len(&self) -> usize {
        self.state.lock().expect("state lock").cart.len()
    }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    async fn get_pending_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PendingOrder>, StoreError> {
        Ok(self.pending(order_id.as_str()))
    }

    async fn claim_pending_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PendingOrder>, StoreError> {
        let mut state = self.state.lock().expect("state lock");
        let Some(row) = state.pending.get_mut(order_id.as_str()) else {
            return Ok(None);
        };
        if self.claim_guard && row.status != PendingOrderStatus::Pending {
            return Ok(None);
        }
        row.status = PendingOrderStatus::Processing;
        Ok(Some(row.clone()))
    }

    async fn release_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("state lock");
        if let Some(row) = state.pending.get_mut(order_id.as_str()) {
            row.status = PendingOrderStatus::Pending;
        }
        Ok(())
    }

    async fn delete_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
        self.state
            .lock()
            .expect("state lock")
            .pending
            .remove(order_id.as_str());
        Ok(())
    }

    async fn save_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let stored = Order {
            id: Some(format!("row-{}", order.order_id)),
            user_id: order.user_id.clone(),
            order_id: order.order_id.clone(),
            payment_key: order.payment_key.clone(),
            total_amount: order.total_amount,
            status: order.status,
            items: order.items.clone(),
            created_at: None,
        };
        self.state
            .lock()
            .expect("state lock")
            .orders
            .push(stored.clone());
        Ok(stored)
    }

    async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), StoreError> {
        self.state
            .lock()
            .expect("state lock")
            .cart
            .remove(id.as_str());
        Ok(())
    }
}

// =============================================================================
// Scripted gateway
// =============================================================================

enum GatewayScript {
    Approve { total: Amount },
    Reject { code: String, message: String },
}

/// Payment gateway double that counts calls and replays a scripted outcome.
#[derive(Clone)]
pub struct ScriptedGateway {
    script: Arc<GatewayScript>,
    calls: Arc<AtomicUsize>,
    /// Extra latency per call, for widening race windows in concurrency tests
    delay: Option<Duration>,
}

impl ScriptedGateway {
    #[must_use]
    pub fn approving(total: Amount) -> Self {
        Self {
            script: Arc::new(GatewayScript::Approve { total }),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    #[must_use]
    pub fn rejecting(code: &str, message: &str) -> Self {
        Self {
            script: Arc::new(GatewayScript::Reject {
                code: code.to_string(),
                message: message.to_string(),
            }),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn approve_payment(
        &self,
        request: &ApprovalRequest,
    ) -> Result<PaymentApproval, TossError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.script.as_ref() {
            GatewayScript::Approve { total } => Ok(PaymentApproval {
                payment_key: request.payment_key.clone(),
                order_id: request.order_id.clone(),
                status: "DONE".to_string(),
                total_amount: *total,
                approved_at: Utc::now().fixed_offset(),
            }),
            GatewayScript::Reject { code, message } => Err(TossError::Gateway {
                code: code.clone(),
                message: message.clone(),
            }),
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A cart item owned by `user_id`.
#[must_use]
pub fn cart_item(id: &str, user_id: &str) -> CartItem {
    CartItem {
        id: CartItemId::new(id),
        user_id: UserId::new(user_id),
        name: "세라마이드 장벽 크림".to_string(),
        image: "https://example.com/cream.jpg".to_string(),
        price: "38,000원".to_string(),
        volume: "50ml".to_string(),
        created_at: None,
    }
}

/// A claimable pending order.
#[must_use]
pub fn pending_order(user_id: &str, order_id: &str, amount: i64, items: Vec<CartItem>) -> PendingOrder {
    PendingOrder {
        user_id: UserId::new(user_id),
        order_id: OrderId::new(order_id),
        amount: Amount::won(amount),
        cart_items: items,
        status: PendingOrderStatus::Pending,
        created_at: None,
    }
}

/// Assert-friendly payment key used across scenarios.
#[must_use]
pub fn payment_key() -> PaymentKey {
    PaymentKey::new("pk1")
}
