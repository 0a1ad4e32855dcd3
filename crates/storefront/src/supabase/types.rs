//! Typed rows for the data store collections.
//!
//! The store itself is schemaless from this side of the wire, so every
//! payload is parsed into one of these shapes at the boundary instead of
//! being passed around as loose JSON.

use chrono::{DateTime, Utc};
use face_calendar_core::{Amount, CartItemId, OrderId, OrderStatus, PaymentKey, PendingOrderStatus, UserId};
use serde::{Deserialize, Serialize};

/// A cart item row from the `cart` collection.
///
/// `id` is assigned by the store; an item belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub name: String,
    pub image: String,
    /// Display price as shown in the catalog, e.g. `"21,000원"`
    pub price: String,
    pub volume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for the `cart` collection.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub name: String,
    pub image: String,
    pub price: String,
    pub volume: String,
}

/// A pending order row from the `pending_orders` collection.
///
/// The staging record written at checkout initiation. `amount` is fixed here
/// and is the trusted reference value for the amount-integrity check; it is
/// never recomputed from cart state during confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub user_id: UserId,
    pub order_id: OrderId,
    /// Quoted total in won, fixed at creation time
    pub amount: Amount,
    /// Snapshot of the cart at checkout time
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub status: PendingOrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for the `pending_orders` collection.
#[derive(Debug, Clone, Serialize)]
pub struct NewPendingOrder {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub amount: Amount,
    pub cart_items: Vec<CartItem>,
    pub status: PendingOrderStatus,
}

/// A finalized order row from the `orders` collection.
///
/// Created exactly once per successful payment, never mutated thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: UserId,
    pub order_id: OrderId,
    pub payment_key: PaymentKey,
    /// The processor's authoritative charged amount
    pub total_amount: Amount,
    pub status: OrderStatus,
    pub items: Vec<CartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for the `orders` collection.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub payment_key: PaymentKey,
    pub total_amount: Amount,
    pub status: OrderStatus,
    pub items: Vec<CartItem>,
}

/// A lead row from the `leads` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Insert payload for the `leads` collection.
#[derive(Debug, Clone, Serialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
}
