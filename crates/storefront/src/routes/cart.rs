//! Cart route handlers.
//!
//! Cart contents live in the remote data store, scoped by user id. The cart
//! view degrades to an empty list when the store is unreachable - a blank
//! cart page beats an error page - but checkout reads strictly: a quote must
//! never be computed from a partial cart.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use face_calendar_core::{Amount, CartItemId, OrderId, PendingOrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use crate::supabase::types::{CartItem, NewCartItem, NewPendingOrder};

/// Cart contents response.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub item_count: usize,
    /// Sum of parsed display prices, in won
    pub total_amount: Amount,
    /// Formatted total, e.g. `"50,000원"`
    pub total_display: String,
}

impl CartResponse {
    fn from_items(items: Vec<CartItem>) -> Self {
        let total_amount = cart_total(&items);
        Self {
            item_count: items.len(),
            total_display: total_amount.format_won(),
            total_amount,
            items,
        }
    }

    fn empty() -> Self {
        Self::from_items(Vec::new())
    }
}

/// Sum a cart's display prices.
fn cart_total(items: &[CartItem]) -> Amount {
    items.iter().map(|item| Amount::parse_won(&item.price)).sum()
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub name: String,
    pub image: String,
    pub price: String,
    pub volume: String,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub cart_item_id: CartItemId,
}

/// Checkout initiation response, handed to the hosted gateway UI.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    /// Quoted total in won; the gateway must charge exactly this
    pub amount: Amount,
    pub item_count: usize,
}

/// Display the current user's cart.
#[instrument(skip(state, user_id), fields(user_id = %user_id.0))]
pub async fn show(
    State(state): State<AppState>,
    user_id: AuthenticatedUser,
) -> Json<CartResponse> {
    let AuthenticatedUser(user_id) = user_id;

    match state.store().get_cart(&user_id).await {
        Ok(items) => Json(CartResponse::from_items(items)),
        Err(e) => {
            warn!("Failed to load cart for {user_id}: {e}");
            Json(CartResponse::empty())
        }
    }
}

/// Add an item to the current user's cart.
#[instrument(skip(state, user_id, body), fields(user_id = %user_id.0))]
pub async fn add(
    State(state): State<AppState>,
    user_id: AuthenticatedUser,
    Json(body): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let AuthenticatedUser(user_id) = user_id;

    let item = state
        .store()
        .add_to_cart(&NewCartItem {
            user_id,
            name: body.name,
            image: body.image,
            price: body.price,
            volume: body.volume,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Remove an item from the cart.
#[instrument(skip(state, _user_id, body))]
pub async fn remove(
    State(state): State<AppState>,
    _user_id: AuthenticatedUser,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<StatusCode> {
    state.store().remove_from_cart(&body.cart_item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Initiate checkout: quote the cart and write the pending order.
///
/// The amount computed here is snapshotted into the pending order and
/// becomes the trusted reference for the later amount-integrity check. The
/// client then opens the gateway's hosted UI with exactly this order id and
/// amount.
#[instrument(skip(state, user_id), fields(user_id = %user_id.0))]
pub async fn checkout(
    State(state): State<AppState>,
    user_id: AuthenticatedUser,
) -> Result<Json<CheckoutResponse>> {
    let AuthenticatedUser(user_id) = user_id;

    // Strict read: a transport failure must not quote an empty or partial
    // cart
    let items = state.store().get_cart(&user_id).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest("장바구니가 비어있습니다.".to_string()));
    }

    let amount = cart_total(&items);
    if !amount.is_positive() {
        return Err(AppError::BadRequest("결제 금액이 올바르지 않습니다.".to_string()));
    }

    let order_id = OrderId::new(format!("order_{}", Uuid::new_v4().simple()));
    let item_count = items.len();

    state
        .store()
        .create_pending_order(&NewPendingOrder {
            user_id,
            order_id: order_id.clone(),
            amount,
            cart_items: items,
            status: PendingOrderStatus::Pending,
        })
        .await?;

    info!(%order_id, amount = amount.as_won(), item_count, "checkout initiated");

    Ok(Json(CheckoutResponse {
        order_id,
        amount,
        item_count,
    }))
}
