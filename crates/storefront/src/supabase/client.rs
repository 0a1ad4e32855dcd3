//! PostgREST client for the Face Calendar data store.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use face_calendar_core::{CartItemId, OrderId, PendingOrderStatus, UserId};

use crate::config::SupabaseConfig;

use super::StoreError;
use super::types::{
    CartItem, Lead, NewCartItem, NewLead, NewOrder, NewPendingOrder, Order, PendingOrder,
};

/// Header asking PostgREST to echo affected rows back in the response body.
const PREFER_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Client for the Supabase REST data store.
///
/// Cheaply cloneable; the underlying HTTP client is reference-counted.
/// Holds the Cart Store, the Pending-Order Ledger, final order persistence,
/// and lead capture - all four collections live behind the same credentials.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseStore {
    /// Create a new store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the access key cannot be used as a header value
    /// or the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(key).map_err(|_| {
            StoreError::Validation("store access key contains invalid characters".to_string())
        })?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value.clone());

        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
            StoreError::Validation("store access key contains invalid characters".to_string())
        })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    // =========================================================================
    // Cart Store
    // =========================================================================

    /// Add an item to a user's cart, returning the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid input or when the insert fails.
    #[instrument(skip(self, item), fields(user_id = %item.user_id))]
    pub async fn add_to_cart(&self, item: &NewCartItem) -> Result<CartItem, StoreError> {
        if item.user_id.is_empty() {
            return Err(StoreError::Validation("userId is required".to_string()));
        }
        if item.name.trim().is_empty() {
            return Err(StoreError::Validation("product name is required".to_string()));
        }

        let stored: CartItem = self.insert_returning("cart", item).await?;
        debug!(id = %stored.id, "cart item stored");
        Ok(stored)
    }

    /// Fetch a user's cart items, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure - an empty cart is
    /// `Ok(vec![])`, never an error.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartItem>, StoreError> {
        let url = format!(
            "{}?{}&order=created_at.desc",
            self.collection_url("cart"),
            eq_filter("user_id", user_id.as_str()),
        );

        let response = self.client.get(&url).send().await?;
        let response = check_success(response).await?;
        let items: Vec<CartItem> = parse_json(response).await?;
        debug!(count = items.len(), "cart loaded");
        Ok(items)
    }

    /// Remove a single cart item. Deleting an already-absent row succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the store does not report success.
    #[instrument(skip(self), fields(cart_item_id = %id))]
    pub async fn remove_from_cart(&self, id: &CartItemId) -> Result<(), StoreError> {
        let url = format!("{}?{}", self.collection_url("cart"), eq_filter("id", id.as_str()));

        let response = self.client.delete(&url).send().await?;
        check_success(response).await?;
        debug!("cart item removed");
        Ok(())
    }

    // =========================================================================
    // Pending-Order Ledger
    // =========================================================================

    /// Write the checkout staging record.
    ///
    /// The amount written here becomes the trusted reference value for the
    /// later amount-integrity check.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for empty ids, a non-positive amount,
    /// or an empty snapshot; otherwise propagates store failures.
    #[instrument(skip(self, pending), fields(order_id = %pending.order_id))]
    pub async fn create_pending_order(
        &self,
        pending: &NewPendingOrder,
    ) -> Result<PendingOrder, StoreError> {
        if pending.user_id.is_empty() {
            return Err(StoreError::Validation("userId is required".to_string()));
        }
        if pending.order_id.is_empty() {
            return Err(StoreError::Validation("orderId is required".to_string()));
        }
        if !pending.amount.is_positive() {
            return Err(StoreError::Validation("amount must be positive".to_string()));
        }
        if pending.cart_items.is_empty() {
            return Err(StoreError::Validation("cartItems must not be empty".to_string()));
        }

        let stored: PendingOrder = self.insert_returning("pending_orders", pending).await?;
        debug!(amount = stored.amount.as_won(), "pending order created");
        Ok(stored)
    }

    /// Look up the most recent pending order for `order_id`.
    ///
    /// # Errors
    ///
    /// Absence is `Ok(None)`; transport and API failures are `Err` so the
    /// caller can tell the two apart.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_pending_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PendingOrder>, StoreError> {
        let url = format!(
            "{}?{}&order=created_at.desc&limit=1",
            self.collection_url("pending_orders"),
            eq_filter("order_id", order_id.as_str()),
        );

        let response = self.client.get(&url).send().await?;
        let response = check_success(response).await?;
        let rows: Vec<PendingOrder> = parse_json(response).await?;
        Ok(rows.into_iter().next())
    }

    /// Atomically claim a pending order for finalization.
    ///
    /// Issues a conditional update that transitions `status` from `pending`
    /// to `processing` and returns the claimed row. When another run already
    /// holds the claim the filter matches nothing and `None` comes back -
    /// only one concurrent finalization can proceed past this point.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn claim_pending_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PendingOrder>, StoreError> {
        let url = format!(
            "{}?{}&{}",
            self.collection_url("pending_orders"),
            eq_filter("order_id", order_id.as_str()),
            eq_filter("status", PendingOrderStatus::Pending.as_str()),
        );

        let response = self
            .client
            .patch(&url)
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(&serde_json::json!({ "status": PendingOrderStatus::Processing }))
            .send()
            .await?;
        let response = check_success(response).await?;
        let rows: Vec<PendingOrder> = parse_json(response).await?;

        let claimed = rows.into_iter().next();
        if claimed.is_some() {
            debug!("pending order claimed");
        }
        Ok(claimed)
    }

    /// Release a claimed pending order back to the claimable state.
    ///
    /// Used when gateway confirmation fails so the record stays available
    /// for a user-initiated retry or manual reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn release_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
        let url = format!(
            "{}?{}&{}",
            self.collection_url("pending_orders"),
            eq_filter("order_id", order_id.as_str()),
            eq_filter("status", PendingOrderStatus::Processing.as_str()),
        );

        let response = self
            .client
            .patch(&url)
            .json(&serde_json::json!({ "status": PendingOrderStatus::Pending }))
            .send()
            .await?;
        check_success(response).await?;
        debug!("pending order released");
        Ok(())
    }

    /// Delete a pending order. Idempotent by intent.
    ///
    /// # Errors
    ///
    /// Returns an error when the store does not report success.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_pending_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
        let url = format!(
            "{}?{}",
            self.collection_url("pending_orders"),
            eq_filter("order_id", order_id.as_str()),
        );

        let response = self.client.delete(&url).send().await?;
        check_success(response).await?;
        debug!("pending order deleted");
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Persist a finalized order, returning the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    pub async fn save_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let stored: Order = self.insert_returning("orders", order).await?;
        debug!(
            id = stored.id.as_deref().unwrap_or("-"),
            total = stored.total_amount.as_won(),
            "order saved"
        );
        Ok(stored)
    }

    // =========================================================================
    // Leads
    // =========================================================================

    /// Store a free-trial lead.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when any field is empty; otherwise
    /// propagates store failures.
    #[instrument(skip(self, lead))]
    pub async fn submit_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        if lead.name.trim().is_empty()
            || lead.email.trim().is_empty()
            || lead.phone.trim().is_empty()
        {
            return Err(StoreError::Validation(
                "name, email, and phone are all required".to_string(),
            ));
        }

        let stored: Lead = self.insert_returning("leads", lead).await?;
        debug!(id = stored.id.as_deref().unwrap_or("-"), "lead stored");
        Ok(stored)
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Verify the store is reachable with the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns an error when the probe request fails.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}?limit=1", self.collection_url("pending_orders"));
        let response = self.client.get(&url).send().await?;
        check_success(response).await?;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{collection}", self.base_url)
    }

    /// Insert a row and parse the echoed representation.
    async fn insert_returning<T, B>(&self, collection: &str, body: &B) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.collection_url(collection))
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(body)
            .send()
            .await?;
        let response = check_success(response).await?;
        let status = response.status().as_u16();

        let rows: Vec<T> = parse_json(response).await?;
        rows.into_iter().next().ok_or(StoreError::Api {
            status,
            message: "insert returned no representation".to_string(),
        })
    }
}

/// Build a PostgREST equality filter with an encoded value.
fn eq_filter(column: &str, value: &str) -> String {
    format!("{column}=eq.{}", urlencoding::encode(value))
}

/// Map non-success responses to `StoreError::Api` with a truncated body.
async fn check_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(500)
        .collect();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Parse a JSON body, surfacing the parse failure as a `StoreError`.
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| StoreError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter_encodes_values() {
        assert_eq!(eq_filter("order_id", "order_1"), "order_id=eq.order_1");
        assert_eq!(eq_filter("user_id", "a b"), "user_id=eq.a%20b");
        // Reserved characters must not leak into the query string
        assert_eq!(eq_filter("id", "x&y=z"), "id=eq.x%26y%3Dz");
    }
}
