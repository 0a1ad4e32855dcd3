//! Supabase REST (PostgREST) persistence layer.
//!
//! # Architecture
//!
//! - The data store is reached purely over its REST surface - no SQL driver,
//!   no local sync, direct HTTP calls per operation
//! - Every request carries `apikey` and `Authorization: Bearer` headers
//! - Writes use `POST` with `Prefer: return=representation` so the inserted
//!   row (and its assigned id) comes back
//! - Reads filter with the `?column=eq.value` query syntax and order with
//!   `order=column.desc`
//! - Conditional updates use `PATCH` with the same filter syntax; this is
//!   what makes the pending-order claim atomic on the server side
//!
//! # Collections
//!
//! - `leads` - Free-trial signups
//! - `cart` - Per-user cart items
//! - `pending_orders` - Checkout staging records awaiting confirmation
//! - `orders` - Finalized orders, append-only
//!
//! # Example
//!
//! ```rust,ignore
//! use face_calendar_storefront::supabase::SupabaseStore;
//!
//! let store = SupabaseStore::new(&config.supabase)?;
//!
//! let items = store.get_cart(&user_id).await?;
//! store.create_pending_order(&new_pending).await?;
//! ```

mod client;
pub mod types;

pub use client::SupabaseStore;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the data store.
///
/// Absence is never an error here: lookups return `Option`/empty collections
/// so callers can tell "not found" apart from a transport or API failure and
/// choose to retry one but not the other.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller input rejected before any network call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store responded with a non-success status.
    #[error("store API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected row shape.
    #[error("parse error: {0}")]
    Parse(String),
}
