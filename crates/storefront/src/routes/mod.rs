//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (probes the data store)
//!
//! # Catalog
//! GET  /products               - Recommendation catalog (?category= filter)
//!
//! # Leads
//! POST /leads                  - Free-trial signup
//!
//! # Consultation CRM
//! GET  /consult                - Recent consultation leads
//! POST /consult                - Save a consultation lead
//!
//! # Cart (requires x-user-id)
//! GET  /cart                   - Current user's cart
//! POST /cart/add               - Add an item
//! POST /cart/remove            - Remove an item
//! POST /cart/checkout          - Create the pending order for the gateway UI
//!
//! # Payment (gateway redirect targets)
//! GET  /payment/success        - Confirm the charge and finalize the order
//! GET  /payment/fail           - Friendly message for gateway error codes
//!
//! # Chat
//! POST /api/chat               - Consultation chat (optionally web-grounded)
//! POST /api/search/trigger     - Web search for chat augmentation
//! ```

pub mod cart;
pub mod chat;
pub mod consult;
pub mod leads;
pub mod payment;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the payment redirect routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/success", get(payment::success))
        .route("/fail", get(payment::fail))
}

/// Create the chat API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/search/trigger", post(chat::search_trigger))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/products", get(products::index))
        // Leads
        .route("/leads", post(leads::create))
        // Consultation CRM
        .route("/consult", get(consult::index).post(consult::create))
        // Cart routes
        .nest("/cart", cart_routes())
        // Payment gateway redirect targets
        .nest("/payment", payment_routes())
        // Chat API
        .nest("/api", api_routes())
}
