//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness
//! GET    /health/ready          - Readiness (order store reachable)
//!
//! # Cart
//! GET    /cart                  - Cart view
//! DELETE /cart                  - Clear cart
//! POST   /cart/items            - Add one unit of an item
//! PATCH  /cart/items/{id}       - Set quantity (<= 0 removes)
//! DELETE /cart/items/{id}       - Remove line
//!
//! # Checkout
//! PATCH  /checkout/customer     - Merge form fields
//! POST   /checkout/address      - Choose suggested address
//! POST   /checkout/advance      - Next step
//! POST   /checkout/retreat      - Previous step
//! PUT    /checkout/step         - Go to step
//! POST   /checkout/submit       - Place order
//!
//! # Orders (this session only)
//! GET    /orders                - Orders placed from this session
//! GET    /orders/{id}           - One of those orders
//! ```

pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::state::AppState;

/// Cart, checkout and order routes, excluding submission.
fn shopper_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/{id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/checkout/customer", patch(checkout::update_customer))
        .route("/checkout/address", post(checkout::choose_address))
        .route("/checkout/advance", post(checkout::advance))
        .route("/checkout/retreat", post(checkout::retreat))
        .route("/checkout/step", put(checkout::set_step))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
}

fn submit_routes() -> Router<AppState> {
    Router::new().route("/checkout/submit", post(checkout::submit))
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create the storefront router without rate limiting.
pub fn routes() -> Router<AppState> {
    health_routes().merge(shopper_routes()).merge(submit_routes())
}

/// Create the storefront router with per-IP rate limits.
///
/// Submission gets its own, stricter limiter.
pub fn rate_limited_routes(api: RateLimiterLayer, submit: RateLimiterLayer) -> Router<AppState> {
    health_routes()
        .merge(shopper_routes().layer(api))
        .merge(submit_routes().layer(submit))
}
