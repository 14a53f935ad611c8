//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (order store reachable)
//!
//! GET    /orders?status=               - Orders, newest first
//! GET    /orders/{id}                  - Order with its legal next statuses
//! POST   /orders/{id}/transition       - Move to a named status
//! POST   /orders/{id}/advance          - Move one step along the pipeline
//! POST   /orders/{id}/cancel           - Cancel a pending order
//! ```
//!
//! Every write accepts an optional `expected_updated_at`. When it no longer
//! matches the stored order the write is refused with 409 Conflict.

pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/transition", post(orders::transition))
        .route("/orders/{id}/advance", post(orders::advance))
        .route("/orders/{id}/cancel", post(orders::cancel))
}
