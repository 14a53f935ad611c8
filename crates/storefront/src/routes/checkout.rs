//! Checkout wizard route handlers.
//!
//! A blocked step move is not an error: it comes back with status 200 and
//! `"outcome": "blocked"` naming the missing fields. Form edits and step
//! moves are refused with 409 while a submission is in flight. Submission
//! returns the created order, or an error the shopper can retry.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use brewhouse_core::{AddressCandidate, CustomerInfoPatch, Order, StepOutcome};

use super::cart::CartView;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentCart;
use crate::models::{PlacedOrders, session_keys};
use crate::state::AppState;

/// Result of a wizard command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResponse {
    #[serde(flatten)]
    pub outcome: StepOutcome,
    pub cart: CartView,
}

/// Jump request body.
#[derive(Debug, Deserialize)]
pub struct SetStepRequest {
    pub step: u8,
}

/// Merge changes into the checkout form.
#[instrument(skip(cart, patch))]
pub async fn update_customer(
    cart: CurrentCart,
    Json(patch): Json<CustomerInfoPatch>,
) -> Result<Json<CartView>> {
    let mut checkout = cart.checkout.lock().await;
    checkout.cart_mut()?.update_customer_info(patch);
    Ok(Json(CartView::from_checkout(&checkout)))
}

/// Use an address picked from the suggestion list.
#[instrument(skip(cart, candidate))]
pub async fn choose_address(
    cart: CurrentCart,
    Json(candidate): Json<AddressCandidate>,
) -> Result<Json<CartView>> {
    let mut checkout = cart.checkout.lock().await;
    checkout.cart_mut()?.choose_address(&candidate);
    Ok(Json(CartView::from_checkout(&checkout)))
}

/// Move forward one step.
#[instrument(skip(cart))]
pub async fn advance(cart: CurrentCart) -> Result<Json<StepResponse>> {
    let mut checkout = cart.checkout.lock().await;
    let outcome = checkout.advance()?;
    if let StepOutcome::Blocked(blocked) = &outcome {
        tracing::debug!(%blocked, "advance blocked");
    }
    Ok(Json(StepResponse {
        outcome,
        cart: CartView::from_checkout(&checkout),
    }))
}

/// Move back one step.
#[instrument(skip(cart))]
pub async fn retreat(cart: CurrentCart) -> Result<Json<StepResponse>> {
    let mut checkout = cart.checkout.lock().await;
    let outcome = checkout.retreat()?;
    Ok(Json(StepResponse {
        outcome,
        cart: CartView::from_checkout(&checkout),
    }))
}

/// Go to a step, honouring the same gates as repeated advances.
#[instrument(skip(cart))]
pub async fn set_step(
    cart: CurrentCart,
    Json(request): Json<SetStepRequest>,
) -> Result<Json<StepResponse>> {
    let mut checkout = cart.checkout.lock().await;
    let outcome = checkout.go_to(request.step)?;
    Ok(Json(StepResponse {
        outcome,
        cart: CartView::from_checkout(&checkout),
    }))
}

/// Submit the cart as an order.
#[instrument(skip(state, cart, session))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    cart: CurrentCart,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.checkout().submit(cart.checkout).await?;

    // The order is placed; session history is best effort from here.
    if let Err(err) = record_placed_order(&session, &order).await {
        tracing::warn!(order_id = %order.id, error = %err, "failed to record order in session");
    }

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &order.id.to_string())]),
    );
    Ok((StatusCode::CREATED, Json(order)))
}

async fn record_placed_order(
    session: &Session,
    order: &Order,
) -> std::result::Result<(), tower_sessions::session::Error> {
    let mut placed: PlacedOrders = session
        .get(session_keys::PLACED_ORDERS)
        .await?
        .unwrap_or_default();
    placed.record(order.id);
    session.insert(session_keys::PLACED_ORDERS, placed).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use brewhouse_core::{CustomerInfoPatch, MemoryOrderStore, Money, NewLineItem};
    use secrecy::SecretString;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::{SessionStore, session_store};
    use uuid::Uuid;

    use super::*;
    use crate::config::{CheckoutConfig, StorefrontConfig};
    use crate::models::CartToken;

    /// Session backend that is down.
    #[derive(Debug, Clone)]
    struct UnreachableSessions;

    #[async_trait]
    impl SessionStore for UnreachableSessions {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("connection refused".to_string()))
        }

        async fn load(&self, _id: &Id) -> session_store::Result<Option<Record>> {
            Err(session_store::Error::Backend("connection refused".to_string()))
        }

        async fn delete(&self, _id: &Id) -> session_store::Result<()> {
            Err(session_store::Error::Backend("connection refused".to_string()))
        }
    }

    fn state(orders: Arc<MemoryOrderStore>) -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            checkout: CheckoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };
        AppState::new(config, orders)
    }

    #[tokio::test]
    async fn test_order_is_placed_when_session_history_fails() {
        let orders = Arc::new(MemoryOrderStore::new());
        let state = state(orders.clone());
        let token = Uuid::new_v4();
        let checkout = state.carts().get_or_create(token).await;
        {
            let mut guard = checkout.lock().await;
            let cart = guard.cart_mut().unwrap();
            cart.add_item(NewLineItem::new("latte", "Latte", Money::new(45_000)));
            cart.update_customer_info(CustomerInfoPatch {
                name: Some("Minh".to_string()),
                phone: Some("0987654321".to_string()),
                ..CustomerInfoPatch::default()
            });
            guard.go_to(3).unwrap();
        }

        let session = Session::new(Some(Id::default()), Arc::new(UnreachableSessions), None);
        let cart = CurrentCart {
            token: CartToken(token),
            checkout: checkout.clone(),
        };

        let (status, Json(order)) = submit(State(state), session, cart).await.unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(orders.len(), 1);
        assert_eq!(order.items.len(), 1);
        assert!(checkout.lock().await.cart().is_empty());
    }
}
