//! Order history for the current session (read-only).

use axum::{
    Json,
    extract::{Path, State},
};
use tower_sessions::Session;
use tracing::instrument;

use brewhouse_core::{Order, OrderId};

use crate::error::{AppError, Result};
use crate::models::{PlacedOrders, session_keys};
use crate::state::AppState;

async fn placed_orders(session: &Session) -> Result<PlacedOrders> {
    Ok(session
        .get(session_keys::PLACED_ORDERS)
        .await?
        .unwrap_or_default())
}

/// Orders placed from this session, newest first.
#[instrument(skip(state, session))]
pub async fn list(State(state): State<AppState>, session: Session) -> Result<Json<Vec<Order>>> {
    let placed = placed_orders(&session).await?;

    let mut orders = Vec::with_capacity(placed.0.len());
    for id in placed.0.iter().rev() {
        if let Some(order) = state.orders().get_order(*id).await? {
            orders.push(order);
        }
    }
    Ok(Json(orders))
}

/// One order placed from this session.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let not_found = || AppError::NotFound(format!("order {id}"));

    if !placed_orders(&session).await?.contains(id) {
        return Err(not_found());
    }
    state
        .orders()
        .get_order(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}
