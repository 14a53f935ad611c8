//! Order pipeline route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use brewhouse_core::lifecycle::{legal_targets, next_legal_status};
use brewhouse_core::{Order, OrderId, OrderStatus};

use crate::error::Result;
use crate::state::AppState;

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
}

/// An order plus the moves staff can make from here.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    /// Every status the order may move to next.
    pub next_statuses: &'static [OrderStatus],
    /// Target of the "advance" action, if any.
    pub next_status: Option<OrderStatus>,
}

impl From<Order> for OrderDetail {
    fn from(order: Order) -> Self {
        let status = order.status;
        Self {
            order,
            next_statuses: legal_targets(status),
            next_status: next_legal_status(status),
        }
    }
}

/// Body for an explicit status change.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    /// `updated_at` of the order as the caller last saw it.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

/// Body for advance and cancel. May be omitted entirely.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionRequest {
    pub expected_updated_at: Option<DateTime<Utc>>,
}

/// List orders, newest first, optionally filtered by status.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderDetail>>> {
    let orders = match query.status {
        Some(status) => state.lifecycle().by_status(status).await?,
        None => state.lifecycle().all().await?,
    };
    Ok(Json(orders.into_iter().map(OrderDetail::from).collect()))
}

/// Show one order.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = state.lifecycle().get(id).await?;
    Ok(Json(order.into()))
}

/// Move an order to a named status.
#[instrument(skip(state, request), fields(target = %request.status))]
pub async fn transition(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<OrderDetail>> {
    let order = state
        .lifecycle()
        .transition(id, request.status, request.expected_updated_at)
        .await?;
    Ok(Json(order.into()))
}

/// Move an order one step along the pipeline.
#[instrument(skip(state, request))]
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    request: Option<Json<ActionRequest>>,
) -> Result<Json<OrderDetail>> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let order = state
        .lifecycle()
        .advance(id, request.expected_updated_at)
        .await?;
    Ok(Json(order.into()))
}

/// Cancel a pending order.
#[instrument(skip(state, request))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    request: Option<Json<ActionRequest>>,
) -> Result<Json<OrderDetail>> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let order = state
        .lifecycle()
        .cancel(id, request.expected_updated_at)
        .await?;
    Ok(Json(order.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use brewhouse_core::{CustomerInfo, NewOrder, OrderSummary};
    use uuid::Uuid;

    fn order(status: OrderStatus) -> Order {
        let mut order = NewOrder {
            submission_key: Uuid::new_v4(),
            items: Vec::new(),
            customer: CustomerInfo::default(),
            summary: OrderSummary::default(),
        }
        .into_order(OrderId::new(1), Utc::now());
        order.status = status;
        order
    }

    #[test]
    fn test_detail_lists_next_statuses() {
        let detail = OrderDetail::from(order(OrderStatus::Pending));
        assert_eq!(
            detail.next_statuses,
            &[OrderStatus::Confirmed, OrderStatus::Cancelled]
        );
        assert_eq!(detail.next_status, Some(OrderStatus::Confirmed));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["next_status"], "confirmed");
    }

    #[test]
    fn test_terminal_detail_has_no_moves() {
        let detail = OrderDetail::from(order(OrderStatus::Delivered));
        assert!(detail.next_statuses.is_empty());
        assert_eq!(detail.next_status, None);
    }

    #[test]
    fn test_action_body_fields_are_optional() {
        let body: ActionRequest = serde_json::from_str("{}").unwrap();
        assert!(body.expected_updated_at.is_none());

        let body: TransitionRequest = serde_json::from_str(r#"{"status":"ready"}"#).unwrap();
        assert_eq!(body.status, OrderStatus::Ready);
    }
}
