//! Order status transitions.
//!
//! ```text
//! pending -> confirmed -> preparing -> ready -> delivered
//!    |
//!    +-> cancelled
//! ```
//!
//! [`legal_targets`] is the only place the table is written down. Everything
//! else (the admin "advance" button, the CLI, the manager below) asks it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::order::Order;
use crate::store::{OrderFilter, OrderStore, StoreError};
use crate::types::{OrderId, OrderStatus};

/// Statuses an order may move to from `from`. Empty for terminal statuses.
#[must_use]
pub const fn legal_targets(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Preparing],
        OrderStatus::Preparing => &[OrderStatus::Ready],
        OrderStatus::Ready => &[OrderStatus::Delivered],
        OrderStatus::Delivered | OrderStatus::Cancelled => &[],
    }
}

/// The next status along the main pipeline, or `None` for terminal statuses.
#[must_use]
pub const fn next_legal_status(current: OrderStatus) -> Option<OrderStatus> {
    match legal_targets(current) {
        [next, ..] => Some(*next),
        [] => None,
    }
}

/// Whether `from -> to` is in the table.
#[must_use]
pub fn is_legal(from: OrderStatus, to: OrderStatus) -> bool {
    legal_targets(from).contains(&to)
}

/// Errors from [`OrderLifecycle`].
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The requested move is not in the transition table.
    #[error("order {order_id} cannot move from {from} to {to}")]
    IllegalTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The order is delivered or cancelled; nothing follows.
    #[error("order {order_id} is already {status} and has no further steps")]
    AlreadyFinal {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// Someone else changed the order first; reload and retry.
    #[error("order {order_id} was changed by someone else, reload and try again")]
    ConcurrentUpdateConflict { order_id: OrderId },

    #[error("order {0} not found")]
    NotFound(OrderId),

    #[error(transparent)]
    Store(StoreError),
}

impl LifecycleError {
    fn from_store(order_id: OrderId, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound(order_id),
            StoreError::Conflict => Self::ConcurrentUpdateConflict { order_id },
            other => Self::Store(other),
        }
    }
}

/// Moves orders through the pipeline.
///
/// Cheap to clone; all state lives in the store.
#[derive(Clone)]
pub struct OrderLifecycle {
    store: Arc<dyn OrderStore>,
}

impl std::fmt::Debug for OrderLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLifecycle").finish_non_exhaustive()
    }
}

impl OrderLifecycle {
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// Move an order to `target`.
    ///
    /// When `expected_updated_at` is given and the stored order has changed
    /// since then, the request is refused without writing anything.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::IllegalTransition`] if the move is not in the table
    /// - [`LifecycleError::ConcurrentUpdateConflict`] if the order changed
    ///   under the caller
    /// - [`LifecycleError::NotFound`] if the order does not exist
    #[tracing::instrument(skip(self), fields(from))]
    pub async fn transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Order, LifecycleError> {
        let current = self.get(order_id).await?;
        tracing::Span::current().record("from", current.status.as_str());

        if expected_updated_at.is_some_and(|seen| seen != current.updated_at) {
            return Err(LifecycleError::ConcurrentUpdateConflict { order_id });
        }
        if !is_legal(current.status, target) {
            return Err(LifecycleError::IllegalTransition {
                order_id,
                from: current.status,
                to: target,
            });
        }

        let order = self
            .store
            .update_status(order_id, current.status, target, Utc::now())
            .await
            .map_err(|e| LifecycleError::from_store(order_id, e))?;

        tracing::info!(
            order_id = %order_id,
            from = %current.status,
            to = %target,
            "order status changed"
        );
        Ok(order)
    }

    /// Move an order one step along the main pipeline.
    ///
    /// # Errors
    ///
    /// Same as [`OrderLifecycle::transition`], plus
    /// [`LifecycleError::AlreadyFinal`] for a delivered or cancelled order.
    pub async fn advance(
        &self,
        order_id: OrderId,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Order, LifecycleError> {
        let current = self.get(order_id).await?;
        let Some(next) = next_legal_status(current.status) else {
            return Err(LifecycleError::AlreadyFinal {
                order_id,
                status: current.status,
            });
        };
        self.transition(order_id, next, expected_updated_at).await
    }

    /// Cancel a pending order.
    ///
    /// # Errors
    ///
    /// Same as [`OrderLifecycle::transition`].
    pub async fn cancel(
        &self,
        order_id: OrderId,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Order, LifecycleError> {
        self.transition(order_id, OrderStatus::Cancelled, expected_updated_at)
            .await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] if it does not exist.
    pub async fn get(&self, order_id: OrderId) -> Result<Order, LifecycleError> {
        self.store
            .get_order(order_id)
            .await
            .map_err(|e| LifecycleError::from_store(order_id, e))?
            .ok_or(LifecycleError::NotFound(order_id))
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] if the store fails.
    pub async fn all(&self) -> Result<Vec<Order>, LifecycleError> {
        self.store
            .list_orders(OrderFilter::all())
            .await
            .map_err(LifecycleError::Store)
    }

    /// Orders currently in `status`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] if the store fails.
    pub async fn by_status(&self, status: OrderStatus) -> Result<Vec<Order>, LifecycleError> {
        self.store
            .list_orders(OrderFilter::by_status(status))
            .await
            .map_err(LifecycleError::Store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::cart::{CartLineItem, NewLineItem};
    use crate::customer::CustomerInfo;
    use crate::order::NewOrder;
    use crate::pricing::compute_summary;
    use crate::store::MemoryOrderStore;
    use crate::types::{DeliveryType, Money};

    async fn lifecycle_with_order() -> (OrderLifecycle, Order) {
        let store = Arc::new(MemoryOrderStore::new());
        let items = vec![CartLineItem::from_new(
            NewLineItem::new("cold-brew", "Cold Brew", Money::new(55_000)),
            1,
        )];
        let summary = compute_summary(&items, DeliveryType::Pickup);
        let order = store
            .create_order(NewOrder {
                submission_key: Uuid::new_v4(),
                items,
                customer: CustomerInfo::default(),
                summary,
            })
            .await
            .unwrap();
        (OrderLifecycle::new(store), order)
    }

    #[test]
    fn test_pending_targets() {
        assert_eq!(
            legal_targets(OrderStatus::Pending),
            &[OrderStatus::Confirmed, OrderStatus::Cancelled]
        );
        assert_eq!(next_legal_status(OrderStatus::Pending), Some(OrderStatus::Confirmed));
    }

    #[test]
    fn test_terminal_statuses_have_no_targets() {
        for status in OrderStatus::ALL {
            assert_eq!(status.is_terminal(), legal_targets(status).is_empty());
            if status.is_terminal() {
                assert_eq!(next_legal_status(status), None);
                for target in OrderStatus::ALL {
                    assert!(!is_legal(status, target));
                }
            }
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!is_legal(OrderStatus::Pending, OrderStatus::Preparing));
        assert!(!is_legal(OrderStatus::Ready, OrderStatus::Preparing));
        assert!(!is_legal(OrderStatus::Confirmed, OrderStatus::Cancelled));
        assert!(!is_legal(OrderStatus::Pending, OrderStatus::Pending));
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let (lifecycle, order) = lifecycle_with_order().await;
        let mut status = order.status;
        while let Some(next) = next_legal_status(status) {
            let updated = lifecycle.advance(order.id, None).await.unwrap();
            assert_eq!(updated.status, next);
            assert!(updated.updated_at >= order.updated_at);
            status = updated.status;
        }
        assert_eq!(status, OrderStatus::Delivered);

        let err = lifecycle.advance(order.id, None).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::AlreadyFinal {
                status: OrderStatus::Delivered,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            format!("order {} is already delivered and has no further steps", order.id)
        );
    }

    #[tokio::test]
    async fn test_cancelled_order_cannot_advance() {
        let (lifecycle, order) = lifecycle_with_order().await;
        lifecycle.cancel(order.id, None).await.unwrap();

        let err = lifecycle.advance(order.id, None).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::AlreadyFinal {
                status: OrderStatus::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_illegal_transition_names_both_statuses() {
        let (lifecycle, order) = lifecycle_with_order().await;
        let err = lifecycle
            .transition(order.id, OrderStatus::Ready, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("order {} cannot move from pending to ready", order.id)
        );
        assert_eq!(lifecycle.get(order.id).await.unwrap().status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_cancel_only_from_pending() {
        let (lifecycle, order) = lifecycle_with_order().await;
        lifecycle.advance(order.id, None).await.unwrap();
        let err = lifecycle.cancel(order.id, None).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::IllegalTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stale_view_is_a_conflict() {
        let (lifecycle, order) = lifecycle_with_order().await;
        let stale = order.updated_at - chrono::TimeDelta::seconds(1);

        let err = lifecycle
            .transition(order.id, OrderStatus::Confirmed, Some(stale))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::ConcurrentUpdateConflict { .. }));
        assert_eq!(lifecycle.get(order.id).await.unwrap().status, OrderStatus::Pending);

        let fresh = lifecycle
            .transition(order.id, OrderStatus::Confirmed, Some(order.updated_at))
            .await
            .unwrap();
        assert_eq!(fresh.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_racing_transitions_have_one_winner() {
        let (lifecycle, order) = lifecycle_with_order().await;
        let confirm = lifecycle.transition(order.id, OrderStatus::Confirmed, None);
        let cancel = lifecycle.transition(order.id, OrderStatus::Cancelled, None);
        let (a, b) = tokio::join!(confirm, cancel);

        assert_eq!(u8::from(a.is_ok()) + u8::from(b.is_ok()), 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(
            loser,
            Err(LifecycleError::ConcurrentUpdateConflict { .. } | LifecycleError::IllegalTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_order() {
        let (lifecycle, _) = lifecycle_with_order().await;
        let err = lifecycle.advance(OrderId::new(404), None).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(id) if id == OrderId::new(404)));
        assert!(lifecycle.by_status(OrderStatus::Ready).await.unwrap().is_empty());
        assert_eq!(lifecycle.all().await.unwrap().len(), 1);
    }
}
