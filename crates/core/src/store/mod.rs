//! Order persistence.
//!
//! [`OrderStore`] is the seam between checkout/lifecycle logic and wherever
//! orders actually live. Two implementations ship with the crate:
//!
//! - [`MemoryOrderStore`] - process-local, used by tests and local runs
//! - `PgOrderStore` - `PostgreSQL`, behind the `postgres` feature
//!
//! Every implementation must make [`OrderStore::update_status`] a
//! compare-and-set on the current status so two concurrent transitions of
//! the same order cannot both succeed.

mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::order::{NewOrder, Order};
use crate::types::{OrderId, OrderStatus};

pub use memory::MemoryOrderStore;

/// Errors returned by order stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Requested order does not exist.
    #[error("order not found")]
    NotFound,

    /// The order's status changed since the caller read it.
    #[error("order was modified concurrently")]
    Conflict,

    /// Backend failure.
    #[error("database error: {0}")]
    Database(String),

    /// Stored data could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::DataCorruption(err.to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

/// Filter for [`OrderStore::list_orders`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    /// Only orders currently in this status.
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Every order.
    #[must_use]
    pub const fn all() -> Self {
        Self { status: None }
    }

    /// Orders in one status.
    #[must_use]
    pub const fn by_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status)
    }
}

/// Storage for submitted orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order in `pending` status.
    ///
    /// If an order with the same `submission_key` already exists it is
    /// returned unchanged and nothing is inserted.
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Fetch one order.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders matching `filter`, newest first.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Set the status of an order whose current status is `expected`.
    ///
    /// Returns [`StoreError::Conflict`] if the order is no longer in
    /// `expected`, and [`StoreError::NotFound`] if it does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, StoreError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
