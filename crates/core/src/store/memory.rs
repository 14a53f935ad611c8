//! In-process order store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::{OrderFilter, OrderStore, StoreError};
use crate::order::{NewOrder, Order};
use crate::types::{OrderId, OrderStatus};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    orders: BTreeMap<OrderId, Order>,
    by_key: HashMap<Uuid, OrderId>,
}

/// Order store backed by a map behind a lock.
///
/// Each operation takes the lock once, so check-and-write is atomic.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    inner: RwLock<Inner>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.inner.write();

        if let Some(id) = inner.by_key.get(&order.submission_key)
            && let Some(existing) = inner.orders.get(id)
        {
            return Ok(existing.clone());
        }

        inner.next_id += 1;
        let id = OrderId::new(inner.next_id);
        let key = order.submission_key;
        let order = order.into_order(id, Utc::now());

        inner.by_key.insert(key, id);
        inner.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.inner.read().orders.get(&id).cloned())
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read();
        // IDs grow with creation time, so reverse key order is newest first.
        Ok(inner
            .orders
            .values()
            .rev()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        let mut inner = self.inner.write();
        let order = inner.orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        if order.status != expected {
            return Err(StoreError::Conflict);
        }
        order.status = status;
        order.updated_at = updated_at;
        Ok(order.clone())
    }
}
