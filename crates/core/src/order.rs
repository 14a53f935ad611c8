//! Submitted orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartLineItem;
use crate::customer::CustomerInfo;
use crate::pricing::OrderSummary;
use crate::types::{OrderId, OrderStatus};

/// An immutable snapshot of a cart at submission time.
///
/// `items`, `customer` and `summary` never change after creation; only
/// `status` and `updated_at` move, through [`crate::OrderLifecycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Client-side key identifying the submission that created this order.
    pub submission_key: Uuid,
    pub items: Vec<CartLineItem>,
    pub customer: CustomerInfo,
    pub summary: OrderSummary,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What checkout hands to the order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Resubmitting with the same key returns the existing order.
    pub submission_key: Uuid,
    pub items: Vec<CartLineItem>,
    pub customer: CustomerInfo,
    pub summary: OrderSummary,
}

impl NewOrder {
    /// Whether two submissions carry the same cart contents and form.
    #[must_use]
    pub fn same_contents(&self, other: &Self) -> bool {
        self.items == other.items && self.customer == other.customer && self.summary == other.summary
    }

    /// Turn the submission into a pending order.
    #[must_use]
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            submission_key: self.submission_key,
            items: self.items,
            customer: self.customer,
            summary: self.summary,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
