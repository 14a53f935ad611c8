//! `PostgreSQL` order store.
//!
//! # Table: `brewhouse.orders`
//!
//! Line items, the checkout form and the price summary are stored as `JSONB`
//! snapshots; only `status` and `updated_at` are ever updated.
//!
//! Migrations live in `crates/core/migrations/` and run via:
//! ```bash
//! cargo run -p brewhouse-cli -- migrate
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::{OrderFilter, OrderStore, StoreError};
use crate::cart::CartLineItem;
use crate::customer::CustomerInfo;
use crate::order::{NewOrder, Order};
use crate::pricing::OrderSummary;
use crate::types::{OrderId, OrderStatus};

const ORDER_COLUMNS: &str =
    "id, submission_key, items, customer, summary, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    submission_key: Uuid,
    items: Json<Vec<CartLineItem>>,
    customer: Json<CustomerInfo>,
    summary: Json<OrderSummary>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            submission_key: row.submission_key,
            items: row.items.0,
            customer: row.customer.0,
            summary: row.summary.0,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Order store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_key(&self, key: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM brewhouse.orders WHERE submission_key = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Order::from))
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[tracing::instrument(skip(self, order), fields(submission_key = %order.submission_key))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let inserted = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO brewhouse.orders (submission_key, items, customer, summary)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (submission_key) DO NOTHING
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.submission_key)
        .bind(Json(&order.items))
        .bind(Json(&order.customer))
        .bind(Json(&order.summary))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row.into());
        }

        tracing::info!("submission key already used; returning existing order");
        self.find_by_key(order.submission_key)
            .await?
            .ok_or_else(|| {
                StoreError::DataCorruption("submission key conflict without an order".to_string())
            })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM brewhouse.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Order::from))
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM brewhouse.orders
            WHERE $1::brewhouse.order_status IS NULL OR status = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    #[tracing::instrument(skip(self), fields(order_id = %id))]
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        let updated = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE brewhouse.orders
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(expected)
        .bind(status)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(row.into());
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM brewhouse.orders WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Err(StoreError::Conflict)
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
