//! Order pipeline commands for staff without the admin API at hand.
//!
//! # Usage
//!
//! ```bash
//! bh-cli orders list --status pending
//! bh-cli orders show 42
//! bh-cli orders advance 42
//! bh-cli orders transition 42 cancelled
//! ```

use std::sync::Arc;

use brewhouse_core::store::postgres::PgOrderStore;
use brewhouse_core::{LifecycleError, Order, OrderId, OrderLifecycle, OrderStatus};
use thiserror::Error;

use super::migrate::{self, MigrationError};

/// Errors that can occur during order commands.
#[derive(Debug, Error)]
pub enum OrdersError {
    #[error(transparent)]
    Connect(#[from] MigrationError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

async fn lifecycle() -> Result<OrderLifecycle, OrdersError> {
    let pool = migrate::connect().await?;
    Ok(OrderLifecycle::new(Arc::new(PgOrderStore::new(pool))))
}

fn summary_line(order: &Order) -> String {
    format!(
        "#{:<6} {:<10} {:>10} {:<20} {}",
        order.id.to_string(),
        order.status.as_str(),
        order.summary.total.to_string(),
        order.customer.name,
        order.created_at.format("%Y-%m-%d %H:%M"),
    )
}

/// Print orders, newest first.
pub async fn list(status: Option<OrderStatus>) -> Result<(), OrdersError> {
    let lifecycle = lifecycle().await?;
    let orders = match status {
        Some(status) => lifecycle.by_status(status).await?,
        None => lifecycle.all().await?,
    };

    #[allow(clippy::print_stdout)]
    {
        for order in &orders {
            println!("{}", summary_line(order));
        }
        println!("{} order(s)", orders.len());
    }
    Ok(())
}

/// Print one order with its line items.
pub async fn show(id: OrderId) -> Result<(), OrdersError> {
    let order = lifecycle().await?.get(id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", summary_line(&order));
        for item in &order.items {
            println!(
                "  {:>2} x {:<24} {:>10}",
                item.quantity,
                item.name,
                item.line_total().to_string()
            );
        }
        println!(
            "  subtotal {}  tax {}  delivery {}  discount {}",
            order.summary.subtotal,
            order.summary.tax,
            order.summary.delivery_fee,
            order.summary.discount,
        );
    }
    Ok(())
}

/// Move an order to `target`.
pub async fn transition(id: OrderId, target: OrderStatus) -> Result<(), OrdersError> {
    let order = lifecycle().await?.transition(id, target, None).await?;
    tracing::info!("Order {} is now {}", order.id, order.status);
    Ok(())
}

/// Move an order one step along the pipeline.
pub async fn advance(id: OrderId) -> Result<(), OrdersError> {
    let order = lifecycle().await?.advance(id, None).await?;
    tracing::info!("Order {} is now {}", order.id, order.status);
    Ok(())
}
