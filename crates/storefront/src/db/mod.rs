//! Database connection for the storefront.
//!
//! # Database: `brewhouse`
//!
//! ## Tables
//!
//! - `brewhouse.orders` - Submitted orders (see `brewhouse_core::store::postgres`)
//! - `tower_sessions.session` - Shopper sessions
//!
//! # Migrations
//!
//! Migrations are NOT run on start-up. Run them via:
//! ```bash
//! cargo run -p brewhouse-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
