//! Integration tests for Brewhouse.
//!
//! Both binaries are driven in-process through their routers, with the
//! in-memory order and session stores standing in for `PostgreSQL`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p brewhouse-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Storefront cart, wizard and submission
//! - `admin_orders` - Admin order pipeline
//! - `order_store_postgres` - `PostgreSQL` order store (ignored by default,
//!   needs `DATABASE_URL`; run with `-- --ignored`)

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use brewhouse_core::{
    MemoryOrderStore, NewOrder, Order, OrderFilter, OrderId, OrderStatus, OrderStore, StoreError,
};
use brewhouse_storefront::config::{CheckoutConfig, StorefrontConfig};

/// Storefront configuration for tests. Plain HTTP so cookies are not `Secure`.
#[must_use]
pub fn storefront_config(checkout: CheckoutConfig) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/brewhouse_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        checkout,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Build a storefront router over `orders` with in-memory sessions.
pub fn storefront(orders: Arc<dyn OrderStore>, checkout: CheckoutConfig) -> TestClient {
    let state = brewhouse_storefront::state::AppState::new(storefront_config(checkout), orders);
    TestClient::new(brewhouse_storefront::app(state, MemoryStore::default(), false))
}

/// Build an admin router over `orders`.
pub fn admin(orders: Arc<dyn OrderStore>) -> TestClient {
    let state = brewhouse_admin::state::AppState::new(orders);
    TestClient::new(brewhouse_admin::app(state))
}

/// A response status with its body parsed as JSON.
///
/// Non-JSON bodies come back as a JSON string, empty bodies as `null`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Sends requests through a router, carrying the session cookie between
/// calls like a browser would.
#[derive(Clone)]
pub struct TestClient {
    router: Router,
    cookie: Arc<Mutex<Option<String>>>,
}

impl TestClient {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router,
            cookie: Arc::new(Mutex::new(None)),
        }
    }

    /// A client for the same app with no session cookie.
    #[must_use]
    pub fn fresh_session(&self) -> Self {
        Self::new(self.router.clone())
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str) -> TestResponse {
        self.send(Method::POST, uri, None).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = self.cookie.lock().clone() {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            *self.cookie.lock() = Some(pair);
        }

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

/// Order store that waits before accepting each order.
///
/// The delay can be changed between requests to simulate a slow store
/// recovering.
#[derive(Debug, Default)]
pub struct SlowOrderStore {
    inner: MemoryOrderStore,
    delay_ms: AtomicU64,
}

impl SlowOrderStore {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let store = Self::default();
        store.set_delay(delay);
        store
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(
            u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            Ordering::SeqCst,
        );
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl OrderStore for SlowOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let delay = Duration::from_millis(self.delay_ms.load(Ordering::SeqCst));
        tokio::time::sleep(delay).await;
        self.inner.create_order(order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.inner.get_order(id).await
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        self.inner.list_orders(filter).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        self.inner
            .update_status(id, expected, status, updated_at)
            .await
    }
}
