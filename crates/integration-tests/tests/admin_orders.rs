//! Integration tests for the admin order pipeline.
//!
//! Run with: cargo test -p brewhouse-integration-tests

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use brewhouse_core::{MemoryOrderStore, OrderStore};
use brewhouse_integration_tests::{TestClient, admin, storefront};
use brewhouse_storefront::config::CheckoutConfig;

/// Place an order through the storefront and return its ID.
async fn place_order(shop: &TestClient) -> i64 {
    let shop = shop.fresh_session();
    shop.post(
        "/cart/items",
        json!({"id": "flat-white", "name": "Flat white", "unit_price": 55_000}),
    )
    .await;
    shop.patch(
        "/checkout/customer",
        json!({"name": "Bao", "phone": "0912345678", "payment_method": "card"}),
    )
    .await;
    shop.put("/checkout/step", json!({"step": 3})).await;
    let resp = shop.post_empty("/checkout/submit").await;
    assert_eq!(resp.status, StatusCode::CREATED);
    resp.body["id"].as_i64().unwrap()
}

fn setup() -> (TestClient, TestClient, Arc<MemoryOrderStore>) {
    let orders = Arc::new(MemoryOrderStore::new());
    let shop = storefront(orders.clone(), CheckoutConfig::default());
    let staff = admin(orders.clone());
    (shop, staff, orders)
}

fn status_of(body: &Value) -> &str {
    body["status"].as_str().unwrap()
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_order_walks_the_pipeline() {
    let (shop, staff, _) = setup();
    let id = place_order(&shop).await;

    let detail = staff.get(&format!("/orders/{id}")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(status_of(&detail.body), "pending");
    assert_eq!(detail.body["next_statuses"], json!(["confirmed", "cancelled"]));
    assert_eq!(detail.body["customer"]["payment_method"], "card");

    for expected in ["confirmed", "preparing", "ready", "delivered"] {
        let resp = staff.post_empty(&format!("/orders/{id}/advance")).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(status_of(&resp.body), expected);
    }

    // Terminal: nothing further is allowed.
    let resp = staff.post_empty(&format!("/orders/{id}/advance")).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        resp.body["error"]
            .as_str()
            .unwrap()
            .contains("already delivered")
    );
    let resp = staff.post_empty(&format!("/orders/{id}/cancel")).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);

    let detail = staff.get(&format!("/orders/{id}")).await;
    assert_eq!(detail.body["next_statuses"], json!([]));
    assert_eq!(detail.body["next_status"], Value::Null);
}

#[tokio::test]
async fn test_shopper_sees_status_changes() {
    let (shop, staff, _) = setup();
    shop.post(
        "/cart/items",
        json!({"id": "mocha", "name": "Mocha", "unit_price": 60_000}),
    )
    .await;
    shop.patch(
        "/checkout/customer",
        json!({"name": "Bao", "phone": "0912345678"}),
    )
    .await;
    shop.put("/checkout/step", json!({"step": 3})).await;
    let id = shop.post_empty("/checkout/submit").await.body["id"]
        .as_i64()
        .unwrap();

    staff.post_empty(&format!("/orders/{id}/advance")).await;

    let resp = shop.get(&format!("/orders/{id}")).await;
    assert_eq!(status_of(&resp.body), "confirmed");
}

#[tokio::test]
async fn test_illegal_transitions_are_refused() {
    let (shop, staff, orders) = setup();
    let id = place_order(&shop).await;

    // Skipping ahead is not allowed.
    let resp = staff
        .post(
            &format!("/orders/{id}/transition"),
            json!({"status": "ready"}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body["error"].as_str().unwrap().contains("pending"));

    // Confirmed orders cannot be cancelled.
    staff.post_empty(&format!("/orders/{id}/advance")).await;
    let resp = staff.post_empty(&format!("/orders/{id}/cancel")).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was written by the refused requests.
    let stored = orders
        .get_order(brewhouse_core::OrderId::new(i32::try_from(id).unwrap()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, brewhouse_core::OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_pending_order_can_be_cancelled() {
    let (shop, staff, _) = setup();
    let id = place_order(&shop).await;

    let resp = staff
        .post(&format!("/orders/{id}/cancel"), json!({}))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(status_of(&resp.body), "cancelled");

    let resp = staff.get("/orders?status=cancelled").await;
    assert_eq!(resp.body.as_array().unwrap().len(), 1);
    let resp = staff.get("/orders?status=pending").await;
    assert_eq!(resp.body, json!([]));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_stale_view_is_rejected() {
    let (shop, staff, _) = setup();
    let id = place_order(&shop).await;

    let seen = staff.get(&format!("/orders/{id}")).await.body["updated_at"].clone();

    // Another staff member moves the order first.
    let resp = staff.post_empty(&format!("/orders/{id}/advance")).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = staff
        .post(
            &format!("/orders/{id}/advance"),
            json!({"expected_updated_at": seen}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let detail = staff.get(&format!("/orders/{id}")).await;
    assert_eq!(status_of(&detail.body), "confirmed");

    // With a fresh view the move goes through.
    let fresh = detail.body["updated_at"].clone();
    let resp = staff
        .post(
            &format!("/orders/{id}/transition"),
            json!({"status": "preparing", "expected_updated_at": fresh}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_is_newest_first() {
    let (shop, staff, _) = setup();
    let first = place_order(&shop).await;
    let second = place_order(&shop).await;

    let resp = staff.get("/orders").await;
    let ids: Vec<i64> = resp
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn test_unknown_order_and_bad_status() {
    let (_, staff, _) = setup();

    let resp = staff.get("/orders/999").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = staff.post_empty("/orders/999/advance").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = staff.get("/orders?status=lost").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
