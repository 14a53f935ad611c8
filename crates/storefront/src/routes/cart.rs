//! Cart route handlers.
//!
//! The cart lives in the per-session cart registry; every handler returns
//! the full [`CartView`] so clients never have to recompute totals. Edits
//! made while an order submission is in flight are refused with 409.

use axum::{Json, extract::Path};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use brewhouse_core::{
    CartLineItem, Checkout, CheckoutNotice, CheckoutStep, CustomerInfo, ItemId, Money,
    NewLineItem, OrderSummary,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::CurrentCart;

/// Cart, form and wizard state as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub item_count: u32,
    pub summary: OrderSummary,
    pub step: CheckoutStep,
    /// Whether the current step's gate passes.
    pub can_advance: bool,
    pub customer: CustomerInfo,
    pub is_submitting: bool,
    pub notice: Option<CheckoutNotice>,
}

impl CartView {
    /// Snapshot a checkout for display.
    #[must_use]
    pub fn from_checkout(checkout: &Checkout) -> Self {
        let cart = checkout.cart();
        Self {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            summary: *cart.summary(),
            step: cart.step(),
            can_advance: checkout.can_advance(),
            customer: cart.customer().clone(),
            is_submitting: checkout.is_submitting(),
            notice: checkout.notice(Utc::now()).cloned(),
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    pub name: String,
    pub unit_price: u64,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Show the cart.
#[instrument(skip(cart))]
pub async fn show(cart: CurrentCart) -> Json<CartView> {
    let checkout = cart.checkout.lock().await;
    Json(CartView::from_checkout(&checkout))
}

/// Add one unit of a menu item.
#[instrument(skip(cart, request))]
pub async fn add_item(
    cart: CurrentCart,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let item = ItemId::new(request.id.trim());
    if item.is_blank() {
        return Err(AppError::BadRequest("item id is required".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("item name is required".to_string()));
    }

    let mut new_item = NewLineItem::new(item, request.name.trim(), Money::new(request.unit_price));
    if let Some(image_ref) = request.image_ref.filter(|r| !r.trim().is_empty()) {
        new_item = new_item.with_image(image_ref);
    }

    let mut checkout = cart.checkout.lock().await;
    let quantity = checkout.cart_mut()?.add_item(new_item);
    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("item_id", request.id.as_str()), ("quantity", &quantity.to_string())]),
    );
    Ok(Json(CartView::from_checkout(&checkout)))
}

/// Set the quantity of a line; zero or less removes it.
#[instrument(skip(cart, request))]
pub async fn update_item(
    cart: CurrentCart,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut checkout = cart.checkout.lock().await;
    checkout
        .cart_mut()?
        .update_quantity(&ItemId::new(id), request.quantity);
    Ok(Json(CartView::from_checkout(&checkout)))
}

/// Remove a line.
#[instrument(skip(cart))]
pub async fn remove_item(cart: CurrentCart, Path(id): Path<String>) -> Result<Json<CartView>> {
    let mut checkout = cart.checkout.lock().await;
    checkout.cart_mut()?.remove_item(&ItemId::new(id));
    Ok(Json(CartView::from_checkout(&checkout)))
}

/// Empty the cart and return to step 1.
#[instrument(skip(cart))]
pub async fn clear(cart: CurrentCart) -> Result<Json<CartView>> {
    let mut checkout = cart.checkout.lock().await;
    checkout.cart_mut()?.clear();
    Ok(Json(CartView::from_checkout(&checkout)))
}
