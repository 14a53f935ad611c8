//! Session-related types.
//!
//! Types stored in the shopper's session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use brewhouse_core::{CustomerProfile, OrderId};

/// Token naming the shopper's cart in the cart registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(pub Uuid);

/// Signed-in shopper, as placed in the session by the identity integration.
pub type CurrentCustomer = CustomerProfile;

/// Orders placed from this session, newest last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacedOrders(pub Vec<OrderId>);

impl PlacedOrders {
    /// Record an order, ignoring repeats.
    pub fn record(&mut self, id: OrderId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.0.contains(&id)
    }
}

/// Session keys.
pub mod keys {
    /// Key for the shopper's cart token.
    pub const CART_TOKEN: &str = "cart_token";

    /// Key for the signed-in shopper's profile.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the IDs of orders placed in this session.
    pub const PLACED_ORDERS: &str = "placed_orders";
}
