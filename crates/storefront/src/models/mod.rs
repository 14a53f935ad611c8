//! Domain models for storefront.

pub mod session;

pub use session::{CartToken, CurrentCustomer, PlacedOrders, keys as session_keys};
