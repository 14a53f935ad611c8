//! Business logic services for storefront.
//!
//! # Services
//!
//! - `carts` - Per-session cart registry (moka, idle expiry)
//! - `checkout` - Order submission with timeout and in-flight guard

pub mod carts;
pub mod checkout;

pub use carts::{CartRegistry, CheckoutHandle};
pub use checkout::CheckoutService;
