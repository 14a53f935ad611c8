//! Per-session cart registry.
//!
//! Each shopper session owns one [`Checkout`] behind an async mutex. Carts are
//! memory-resident: they live in a `moka` cache keyed by the cart token stored
//! in the session and are dropped after a period of inactivity.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use brewhouse_core::{Checkout, DEFAULT_SUCCESS_WINDOW, PricingRules};

use crate::config::CheckoutConfig;

/// Upper bound on concurrently held carts.
const MAX_CARTS: u64 = 100_000;

/// Shared handle to one shopper's checkout.
pub type CheckoutHandle = Arc<Mutex<Checkout>>;

/// Registry of live carts, keyed by cart token.
#[derive(Clone)]
pub struct CartRegistry {
    carts: Cache<Uuid, CheckoutHandle>,
    rules: PricingRules,
    success_window: TimeDelta,
}

impl CartRegistry {
    /// Create a registry that drops carts idle for `config.cart_idle_timeout`.
    #[must_use]
    pub fn new(config: &CheckoutConfig, rules: PricingRules) -> Self {
        let carts = Cache::builder()
            .max_capacity(MAX_CARTS)
            .time_to_idle(config.cart_idle_timeout)
            .build();

        Self {
            carts,
            rules,
            success_window: to_time_delta(config.success_notice),
        }
    }

    /// The cart for `token`, created empty on first use.
    pub async fn get_or_create(&self, token: Uuid) -> CheckoutHandle {
        let rules = self.rules;
        let window = self.success_window;
        self.carts
            .get_with(token, async move {
                tracing::debug!(cart_token = %token, "creating cart");
                Arc::new(Mutex::new(Checkout::new(rules, window)))
            })
            .await
    }

    /// The cart for `token` if one is live.
    pub async fn get(&self, token: Uuid) -> Option<CheckoutHandle> {
        self.carts.get(&token).await
    }
}

fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(DEFAULT_SUCCESS_WINDOW)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use brewhouse_core::{Money, NewLineItem};

    #[tokio::test]
    async fn test_same_token_same_cart() {
        let registry = CartRegistry::new(&CheckoutConfig::default(), PricingRules::default());
        let token = Uuid::new_v4();

        registry
            .get_or_create(token)
            .await
            .lock()
            .await
            .cart_mut()
            .unwrap()
            .add_item(NewLineItem::new("latte", "Latte", Money::new(45_000)));

        let again = registry.get_or_create(token).await;
        assert_eq!(again.lock().await.cart().item_count(), 1);

        let other = registry.get_or_create(Uuid::new_v4()).await;
        assert!(other.lock().await.cart().is_empty());
    }
}
