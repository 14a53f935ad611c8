//! Application state shared across handlers.

use std::sync::Arc;

use brewhouse_core::{OrderStore, PricingRules};

use crate::config::StorefrontConfig;
use crate::services::{CartRegistry, CheckoutService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the order store, cart registry and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    orders: Arc<dyn OrderStore>,
    carts: CartRegistry,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `orders` - Order store (`PostgreSQL` in production, in-memory in tests)
    #[must_use]
    pub fn new(config: StorefrontConfig, orders: Arc<dyn OrderStore>) -> Self {
        let carts = CartRegistry::new(&config.checkout, PricingRules::default());
        let checkout = CheckoutService::new(Arc::clone(&orders), config.checkout.submit_timeout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                orders,
                carts,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn orders(&self) -> &Arc<dyn OrderStore> {
        &self.inner.orders
    }

    /// Get a reference to the per-session cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Get a reference to the order submission service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
