//! Application state shared across handlers.

use std::sync::Arc;

use brewhouse_core::{OrderLifecycle, OrderStore};

/// Application state shared across all handlers.
///
/// Cheap to clone; the lifecycle manager only holds the store handle.
#[derive(Clone)]
pub struct AppState {
    lifecycle: OrderLifecycle,
}

impl AppState {
    /// Create a new application state over an order store.
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            lifecycle: OrderLifecycle::new(orders),
        }
    }

    /// Get the order lifecycle manager.
    #[must_use]
    pub const fn lifecycle(&self) -> &OrderLifecycle {
        &self.lifecycle
    }
}
