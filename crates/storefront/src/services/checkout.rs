//! Order submission.
//!
//! Drives [`Checkout::begin_submit`] / [`Checkout::finish_submit`] around the
//! order store call. The store call runs in its own task with a timeout, so
//! the shopper's cart lock is never held while waiting on the store and the
//! in-flight guard is always released, even if the HTTP client goes away.
//!
//! [`Checkout::begin_submit`]: brewhouse_core::Checkout::begin_submit
//! [`Checkout::finish_submit`]: brewhouse_core::Checkout::finish_submit

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::instrument;

use brewhouse_core::{Order, OrderStore, StoreError, SubmissionFailure};

use super::carts::CheckoutHandle;
use crate::error::AppError;

/// Submits checkouts to the order store.
#[derive(Clone)]
pub struct CheckoutService {
    orders: Arc<dyn OrderStore>,
    timeout: Duration,
}

impl CheckoutService {
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>, timeout: Duration) -> Self {
        Self { orders, timeout }
    }

    /// Submit the shopper's cart as an order.
    ///
    /// # Errors
    ///
    /// - `AppError::Checkout` if the checkout is not ready or already submitting
    /// - `AppError::Submission` if the store rejected, failed or timed out
    #[instrument(skip(self, checkout))]
    pub async fn submit(&self, checkout: CheckoutHandle) -> Result<Order, AppError> {
        let submission = checkout.lock().await.begin_submit()?;
        let key = submission.submission_key;

        let orders = Arc::clone(&self.orders);
        let timeout = self.timeout;
        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, orders.create_order(submission)).await
            {
                Ok(Ok(order)) => Ok(order),
                Ok(Err(err)) => Err(failure_from_store(&err)),
                Err(_) => {
                    tracing::warn!(submission_key = %key, "order submission timed out");
                    Err(SubmissionFailure::TimedOut)
                }
            };
            checkout
                .lock()
                .await
                .finish_submit(result.as_ref(), Utc::now());
            result
        });

        let order = task
            .await
            .map_err(|e| AppError::Internal(format!("submission task failed: {e}")))??;

        tracing::info!(order_id = %order.id, total = %order.summary.total, "order placed");
        Ok(order)
    }
}

fn failure_from_store(err: &StoreError) -> SubmissionFailure {
    match err {
        StoreError::Conflict => SubmissionFailure::Rejected(err.to_string()),
        StoreError::NotFound | StoreError::Database(_) | StoreError::DataCorruption(_) => {
            tracing::error!(error = %err, "order store failed during submission");
            SubmissionFailure::Unavailable
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::Mutex;

    use super::*;
    use brewhouse_core::{
        Checkout, CheckoutNotice, CustomerInfoPatch, MemoryOrderStore, Money, NewLineItem,
        SubmitError,
    };

    fn ready_checkout() -> CheckoutHandle {
        let mut checkout = Checkout::default();
        let cart = checkout.cart_mut().unwrap();
        cart.add_item(NewLineItem::new("latte", "Latte", Money::new(45_000)));
        cart.update_customer_info(CustomerInfoPatch {
            name: Some("Minh".to_string()),
            phone: Some("0987654321".to_string()),
            ..CustomerInfoPatch::default()
        });
        checkout.go_to(3).unwrap();
        Arc::new(Mutex::new(checkout))
    }

    #[tokio::test]
    async fn test_submit_places_order_and_clears_cart() {
        let store = Arc::new(MemoryOrderStore::new());
        let service = CheckoutService::new(store.clone(), Duration::from_secs(5));
        let checkout = ready_checkout();

        let order = service.submit(checkout.clone()).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(order.summary.total, Money::new(49_500));
        let checkout = checkout.lock().await;
        assert!(checkout.cart().is_empty());
        assert!(!checkout.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_from_wrong_step_is_refused() {
        let store = Arc::new(MemoryOrderStore::new());
        let service = CheckoutService::new(store.clone(), Duration::from_secs(5));
        let checkout = ready_checkout();
        checkout.lock().await.retreat().unwrap();

        let err = service.submit(checkout).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Checkout(SubmitError::NotAtConfirmation(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_preserves_cart() {
        let err = failure_from_store(&StoreError::Database("connection reset".to_string()));
        assert_eq!(err, SubmissionFailure::Unavailable);

        let checkout = ready_checkout();
        {
            let mut guard = checkout.lock().await;
            guard.begin_submit().unwrap();
            guard.finish_submit(Err(&err), Utc::now());
        }
        let guard = checkout.lock().await;
        assert_eq!(guard.cart().item_count(), 1);
        assert!(matches!(
            guard.notice(Utc::now()),
            Some(CheckoutNotice::Failure { .. })
        ));
    }
}
