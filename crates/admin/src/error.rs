//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use brewhouse_core::LifecycleError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order lifecycle operation failed.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let server_error = matches!(
            self,
            Self::Internal(_) | Self::Lifecycle(LifecycleError::Store(_))
        );

        // Log server errors with Sentry
        if server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Lifecycle(err) => match err {
                LifecycleError::IllegalTransition { .. } | LifecycleError::AlreadyFinal { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                LifecycleError::ConcurrentUpdateConflict { .. } => StatusCode::CONFLICT,
                LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
                LifecycleError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = if server_error {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use brewhouse_core::{OrderId, OrderStatus, StoreError};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_lifecycle_status_codes() {
        let order_id = OrderId::new(1);
        assert_eq!(
            get_status(
                LifecycleError::IllegalTransition {
                    order_id,
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Pending,
                }
                .into()
            ),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(
                LifecycleError::AlreadyFinal {
                    order_id,
                    status: OrderStatus::Cancelled,
                }
                .into()
            ),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(LifecycleError::ConcurrentUpdateConflict { order_id }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(LifecycleError::NotFound(order_id).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(LifecycleError::Store(StoreError::Database("down".to_string())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
