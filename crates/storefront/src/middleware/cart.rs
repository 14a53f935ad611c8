//! Cart extractor.
//!
//! Resolves the session's cart token to its [`CheckoutHandle`], minting a
//! token on first use. A freshly created cart is pre-filled from the
//! signed-in shopper's profile, if any.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::identity::current_customer;
use crate::models::{CartToken, session_keys};
use crate::services::CheckoutHandle;
use crate::state::AppState;

/// The current session's checkout.
pub struct CurrentCart {
    pub token: CartToken,
    pub checkout: CheckoutHandle,
}

impl FromRequestParts<AppState> for CurrentCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let token = match session.get::<CartToken>(session_keys::CART_TOKEN).await? {
            Some(token) => token,
            None => {
                let token = CartToken(Uuid::new_v4());
                session.insert(session_keys::CART_TOKEN, token).await?;
                token
            }
        };

        let fresh = state.carts().get(token.0).await.is_none();
        let checkout = state.carts().get_or_create(token.0).await;

        if fresh && let Some(profile) = current_customer(&session).await {
            tracing::debug!(user_id = %profile.user_id, "pre-filling checkout from profile");
            if let Ok(cart) = checkout.lock().await.cart_mut() {
                cart.prefill_customer(&profile);
            }
        }

        Ok(Self { token, checkout })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use brewhouse_core::{CustomerProfile, MemoryOrderStore};
    use secrecy::SecretString;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{CheckoutConfig, StorefrontConfig};
    use crate::middleware::identity::set_current_customer;

    fn state() -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            checkout: CheckoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };
        AppState::new(config, Arc::new(MemoryOrderStore::new()))
    }

    async fn extract(state: &AppState, session: &Session) -> CurrentCart {
        let (mut parts, ()) = Request::builder()
            .extension(session.clone())
            .body(())
            .unwrap()
            .into_parts();
        CurrentCart::from_request_parts(&mut parts, state)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_same_session_same_cart() {
        let state = state();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let first = extract(&state, &session).await;
        let second = extract(&state, &session).await;
        assert_eq!(first.token, second.token);
        assert!(Arc::ptr_eq(&first.checkout, &second.checkout));
    }

    #[tokio::test]
    async fn test_fresh_cart_is_prefilled_from_profile() {
        let state = state();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let profile = CustomerProfile {
            user_id: "u-17".to_string(),
            name: Some("Hoa".to_string()),
            phone: Some("0933000111".to_string()),
            email: None,
        };
        set_current_customer(&session, &profile).await.unwrap();

        let cart = extract(&state, &session).await;
        let checkout = cart.checkout.lock().await;
        assert_eq!(checkout.cart().customer().name, "Hoa");
        assert_eq!(checkout.cart().customer().phone, "0933000111");
    }
}
