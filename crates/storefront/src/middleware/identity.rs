//! Signed-in shopper session helpers.
//!
//! The identity integration stores a [`CurrentCustomer`] profile in the
//! session; checkout only ever reads it to pre-fill contact details.

use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Read the signed-in shopper from a session, treating errors as signed out.
pub async fn current_customer(session: &Session) -> Option<CurrentCustomer> {
    session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()
}

/// Helper to set the signed-in shopper in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}
