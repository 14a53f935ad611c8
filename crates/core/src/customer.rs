//! Checkout form data and the inputs it takes from outside collaborators.
//!
//! [`CustomerInfo`] is filled in step by step and only validated per step
//! (see [`crate::checkout`]), so any field may be empty while the shopper is
//! still working through earlier steps.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{DeliveryType, Email, PaymentMethod};

/// Contact, delivery and payment details collected during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<Email>,
    /// Required only when `delivery_type` is [`DeliveryType::Delivery`].
    pub address: String,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// A partial update to [`CustomerInfo`]; `None` leaves a field untouched.
///
/// `email` and `notes` are doubly optional so a patch can clear them:
/// `Some(None)` removes the value. In JSON an absent key leaves the field
/// alone and `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomerInfoPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "present")]
    pub email: Option<Option<Email>>,
    pub address: Option<String>,
    pub delivery_type: Option<DeliveryType>,
    pub payment_method: Option<PaymentMethod>,
    #[serde(deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

/// Marks a key that was present in the input, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CustomerInfo {
    /// Shallow-merge a patch into this form.
    pub fn apply(&mut self, patch: CustomerInfoPatch) {
        let CustomerInfoPatch {
            name,
            phone,
            email,
            address,
            delivery_type,
            payment_method,
            notes,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(delivery_type) = delivery_type {
            self.delivery_type = delivery_type;
        }
        if let Some(payment_method) = payment_method {
            self.payment_method = payment_method;
        }
        if let Some(notes) = notes {
            self.notes = notes.filter(|n| !n.trim().is_empty());
        }
    }

    /// Fill blank contact fields from a signed-in shopper's profile.
    ///
    /// Anything the shopper already typed wins over the profile.
    pub fn prefill_from(&mut self, profile: &CustomerProfile) {
        if self.name.trim().is_empty()
            && let Some(name) = &profile.name
        {
            self.name.clone_from(name);
        }
        if self.phone.trim().is_empty()
            && let Some(phone) = &profile.phone
        {
            self.phone.clone_from(phone);
        }
        if self.email.is_none() {
            self.email.clone_from(&profile.email);
        }
    }
}

/// Read-only profile supplied by the identity provider for a signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Identifier assigned by the identity provider.
    pub user_id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
}

/// One ranked result from the address-suggestion provider.
///
/// Checkout only ever consumes `resolved_address`; geocoding and ranking are
/// the provider's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCandidate {
    /// Short text shown in the suggestion list.
    pub label: String,
    /// Full address string stored on the order.
    pub resolved_address: String,
}
