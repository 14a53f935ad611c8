//! Order pricing.
//!
//! A pure function of the cart lines and the delivery choice. Safe to call on
//! every cart mutation.
//!
//! # Rules
//!
//! | Field          | Rule                                                        |
//! |----------------|-------------------------------------------------------------|
//! | `subtotal`     | sum of `unit_price * quantity`                              |
//! | `tax`          | 10% of subtotal, rounded half-up                            |
//! | `delivery_fee` | 15 000 for delivery, 0 for pickup                           |
//! | `discount`     | 5% of subtotal, rounded half-up, only when subtotal > 200 000 |
//! | `total`        | subtotal + tax + delivery fee - discount, never below zero  |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::types::{DeliveryType, Money};

/// Errors building custom [`PricingRules`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// A percentage rate falls outside `[0, 1]`.
    #[error("{name} must be between 0 and 1 (got {rate})")]
    RateOutOfRange {
        /// Which rate was rejected.
        name: &'static str,
        /// The rejected value.
        rate: Decimal,
    },
}

/// Price breakdown for a cart or order.
///
/// Derived from the cart lines; stored on an order only as part of its snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub total: Money,
}

/// Rates and amounts that drive [`PricingRules::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    tax_rate: Decimal,
    delivery_fee: Money,
    discount_rate: Decimal,
    discount_threshold: Money,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
            delivery_fee: Money::new(15_000),
            discount_rate: Decimal::new(5, 2),
            discount_threshold: Money::new(200_000),
        }
    }
}

impl PricingRules {
    /// Build rules with custom values.
    ///
    /// The discount applies only when the subtotal is strictly greater than
    /// `discount_threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::RateOutOfRange`] if either rate is outside `[0, 1]`.
    pub fn new(
        tax_rate: Decimal,
        delivery_fee: Money,
        discount_rate: Decimal,
        discount_threshold: Money,
    ) -> Result<Self, PricingError> {
        check_rate("tax_rate", tax_rate)?;
        check_rate("discount_rate", discount_rate)?;
        Ok(Self {
            tax_rate,
            delivery_fee,
            discount_rate,
            discount_threshold,
        })
    }

    /// Flat fee charged for delivery orders.
    #[must_use]
    pub const fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    /// Subtotal the discount threshold is compared against.
    #[must_use]
    pub const fn discount_threshold(&self) -> Money {
        self.discount_threshold
    }

    /// Compute the summary for a set of cart lines.
    #[must_use]
    pub fn compute(&self, items: &[CartLineItem], delivery_type: DeliveryType) -> OrderSummary {
        let subtotal: Money = items.iter().map(CartLineItem::line_total).sum();
        if items.is_empty() {
            return OrderSummary::default();
        }

        let tax = subtotal.apply_rate(self.tax_rate);
        let delivery_fee = match delivery_type {
            DeliveryType::Delivery => self.delivery_fee,
            DeliveryType::Pickup => Money::ZERO,
        };
        let discount = if subtotal > self.discount_threshold {
            subtotal.apply_rate(self.discount_rate)
        } else {
            Money::ZERO
        };

        let gross = subtotal.saturating_add(tax).saturating_add(delivery_fee);
        OrderSummary {
            subtotal,
            tax,
            delivery_fee,
            discount,
            total: net_total(gross, discount),
        }
    }
}

/// Compute a summary with the default rules.
///
/// An empty cart yields an all-zero summary whatever the delivery choice.
#[must_use]
pub fn compute_summary(items: &[CartLineItem], delivery_type: DeliveryType) -> OrderSummary {
    PricingRules::default().compute(items, delivery_type)
}

fn check_rate(name: &'static str, rate: Decimal) -> Result<(), PricingError> {
    if rate.is_sign_negative() || rate > Decimal::ONE {
        return Err(PricingError::RateOutOfRange { name, rate });
    }
    Ok(())
}

/// Subtract the discount, clamping at zero.
///
/// With rates inside `[0, 1]` the discount can never exceed the gross amount,
/// so reaching the clamp means the rules are broken.
fn net_total(gross: Money, discount: Money) -> Money {
    if discount > gross {
        tracing::error!(
            gross = %gross,
            discount = %discount,
            "discount exceeds gross amount; clamping order total to zero"
        );
        return Money::ZERO;
    }
    gross.saturating_sub(discount)
}
