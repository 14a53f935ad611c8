//! Checkout wizard.
//!
//! Three steps: contact info, payment, confirmation. Only the first step has
//! a gate (name, phone, and an address when delivering). Failing a gate is
//! not an error; it comes back as [`StepOutcome::Blocked`] so the caller can
//! highlight the missing fields.
//!
//! Submission is split in two so the order store can be called without
//! holding whatever lock protects the [`Checkout`]:
//!
//! ```text
//! begin_submit()  -> NewOrder snapshot, guard set
//! (store call, with a timeout)
//! finish_submit() -> cart cleared or preserved, guard released
//! ```
//!
//! While the guard is set the cart, form and step are frozen: edits and
//! wizard moves fail with [`SubmitError::AlreadySubmitting`].

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartStore;
use crate::customer::CustomerInfo;
use crate::order::{NewOrder, Order};
use crate::pricing::PricingRules;
use crate::types::{DeliveryType, OrderId};

/// Wizard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum CheckoutStep {
    ContactInfo = 1,
    Payment = 2,
    Confirm = 3,
}

impl CheckoutStep {
    /// Step number, 1 to 3.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Step for a number, clamped to `1..=3`.
    #[must_use]
    pub const fn from_number(n: u8) -> Self {
        match n {
            0 | 1 => Self::ContactInfo,
            2 => Self::Payment,
            _ => Self::Confirm,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ContactInfo => Some(Self::Payment),
            Self::Payment => Some(Self::Confirm),
            Self::Confirm => None,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self {
            Self::ContactInfo => None,
            Self::Payment => Some(Self::ContactInfo),
            Self::Confirm => Some(Self::Payment),
        }
    }
}

impl From<CheckoutStep> for u8 {
    fn from(step: CheckoutStep) -> Self {
        step.number()
    }
}

impl From<u8> for CheckoutStep {
    fn from(n: u8) -> Self {
        Self::from_number(n)
    }
}

/// A required form field that is still blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Name,
    Phone,
    Address,
}

impl MissingField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

/// A step gate that did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationBlocked {
    /// The step the shopper is stuck on.
    pub step: CheckoutStep,
    pub missing: Vec<MissingField>,
}

impl fmt::Display for ValidationBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.missing.iter().map(|m| m.as_str()).collect();
        write!(
            f,
            "step {} is missing: {}",
            self.step.number(),
            fields.join(", ")
        )
    }
}

/// Result of a wizard move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The wizard is now on this step.
    Moved(CheckoutStep),
    /// Already at the edge; nothing changed.
    Unchanged(CheckoutStep),
    /// A gate did not pass.
    Blocked(ValidationBlocked),
}

impl StepOutcome {
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check the gate for leaving `step`.
///
/// # Errors
///
/// Returns [`ValidationBlocked`] listing the blank required fields.
pub fn validate_step(step: CheckoutStep, info: &CustomerInfo) -> Result<(), ValidationBlocked> {
    if step != CheckoutStep::ContactInfo {
        return Ok(());
    }

    let mut missing = Vec::new();
    if is_blank(&info.name) {
        missing.push(MissingField::Name);
    }
    if is_blank(&info.phone) {
        missing.push(MissingField::Phone);
    }
    if info.delivery_type == DeliveryType::Delivery && is_blank(&info.address) {
        missing.push(MissingField::Address);
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationBlocked { step, missing })
    }
}

/// Whether the shopper could move forward from `step`.
#[must_use]
pub fn can_advance(step: CheckoutStep, info: &CustomerInfo) -> bool {
    step.next().is_some() && validate_step(step, info).is_ok()
}

/// Why a submission did not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("orders can only be submitted from the confirmation step (currently step {})", .0.number())]
    NotAtConfirmation(CheckoutStep),

    #[error("checkout form is incomplete: {0}")]
    Blocked(ValidationBlocked),

    #[error("cart is empty")]
    EmptyCart,

    #[error("an order submission is already in progress")]
    AlreadySubmitting,
}

/// Why the order store did not create the order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionFailure {
    #[error("order was rejected: {0}")]
    Rejected(String),

    #[error("order service did not respond in time, please try again")]
    TimedOut,

    #[error("order service is unavailable, please try again")]
    Unavailable,
}

/// Message for the shopper after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutNotice {
    Success {
        order_id: OrderId,
        /// The notice is hidden after this instant.
        expires_at: DateTime<Utc>,
    },
    Failure {
        reason: String,
    },
}

/// Default display window for the success notice.
pub const DEFAULT_SUCCESS_WINDOW: TimeDelta = TimeDelta::seconds(3);

/// A shopper's checkout session: the cart plus submission state.
#[derive(Debug, Clone)]
pub struct Checkout {
    cart: CartStore,
    in_flight: Option<NewOrder>,
    last_failed: Option<NewOrder>,
    success_window: TimeDelta,
    notice: Option<CheckoutNotice>,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new(PricingRules::default(), DEFAULT_SUCCESS_WINDOW)
    }
}

impl Checkout {
    #[must_use]
    pub fn new(rules: PricingRules, success_window: TimeDelta) -> Self {
        Self {
            cart: CartStore::new(rules),
            in_flight: None,
            last_failed: None,
            success_window,
            notice: None,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Mutable access for cart and form edits.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::AlreadySubmitting`] while a submission is in
    /// flight.
    pub fn cart_mut(&mut self) -> Result<&mut CartStore, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::AlreadySubmitting);
        }
        Ok(&mut self.cart)
    }

    /// Whether an order submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        can_advance(self.cart.step(), self.cart.customer())
    }

    /// Move forward one step.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::AlreadySubmitting`] while a submission is in
    /// flight.
    pub fn advance(&mut self) -> Result<StepOutcome, SubmitError> {
        Ok(self.cart_mut()?.next_step())
    }

    /// Move back one step.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::AlreadySubmitting`] while a submission is in
    /// flight.
    pub fn retreat(&mut self) -> Result<StepOutcome, SubmitError> {
        Ok(self.cart_mut()?.prev_step())
    }

    /// Jump to a step, passing the same gates as repeated advances.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::AlreadySubmitting`] while a submission is in
    /// flight.
    pub fn go_to(&mut self, step: u8) -> Result<StepOutcome, SubmitError> {
        Ok(self.cart_mut()?.set_step(step))
    }

    /// The notice to show at `now`; an expired success notice is hidden.
    #[must_use]
    pub fn notice(&self, now: DateTime<Utc>) -> Option<&CheckoutNotice> {
        match &self.notice {
            Some(CheckoutNotice::Success { expires_at, .. }) if *expires_at <= now => None,
            notice => notice.as_ref(),
        }
    }

    /// Start a submission and return the snapshot to hand to the order store.
    ///
    /// While the returned submission is outstanding every further call fails
    /// with [`SubmitError::AlreadySubmitting`]. The caller must report the
    /// outcome through [`Checkout::finish_submit`].
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] if the shopper is not on the confirmation
    /// step, the contact gate no longer passes, the cart is empty, or a
    /// submission is already in flight.
    pub fn begin_submit(&mut self) -> Result<NewOrder, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::AlreadySubmitting);
        }
        let step = self.cart.step();
        if step != CheckoutStep::Confirm {
            return Err(SubmitError::NotAtConfirmation(step));
        }
        validate_step(CheckoutStep::ContactInfo, self.cart.customer()).map_err(SubmitError::Blocked)?;
        if self.cart.is_empty() {
            return Err(SubmitError::EmptyCart);
        }

        let (items, customer, summary) = self.cart.snapshot();
        let mut submission = NewOrder {
            submission_key: Uuid::new_v4(),
            items,
            customer,
            summary,
        };
        // Retrying an unchanged cart after a failure reuses the key, so an
        // order the store created before timing out is not duplicated.
        if let Some(failed) = self.last_failed.take()
            && failed.same_contents(&submission)
        {
            submission.submission_key = failed.submission_key;
        }

        self.notice = None;
        self.in_flight = Some(submission.clone());
        Ok(submission)
    }

    /// Record the outcome of the submission started by [`Checkout::begin_submit`].
    ///
    /// On success the cart is cleared and the wizard returns to step 1. On
    /// failure the cart and step are left alone so the shopper can retry.
    pub fn finish_submit(&mut self, outcome: Result<&Order, &SubmissionFailure>, now: DateTime<Utc>) {
        let Some(submission) = self.in_flight.take() else {
            tracing::warn!("finish_submit called with no submission in flight");
            return;
        };

        match outcome {
            Ok(order) => {
                self.cart.clear();
                self.last_failed = None;
                self.notice = Some(CheckoutNotice::Success {
                    order_id: order.id,
                    expires_at: now + self.success_window,
                });
            }
            Err(failure) => {
                self.last_failed = Some(submission);
                self.notice = Some(CheckoutNotice::Failure {
                    reason: failure.to_string(),
                });
            }
        }
    }
}
