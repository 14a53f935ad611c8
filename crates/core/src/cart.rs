//! Per-session cart store.
//!
//! [`CartStore`] is the only mutable owner of a shopper's line items, checkout
//! form and checkout step. It is created per session and handed to whatever
//! needs it; there is no global cart. Every mutation recomputes the attached
//! [`OrderSummary`], so [`CartStore::summary`] is always current.

use serde::{Deserialize, Serialize};

use crate::checkout::{CheckoutStep, StepOutcome, validate_step};
use crate::customer::{AddressCandidate, CustomerInfo, CustomerInfoPatch, CustomerProfile};
use crate::pricing::{OrderSummary, PricingRules};
use crate::types::{ItemId, Money};

/// Largest quantity a single cart line can hold.
pub const MAX_QUANTITY: u32 = 99;

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ItemId,
    pub name: String,
    pub unit_price: Money,
    /// Always in `1..=MAX_QUANTITY` while the line is in a cart.
    pub quantity: u32,
    pub image_ref: Option<String>,
}

impl CartLineItem {
    /// Build a line from a menu item at the given quantity.
    #[must_use]
    pub fn from_new(item: NewLineItem, quantity: u32) -> Self {
        Self {
            id: item.id,
            name: item.name,
            unit_price: item.unit_price,
            quantity: quantity.clamp(1, MAX_QUANTITY),
            image_ref: item.image_ref,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A menu item as handed to [`CartStore::add_item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ItemId,
    pub name: String,
    pub unit_price: Money,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl NewLineItem {
    /// Create a menu item without an image.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_ref: None,
        }
    }

    /// Attach an image reference.
    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// A shopper's cart, checkout form and wizard position.
#[derive(Debug, Clone)]
pub struct CartStore {
    items: Vec<CartLineItem>,
    customer: CustomerInfo,
    step: CheckoutStep,
    rules: PricingRules,
    summary: OrderSummary,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(PricingRules::default())
    }
}

impl CartStore {
    /// Create an empty cart priced with `rules`.
    #[must_use]
    pub fn new(rules: PricingRules) -> Self {
        Self {
            items: Vec::new(),
            customer: CustomerInfo::default(),
            step: CheckoutStep::ContactInfo,
            rules,
            summary: OrderSummary::default(),
        }
    }

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up a line by item ID.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The checkout form as entered so far.
    #[must_use]
    pub const fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Current wizard step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Price breakdown for the current contents and delivery choice.
    #[must_use]
    pub const fn summary(&self) -> &OrderSummary {
        &self.summary
    }

    /// Add one unit of a menu item.
    ///
    /// An existing line with the same ID gains one unit (up to
    /// [`MAX_QUANTITY`]); otherwise a new line with quantity 1 is appended.
    /// Returns the line's quantity afterwards.
    pub fn add_item(&mut self, item: NewLineItem) -> u32 {
        let quantity = if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            if line.quantity >= MAX_QUANTITY {
                tracing::debug!(item_id = %line.id, "line already at maximum quantity");
            } else {
                line.quantity += 1;
            }
            line.quantity
        } else {
            self.items.push(CartLineItem::from_new(item, 1));
            1
        };
        self.refresh();
        quantity
    }

    /// Remove a line. Does nothing if the item is not in the cart.
    pub fn remove_item(&mut self, id: &ItemId) {
        let before = self.items.len();
        self.items.retain(|line| &line.id != id);
        if self.items.len() != before {
            self.refresh();
        }
    }

    /// Set a line's quantity.
    ///
    /// Zero or negative removes the line; values above [`MAX_QUANTITY`] are
    /// clamped. Does nothing if the item is not in the cart.
    pub fn update_quantity(&mut self, id: &ItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let quantity = u32::try_from(quantity).map_or(MAX_QUANTITY, |q| q.min(MAX_QUANTITY));
        if let Some(line) = self.items.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
            self.refresh();
        }
    }

    /// Empty the cart and return to the first step.
    ///
    /// The checkout form is kept so repeat orders in the same session do not
    /// have to retype contact details.
    pub fn clear(&mut self) {
        self.items.clear();
        self.step = CheckoutStep::ContactInfo;
        self.refresh();
    }

    /// Shallow-merge changes into the checkout form.
    pub fn update_customer_info(&mut self, patch: CustomerInfoPatch) {
        self.customer.apply(patch);
        self.refresh();
    }

    /// Fill blank contact fields from a signed-in shopper's profile.
    pub fn prefill_customer(&mut self, profile: &CustomerProfile) {
        self.customer.prefill_from(profile);
    }

    /// Use the address the shopper picked from the suggestion list.
    pub fn choose_address(&mut self, candidate: &AddressCandidate) {
        self.customer.address.clone_from(&candidate.resolved_address);
    }

    /// Move forward one step if the current step's gate passes.
    ///
    /// At the last step this is a no-op.
    pub fn next_step(&mut self) -> StepOutcome {
        let Some(next) = self.step.next() else {
            return StepOutcome::Unchanged(self.step);
        };
        if let Err(blocked) = validate_step(self.step, &self.customer) {
            return StepOutcome::Blocked(blocked);
        }
        self.step = next;
        StepOutcome::Moved(next)
    }

    /// Move back one step. At the first step this is a no-op.
    pub fn prev_step(&mut self) -> StepOutcome {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                StepOutcome::Moved(prev)
            }
            None => StepOutcome::Unchanged(self.step),
        }
    }

    /// Go to step `n`, clamped to `1..=3`.
    ///
    /// The move walks through adjacent steps, so forward moves stop at the
    /// first gate that does not pass.
    pub fn set_step(&mut self, n: u8) -> StepOutcome {
        let target = CheckoutStep::from_number(n);
        let start = self.step;

        while self.step != target {
            let outcome = if self.step < target {
                self.next_step()
            } else {
                self.prev_step()
            };
            if let StepOutcome::Blocked(_) = outcome {
                return outcome;
            }
        }

        if self.step == start {
            StepOutcome::Unchanged(start)
        } else {
            StepOutcome::Moved(self.step)
        }
    }

    /// Take an owned copy of the lines and form for an order snapshot.
    #[must_use]
    pub fn snapshot(&self) -> (Vec<CartLineItem>, CustomerInfo, OrderSummary) {
        (self.items.clone(), self.customer.clone(), self.summary)
    }

    fn refresh(&mut self) {
        self.summary = self.rules.compute(&self.items, self.customer.delivery_type);
    }
}
