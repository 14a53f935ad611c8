//! Brewhouse Core - ordering engine shared by every Brewhouse component.
//!
//! This crate holds the parts of the coffee-shop ordering flow that carry
//! real rules:
//! - `storefront` - customer-facing cart and checkout API
//! - `admin` - order pipeline for staff
//! - `cli` - migrations and order management from the terminal
//!
//! # Architecture
//!
//! Everything except `store::postgres` is free of I/O. The cart, checkout
//! wizard and pricing are plain synchronous values; the order lifecycle talks
//! to persistence only through the [`store::OrderStore`] trait.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails and statuses
//! - [`pricing`] - Subtotal, tax, delivery fee, discount and total
//! - [`cart`] - Per-session cart store
//! - [`customer`] - Checkout form data and collaborator inputs
//! - [`checkout`] - Three-step checkout wizard and submission guard
//! - [`order`] - Persisted order snapshots
//! - [`lifecycle`] - Order status transition table and manager
//! - [`store`] - Order persistence boundary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod customer;
pub mod lifecycle;
pub mod order;
pub mod pricing;
pub mod store;
pub mod types;

pub use cart::{CartLineItem, CartStore, MAX_QUANTITY, NewLineItem};
pub use checkout::{
    Checkout, CheckoutNotice, CheckoutStep, DEFAULT_SUCCESS_WINDOW, MissingField, StepOutcome,
    SubmissionFailure, SubmitError, ValidationBlocked,
};
pub use customer::{AddressCandidate, CustomerInfo, CustomerInfoPatch, CustomerProfile};
pub use lifecycle::{LifecycleError, OrderLifecycle};
pub use order::{NewOrder, Order};
pub use pricing::{OrderSummary, PricingError, PricingRules, compute_summary};
pub use store::{MemoryOrderStore, OrderFilter, OrderStore, StoreError};
pub use types::*;
