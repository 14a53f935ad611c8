//! Core types for Brewhouse.
//!
//! Type-safe wrappers for identifiers, money amounts, emails and the small
//! enums shared by the cart, checkout and order pipeline.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use status::*;
