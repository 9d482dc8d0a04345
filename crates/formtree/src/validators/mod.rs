//! Built-in validators.
//!
//! Every validator here is a pure function from a control's current state to
//! an error map or a no-error signal:
//!
//! - **Presence**: [`Required`]
//! - **Text**: [`MinLength`], [`Email`]
//! - **Numeric**: [`InRange`] — the parameterized range factory
//! - **Cross-field**: [`EmailMatch`] — a group-level sibling comparison
//!
//! Factory functions (`required()`, `min_length(n)`, `in_range(min, max)`,
//! `email()`, `email_match(a, b)`) are the idiomatic way to build them:
//!
//! ```rust,ignore
//! use formtree::validator_set;
//! use formtree::validators::{min_length, required};
//!
//! engine.set_validators(first_name, validator_set![required(), min_length(3)])?;
//! ```

pub mod content;
pub mod cross;
pub mod length;
pub mod range;
pub mod required;

pub use content::{Email, email};
pub use cross::{EmailMatch, email_match};
pub use length::{MinLength, min_length};
pub use range::{InRange, in_range};
pub use required::{Required, required};
