//! # formtree
//!
//! A client-side form-validation engine: a nested control tree (fields,
//! groups, dynamically-sized lists), composable synchronous validators,
//! cross-field group validators, and debounced feedback-message derivation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formtree::prelude::*;
//!
//! let mut engine = ValidationEngine::new();
//! let rating = engine.new_field(Value::Null);
//! let root = engine.new_group([("rating", rating)])?;
//!
//! engine.set_validators(rating, validator_set![in_range(1.0, 5.0)])?;
//! engine.set_value(rating, Value::Number(6.0))?;
//!
//! assert!(engine.errors(rating)?.contains("range"));
//! assert_eq!(engine.status(root)?, ControlStatus::Invalid);
//! ```
//!
//! ## Architecture
//!
//! - [`model`] — the control tree: an arena of field/group/list nodes with
//!   value, status, error-map, and interaction state.
//! - [`validators`] — built-in validators and parameterized factories,
//!   created with the [`field_validator!`] macro.
//! - [`engine`] — bottom-up evaluation, error-map propagation, validator
//!   attachment, and the explicit event outbox.
//! - [`reactive`] — the debounced subscriber registry the host drives
//!   cooperatively.
//! - [`messages`] — catalog-based feedback-text derivation with the
//!   field/group precedence rule.
//! - [`form`] — the assembled customer-record form.
//!
//! Everything is single-threaded and synchronous except the debounce
//! timers, which are plain deadlines the host polls.

pub mod engine;
pub mod form;
pub mod foundation;
mod macros;
pub mod messages;
pub mod model;
pub mod prelude;
pub mod reactive;
pub mod validators;
