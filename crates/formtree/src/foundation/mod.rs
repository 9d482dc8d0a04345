//! Core validation types and traits.
//!
//! The foundation is deliberately small:
//!
//! - **Traits**: [`Validate`], the pure validator contract, and
//!   [`ValidatorSet`], the per-control attachment unit.
//! - **Errors**: [`ErrorMap`] for validation-domain states and
//!   [`EngineError`] for system faults.
//!
//! Everything else in the crate — built-in validators, the control tree,
//! the engine, message derivation — is expressed in terms of these types.

pub mod error;
pub mod traits;

pub use error::{EngineError, ErrorMap};
pub use traits::{Validate, ValidatorSet};
