//! Prelude module for convenient imports.
//!
//! A single `use formtree::prelude::*;` brings in the traits, the tree
//! types, the engine, and every built-in validator factory.

// ============================================================================
// FOUNDATION: trait, error types
// ============================================================================

pub use crate::foundation::{EngineError, ErrorMap, Validate, ValidatorSet};

// ============================================================================
// MODEL: the control tree
// ============================================================================

pub use crate::model::{
    ControlId, ControlKind, ControlRef, ControlStatus, FormTree, Value,
};

// ============================================================================
// ENGINE, REACTIVITY, MESSAGES
// ============================================================================

pub use crate::engine::{ControlEvent, EventClass, ValidationEngine};
pub use crate::messages::{EligibilityPolicy, MessageCatalog, MessageResolver};
pub use crate::reactive::Subscriptions;

// ============================================================================
// VALIDATORS: built-ins and factories
// ============================================================================

#[allow(clippy::wildcard_imports)]
pub use crate::validators::*;

// ============================================================================
// MACROS
// ============================================================================

pub use crate::validator_set;

// ============================================================================
// FORM: the assembled customer record
// ============================================================================

pub use crate::form::{CustomerControls, CustomerForm};
