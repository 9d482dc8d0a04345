//! The core validator trait.
//!
//! A validator is a pure function from a control's current state to an
//! [`ErrorMap`] or a no-error signal. Validators never mutate the tree and
//! never fail with a system fault — malformed input is a validation state,
//! not an exception.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::ErrorMap;
use crate::model::ControlRef;

// ============================================================================
// CORE VALIDATOR TRAIT
// ============================================================================

/// The trait every validator implements.
///
/// `validate` receives a read-only view of the control it is attached to.
/// Field validators typically look at [`ControlRef::value`]; cross-field
/// (group-level) validators navigate to siblings via [`ControlRef::child`]
/// and may consult interaction state such as [`ControlRef::pristine`].
///
/// Returning `None` signals "no error". Returning `Some(map)` contributes
/// the map's entries to the control's own errors. A validator must be
/// referentially stable: attaching it twice may run it twice, but because
/// error maps are keyed, no entry is ever duplicated.
///
/// # Examples
///
/// ```rust,ignore
/// use formtree::foundation::{ErrorMap, Validate};
/// use formtree::model::ControlRef;
///
/// struct NotEmpty;
///
/// impl Validate for NotEmpty {
///     fn validate(&self, control: ControlRef<'_>) -> Option<ErrorMap> {
///         match control.value().as_text() {
///             Some("") => Some(ErrorMap::flag("required")),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Validate {
    /// Runs the validator against the control's current state.
    ///
    /// Must be pure and side-effect-free; the engine relies on this for its
    /// idempotence guarantee (two evaluations with no intervening mutation
    /// yield identical error maps).
    fn validate(&self, control: ControlRef<'_>) -> Option<ErrorMap>;

    /// Name used in trace logging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The validator set attached to a single control.
///
/// `set_validators` replaces the whole set; `clear_validators` empties it.
/// Most controls carry zero, one, or two validators, hence the small-vector
/// optimization.
pub type ValidatorSet = SmallVec<[Arc<dyn Validate>; 2]>;

/// Builds a [`ValidatorSet`] from validator values.
///
/// # Examples
///
/// ```rust,ignore
/// use formtree::validators::{min_length, required};
/// use formtree::validator_set;
///
/// let set = validator_set![required(), min_length(3)];
/// ```
#[macro_export]
macro_rules! validator_set {
    () => { $crate::foundation::ValidatorSet::new() };
    ($($validator:expr),+ $(,)?) => {
        $crate::foundation::ValidatorSet::from_iter([
            $(::std::sync::Arc::new($validator) as ::std::sync::Arc<dyn $crate::foundation::Validate>),+
        ])
    };
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysValid;

    impl Validate for AlwaysValid {
        fn validate(&self, _control: ControlRef<'_>) -> Option<ErrorMap> {
            None
        }
    }

    #[test]
    fn default_name_mentions_the_type() {
        assert!(AlwaysValid.name().contains("AlwaysValid"));
    }

    #[test]
    fn validator_set_macro_builds_dyn_set() {
        let set = validator_set![AlwaysValid, AlwaysValid];
        assert_eq!(set.len(), 2);
        let empty = validator_set![];
        assert!(empty.is_empty());
    }
}
