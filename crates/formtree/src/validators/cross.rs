//! Cross-field (group-level) validators.
//!
//! These are attached to a group and read two or more sibling fields,
//! producing errors in the group's own namespace. Field-level and
//! group-level error maps never mix — message derivation depends on that
//! separation.

use std::borrow::Cow;

use crate::foundation::{ErrorMap, Validate};
use crate::model::ControlRef;

/// Validates that two sibling fields hold equal values.
///
/// While either sibling is pristine the validator returns no verdict. This
/// is a deliberate suppression policy, not an oversight: without it a
/// mismatch error would flash the moment the user types into the first
/// field, before the confirmation field has been filled in at all.
///
/// Once both siblings are non-pristine, equal values (including both
/// `Null`) pass and anything else yields `{match: true}`. Because the
/// engine re-evaluates the ancestor chain after every field edit, this runs
/// on every value change of either sibling, not only when the group itself
/// is visited.
#[derive(Debug, Clone)]
pub struct EmailMatch {
    first: Cow<'static, str>,
    second: Cow<'static, str>,
}

impl Validate for EmailMatch {
    fn validate(&self, group: ControlRef<'_>) -> Option<ErrorMap> {
        let (Some(first), Some(second)) = (group.child(&self.first), group.child(&self.second))
        else {
            // A missing sibling means the validator is attached to the wrong
            // group; there is no user-facing verdict to give.
            tracing::warn!(
                first = %self.first,
                second = %self.second,
                "email match validator attached to a group without both siblings"
            );
            return None;
        };

        if first.pristine() || second.pristine() {
            return None;
        }
        if first.value() == second.value() {
            return None;
        }
        Some(ErrorMap::flag("match"))
    }

    fn name(&self) -> &str {
        "email_match"
    }
}

/// Creates an [`EmailMatch`] validator over the two named siblings.
#[must_use]
pub fn email_match(
    first: impl Into<Cow<'static, str>>,
    second: impl Into<Cow<'static, str>>,
) -> EmailMatch {
    EmailMatch {
        first: first.into(),
        second: second.into(),
    }
}
