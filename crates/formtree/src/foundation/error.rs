//! Error maps and engine faults.
//!
//! Two very different kinds of "error" live here and must not be confused:
//!
//! - [`ErrorMap`] carries *validation-domain* problems (`required`, `email`,
//!   `range`, `match`, ...). These are recoverable-by-user-input states: a
//!   validator never raises a fault for malformed input, it encodes the
//!   problem in the map it returns.
//! - [`EngineError`] carries *system* faults — operating on a detached or
//!   non-existent control, addressing a child that does not exist, appending
//!   to something that is not a list. These fail loudly via `Result`.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::model::ControlId;

// ============================================================================
// ERROR MAP
// ============================================================================

/// An insertion-ordered mapping from error-kind key to a detail payload.
///
/// An empty map signifies validity. Plain boolean markers are stored as
/// `true`; validators that have more to say (e.g. `minLength`) store a
/// structured payload instead.
///
/// Iteration order is the insertion order, which makes repeated evaluations
/// with identical inputs produce identical maps — message derivation and
/// the engine's idempotence guarantee both rely on this.
///
/// # Examples
///
/// ```rust,ignore
/// use formtree::foundation::ErrorMap;
///
/// let errors = ErrorMap::flag("range");
/// assert!(errors.contains("range"));
/// assert!(!errors.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct ErrorMap {
    entries: IndexMap<Cow<'static, str>, Json>,
}

impl ErrorMap {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding a single boolean marker, e.g. `{range: true}`.
    #[must_use]
    pub fn flag(code: impl Into<Cow<'static, str>>) -> Self {
        let mut map = Self::new();
        map.insert(code, Json::Bool(true));
        map
    }

    /// Creates a map holding a single entry with a detail payload.
    #[must_use]
    pub fn detail(code: impl Into<Cow<'static, str>>, payload: Json) -> Self {
        let mut map = Self::new();
        map.insert(code, payload);
        map
    }

    /// Inserts an entry. Re-inserting an existing key overwrites the payload
    /// but keeps the key's original position, so attaching the same validator
    /// twice can never duplicate an entry.
    pub fn insert(&mut self, code: impl Into<Cow<'static, str>>, payload: Json) {
        self.entries.insert(code.into(), payload);
    }

    /// Merges another map into this one, key by key.
    pub fn merge(&mut self, other: Self) {
        for (code, payload) in other.entries {
            self.entries.insert(code, payload);
        }
    }

    /// True when the map has no entries (the control is valid).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of error kinds present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the given error kind is present.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Looks up the payload for an error kind.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Json> {
        self.entries.get(code)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Iterates error-kind keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(Cow::as_ref)
    }
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (code, payload)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{code}: {payload}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(Cow<'static, str>, Json)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (Cow<'static, str>, Json)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// ENGINE FAULTS
// ============================================================================

/// System faults raised by the engine's entry points.
///
/// These are defects in the calling code, not user-facing validation states,
/// and therefore surface as `Err` instead of entries in an [`ErrorMap`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The control id does not name a node in this tree (detached, or from
    /// another tree entirely).
    #[error("unknown control {0:?}: detached or belongs to another tree")]
    UnknownControl(ControlId),

    /// The control exists but has the wrong kind for the operation
    /// (e.g. appending to a field, assigning a scalar to a group).
    #[error("control {id:?} is not a {expected}")]
    KindMismatch {
        /// The offending control.
        id: ControlId,
        /// What the operation required ("field", "group", "list").
        expected: &'static str,
    },

    /// A group has no child under the given name.
    #[error("group {group:?} has no child named `{name}`")]
    NoSuchChild {
        /// The group that was addressed.
        group: ControlId,
        /// The missing child name.
        name: String,
    },

    /// `set_values` demands full coverage; a field child was left out.
    #[error("set_values on {group:?} is missing a value for field `{name}`")]
    MissingChild {
        /// The group being assigned.
        group: ControlId,
        /// The uncovered field name.
        name: String,
    },

    /// The node is already attached to a parent and cannot be re-parented.
    #[error("control {0:?} is already attached to a parent")]
    AlreadyAttached(ControlId),
}

// ============================================================================
// TESTS
// ============================================================================
