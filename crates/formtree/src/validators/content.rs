//! Text format validators.

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::ErrorMap;
use crate::model::Value;

/// Simple but effective: something, an `@`, something, a dot, something —
/// with no whitespace anywhere.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

crate::field_validator! {
    /// Validates email format.
    ///
    /// Absent values (`Null`, empty text) pass; malformed text and non-text
    /// values yield `{email: true}`.
    pub Email;
    rule(control) {
        match control.value() {
            Value::Null => true,
            Value::Text(s) => s.is_empty() || EMAIL_REGEX.is_match(s),
            Value::Number(_) | Value::Bool(_) => false,
        }
    }
    error(_control) { ErrorMap::flag("email") }
    fn email();
}
