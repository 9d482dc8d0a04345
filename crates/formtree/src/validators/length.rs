//! Text length validators.

use crate::foundation::ErrorMap;
use crate::model::Value;

crate::field_validator! {
    /// Validates that text is at least `min` characters long.
    ///
    /// Absent values (`Null`, empty text) pass — pair with `required` when
    /// presence matters. The error carries a detail payload rather than a
    /// bare flag:
    /// `{minLength: {requiredLength: n, actualLength: m}}`.
    pub MinLength { min: usize };
    rule(this, control) {
        match control.value() {
            Value::Null => true,
            Value::Text(s) => s.is_empty() || s.chars().count() >= this.min,
            Value::Number(_) | Value::Bool(_) => true,
        }
    }
    error(this, control) {
        let actual = control.value().as_text().map_or(0, |s| s.chars().count());
        ErrorMap::detail(
            "minLength",
            serde_json::json!({
                "requiredLength": this.min,
                "actualLength": actual,
            }),
        )
    }
    fn min_length(min: usize);
}
