//! Presence validator.

use crate::foundation::ErrorMap;
use crate::model::Value;

crate::field_validator! {
    /// Validates that a field has a value.
    ///
    /// `Null` and empty text both count as absent and yield
    /// `{required: true}`. Every other value passes — well-formedness is the
    /// concern of validators like `email` and `in_range`.
    pub Required;
    rule(control) {
        match control.value() {
            Value::Null => false,
            Value::Text(s) => !s.is_empty(),
            Value::Number(_) | Value::Bool(_) => true,
        }
    }
    error(_control) { ErrorMap::flag("required") }
    fn required();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Validate;
    use crate::model::{FormTree, Value};

    fn check(value: Value) -> Option<ErrorMap> {
        let mut tree = FormTree::new();
        let field = tree.new_field(value);
        required().validate(tree.control(field).unwrap())
    }

    #[test]
    fn null_and_empty_text_are_absent() {
        assert_eq!(check(Value::Null), Some(ErrorMap::flag("required")));
        assert_eq!(check(Value::text("")), Some(ErrorMap::flag("required")));
    }

    #[test]
    fn present_values_pass() {
        assert_eq!(check(Value::text("x")), None);
        assert_eq!(check(Value::Number(0.0)), None);
        assert_eq!(check(Value::Bool(false)), None);
    }
}
