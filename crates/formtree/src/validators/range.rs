//! Numeric range validator.

use crate::foundation::ErrorMap;
use crate::model::Value;

crate::field_validator! {
    /// Validates that a value is a number within `[min, max]`.
    ///
    /// The parameterized factory of the engine: `in_range(min, max)` closes
    /// over its bounds and is pure — two calls with equal parameters produce
    /// functionally-equivalent validators.
    ///
    /// For a non-null value, `{range: true}` is reported when the value is
    /// not a number (see [`Value::as_number`] for the coercion rules), is
    /// strictly less than `min`, or strictly greater than `max`. `Null`
    /// always passes: absence is `required`'s concern.
    pub InRange { min: f64, max: f64 };
    rule(this, control) {
        match control.value() {
            Value::Null => true,
            value => value
                .as_number()
                .is_some_and(|n| n >= this.min && n <= this.max),
        }
    }
    error(_self, _control) { ErrorMap::flag("range") }
    fn in_range(min: f64, max: f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Validate;
    use crate::model::{FormTree, Value};
    use rstest::rstest;

    fn check(value: Value) -> Option<ErrorMap> {
        let mut tree = FormTree::new();
        let field = tree.new_field(value);
        in_range(1.0, 5.0).validate(tree.control(field).unwrap())
    }

    #[rstest]
    #[case(1.0)]
    #[case(3.0)]
    #[case(5.0)]
    fn in_bounds_passes(#[case] n: f64) {
        assert_eq!(check(Value::Number(n)), None);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.999)]
    #[case(5.001)]
    #[case(6.0)]
    fn out_of_bounds_fails(#[case] n: f64) {
        assert_eq!(check(Value::Number(n)), Some(ErrorMap::flag("range")));
    }

    #[test]
    fn null_passes_regardless_of_bounds() {
        assert_eq!(check(Value::Null), None);
    }

    #[test]
    fn non_numbers_fail() {
        assert_eq!(check(Value::text("abc")), Some(ErrorMap::flag("range")));
        assert_eq!(check(Value::Bool(true)), Some(ErrorMap::flag("range")));
        assert_eq!(check(Value::Number(f64::NAN)), Some(ErrorMap::flag("range")));
    }

    #[test]
    fn numeric_text_is_coerced() {
        assert_eq!(check(Value::text("4")), None);
        assert_eq!(check(Value::text("9")), Some(ErrorMap::flag("range")));
    }

    #[test]
    fn equal_parameters_yield_equivalent_validators() {
        let mut tree = FormTree::new();
        let field = tree.new_field(Value::Number(7.0));
        let view = tree.control(field).unwrap();
        assert_eq!(
            in_range(1.0, 5.0).validate(view),
            in_range(1.0, 5.0).validate(view)
        );
    }
}
