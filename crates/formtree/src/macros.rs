//! Macros for creating field validators with minimal boilerplate.
//!
//! [`field_validator!`] generates the struct, the [`Validate`] impl, and a
//! factory function from a `rule` (does the control pass?) and an `error`
//! (what map to report when it does not).
//!
//! # Examples
//!
//! ```rust,ignore
//! use formtree::field_validator;
//! use formtree::foundation::ErrorMap;
//!
//! // Unit validator (no parameters)
//! field_validator! {
//!     pub Required;
//!     rule(control) { !control.value().is_null() }
//!     error(_control) { ErrorMap::flag("required") }
//!     fn required();
//! }
//!
//! // Parameterized factory (closes over its parameters)
//! field_validator! {
//!     pub InRange { min: f64, max: f64 };
//!     rule(this, control) {
//!         control.value().as_number().is_none_or(|n| n >= this.min && n <= this.max)
//!     }
//!     error(_this, _control) { ErrorMap::flag("range") }
//!     fn in_range(min: f64, max: f64);
//! }
//! ```
//!
//! [`Validate`]: crate::foundation::Validate

/// Creates a complete field validator: struct definition, `Validate`
/// implementation, constructor, and factory function.
///
/// `rule` returns `true` when the control passes; `error` builds the
/// [`ErrorMap`](crate::foundation::ErrorMap) reported when it does not.
/// Both blocks see the control as a
/// [`ControlRef`](crate::model::ControlRef).
#[macro_export]
macro_rules! field_validator {
    // ── Variant 1: Unit validator (no parameters) ────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident;
        rule($control:ident) $rule:block
        error($ectrl:ident) $err:block
        fn $factory:ident();
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::foundation::Validate for $name {
            fn validate(
                &self,
                control: $crate::model::ControlRef<'_>,
            ) -> ::core::option::Option<$crate::foundation::ErrorMap> {
                let passed = {
                    let $control = control;
                    $rule
                };
                if passed {
                    ::core::option::Option::None
                } else {
                    let $ectrl = control;
                    ::core::option::Option::Some($err)
                }
            }
        }

        #[must_use]
        $vis const fn $factory() -> $name {
            $name
        }
    };

    // ── Variant 2: Parameterized validator (auto `new` from all fields) ──
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident { $($field:ident : $fty:ty),+ $(,)? };
        rule($self_:ident, $control:ident) $rule:block
        error($eself:ident, $ectrl:ident) $err:block
        fn $factory:ident($($arg:ident : $aty:ty),+);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(
                /// Validator parameter, fixed at construction.
                pub $field: $fty,
            )+
        }

        impl $crate::foundation::Validate for $name {
            fn validate(
                &self,
                control: $crate::model::ControlRef<'_>,
            ) -> ::core::option::Option<$crate::foundation::ErrorMap> {
                let passed = {
                    let $self_ = self;
                    let $control = control;
                    $rule
                };
                if passed {
                    ::core::option::Option::None
                } else {
                    let $eself = self;
                    let $ectrl = control;
                    ::core::option::Option::Some($err)
                }
            }
        }

        impl $name {
            /// Creates the validator from its parameters.
            #[must_use]
            $vis fn new($($arg: $aty),+) -> Self {
                Self { $($arg),+ }
            }
        }

        /// Factory function closing over the validator's parameters.
        #[must_use]
        $vis fn $factory($($arg: $aty),+) -> $name {
            $name::new($($arg),+)
        }
    };
}
