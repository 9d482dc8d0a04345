//! Feedback-message derivation from control state and error maps.
//!
//! The catalog is explicitly passed configuration, not ambient static
//! state, so independent form instances can carry independent catalogs.
//! Unknown error keys contribute no text — that is documented behavior the
//! host relies on, not a defect.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::model::ControlRef;

// ============================================================================
// CATALOG
// ============================================================================

/// Mapping from error-kind key to display template.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: IndexMap<Cow<'static, str>, Cow<'static, str>>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of the customer form: `required`, `email`, `match`.
    #[must_use]
    pub fn customer_defaults() -> Self {
        Self::new()
            .with_message("required", "Please enter your email address.")
            .with_message("email", "Please enter a valid email address.")
            .with_message("match", "The confirmation does not match the email address.")
    }

    /// Adds or replaces a template.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(
        mut self,
        code: impl Into<Cow<'static, str>>,
        template: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.templates.insert(code.into(), template.into());
        self
    }

    /// Looks up the template for an error kind.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.templates.get(code).map(Cow::as_ref)
    }
}

// ============================================================================
// ELIGIBILITY
// ============================================================================

/// When is a control eligible to show feedback at all?
///
/// Hosts disagree on this: some show feedback once a control has been
/// visited or edited (`touched || dirty`), others while it is still
/// untouched or once it is dirty (`untouched || dirty`). The policy is
/// configuration rather than a hard-coded choice:
/// [`TouchedOrDirty`](Self::TouchedOrDirty) is the documented default, and
/// [`UntouchedOrDirty`](Self::UntouchedOrDirty) replicates the other
/// convention bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EligibilityPolicy {
    /// Show feedback once the user has visited the control or changed its
    /// value (the sensible reading, and the default).
    #[default]
    TouchedOrDirty,
    /// The legacy variant: show feedback while the control is *untouched*
    /// or once it is dirty.
    UntouchedOrDirty,
}

impl EligibilityPolicy {
    fn eligible(self, control: ControlRef<'_>) -> bool {
        match self {
            Self::TouchedOrDirty => control.touched() || control.dirty(),
            Self::UntouchedOrDirty => !control.touched() || control.dirty(),
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Turns a control's error map into display text.
#[derive(Debug, Clone, Default)]
pub struct MessageResolver {
    catalog: MessageCatalog,
    policy: EligibilityPolicy,
}

impl MessageResolver {
    /// Creates a resolver over a catalog with the default eligibility
    /// policy.
    #[must_use]
    pub fn new(catalog: MessageCatalog) -> Self {
        Self {
            catalog,
            policy: EligibilityPolicy::default(),
        }
    }

    /// Overrides the eligibility policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_policy(mut self, policy: EligibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The configured catalog.
    #[must_use]
    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Derives the feedback text for a control.
    ///
    /// Returns the empty string unless the control is eligible under the
    /// policy. When an owning group is supplied and carries a `match`
    /// error, its template entirely replaces whatever would have been
    /// derived from the field's own errors — this override depends on
    /// field-level and group-level error namespaces staying separate.
    /// Otherwise the templates for the control's own error kinds are
    /// concatenated in error-map iteration order; unknown kinds contribute
    /// nothing.
    #[must_use]
    pub fn resolve(
        &self,
        control: ControlRef<'_>,
        owning_group: Option<ControlRef<'_>>,
    ) -> String {
        if !self.policy.eligible(control) {
            return String::new();
        }

        if let Some(group) = owning_group {
            if group.errors().contains("match") {
                return self.catalog.lookup("match").unwrap_or_default().to_owned();
            }
        }

        let parts: Vec<&str> = control
            .errors()
            .keys()
            .filter_map(|code| self.catalog.lookup(code))
            .collect();
        parts.join(" ")
    }
}

// ============================================================================
// TESTS
// ============================================================================
