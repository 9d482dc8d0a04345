//! The validation engine: orchestrates validator attachment, re-evaluation,
//! and error-map propagation over a [`FormTree`].
//!
//! All tree mutation goes through the engine's entry points — `status` and
//! `errors` cannot be written from outside, which is what makes the
//! aggregation invariant and the idempotence guarantee hold:
//!
//! - a control is Invalid iff its own errors are non-empty or any
//!   descendant is Invalid;
//! - running [`evaluate`](ValidationEngine::evaluate) twice with no
//!   intervening mutation yields byte-identical error maps.
//!
//! Evaluation is synchronous and never suspends. Within one user
//! interaction the whole affected chain is consistent before control
//! returns to the host.
//!
//! The engine does *not* derive conditional validator dependencies: when
//! field A's validator set depends on field B's value, the host observes
//! B's change and calls [`set_validators`](ValidationEngine::set_validators)
//! or [`clear_validators`](ValidationEngine::clear_validators) on A itself.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::foundation::{EngineError, ErrorMap, ValidatorSet};
use crate::model::{
    ControlId, ControlKind, ControlRef, ControlStatus, FormTree, Value,
};

// ============================================================================
// EVENTS
// ============================================================================

/// The event classes a control can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventClass {
    /// The control's value (or, for groups and lists, some descendant's
    /// value or the list's shape) changed.
    ValueChanges,
    /// The control's status flipped as a result of an evaluation.
    StatusChanges,
}

/// One emission from the engine's outbox.
///
/// Every mutating entry point records the events it caused; the host drains
/// them with [`ValidationEngine::drain_events`] and feeds them to its
/// subscriber registry. This is the explicit emission point that replaces
/// ambient observable chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEvent {
    /// The control that emitted.
    pub control: ControlId,
    /// What happened.
    pub class: EventClass,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Owns the control tree, the per-control validator sets, and the event
/// outbox.
#[derive(Default)]
pub struct ValidationEngine {
    tree: FormTree,
    validators: HashMap<ControlId, ValidatorSet>,
    outbox: Vec<ControlEvent>,
}

impl ValidationEngine {
    /// Creates an engine over an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Tree construction (bottom-up)
    // ------------------------------------------------------------------

    /// Creates a detached field with the given initial value.
    pub fn new_field(&mut self, initial: Value) -> ControlId {
        self.tree.new_field(initial)
    }

    /// Creates a group owning the given children, in order.
    pub fn new_group<N, I>(&mut self, children: I) -> Result<ControlId, EngineError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, ControlId)>,
    {
        self.tree.new_group(children)
    }

    /// Creates a list owning the given items, in order.
    pub fn new_list<I>(&mut self, items: I) -> Result<ControlId, EngineError>
    where
        I: IntoIterator<Item = ControlId>,
    {
        self.tree.new_list(items)
    }

    /// Builds the fields of a fresh group, appends it to a list, and
    /// evaluates it. Returns the new group's id.
    pub fn append_group<N, I>(
        &mut self,
        list: ControlId,
        fields: I,
    ) -> Result<ControlId, EngineError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Value)>,
    {
        let mut named: Vec<(String, ControlId)> = Vec::new();
        for (name, value) in fields {
            named.push((name.into(), self.tree.new_field(value)));
        }
        let group = self.tree.new_group(named)?;
        self.tree.push_item(list, group)?;
        tracing::debug!(list = ?list, group = ?group, "list item appended");

        self.evaluate(group)?;
        self.emit(list, EventClass::ValueChanges);
        self.revalidate_own(list)?;
        self.bubble_value_change(list)?;
        Ok(group)
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// A read-only view of a control.
    pub fn control(&self, id: ControlId) -> Result<ControlRef<'_>, EngineError> {
        self.tree.control(id)
    }

    /// Current status of a control.
    pub fn status(&self, id: ControlId) -> Result<ControlStatus, EngineError> {
        Ok(self.tree.node(id)?.status())
    }

    /// A control's own errors.
    pub fn errors(&self, id: ControlId) -> Result<&ErrorMap, EngineError> {
        Ok(self.tree.node(id)?.errors())
    }

    /// A field's current value.
    pub fn value(&self, id: ControlId) -> Result<&Value, EngineError> {
        Ok(self.tree.node(id)?.value())
    }

    /// Snapshot of the subtree's values as nested JSON (the "save"
    /// boundary — nothing is transmitted).
    pub fn snapshot(&self, id: ControlId) -> Result<Json, EngineError> {
        self.tree.snapshot(id)
    }

    // ------------------------------------------------------------------
    // Validator attachment
    // ------------------------------------------------------------------

    /// Replaces the control's entire validator set and immediately
    /// re-evaluates it.
    pub fn set_validators(
        &mut self,
        id: ControlId,
        set: ValidatorSet,
    ) -> Result<(), EngineError> {
        self.tree.node(id)?;
        tracing::debug!(control = ?id, count = set.len(), "validator set replaced");
        self.validators.insert(id, set);
        self.evaluate(id)?;
        self.refresh_ancestor_statuses(id)
    }

    /// Empties the control's validator set and re-evaluates, clearing its
    /// own errors but not its descendants'.
    pub fn clear_validators(&mut self, id: ControlId) -> Result<(), EngineError> {
        self.tree.node(id)?;
        tracing::debug!(control = ?id, "validators cleared");
        self.validators.remove(&id);
        self.evaluate(id)?;
        self.refresh_ancestor_statuses(id)
    }

    // ------------------------------------------------------------------
    // Mutation entry points
    // ------------------------------------------------------------------

    /// User-input entry point: assigns a field's value, marks it dirty, and
    /// re-validates the field and every ancestor up to the root. Ancestor
    /// re-validation is what makes cross-field group validators see every
    /// sibling edit.
    pub fn set_value(&mut self, id: ControlId, value: Value) -> Result<(), EngineError> {
        self.tree.assign(id, value, true)?;
        tracing::trace!(control = ?id, "value set by user input");
        self.emit(id, EventClass::ValueChanges);
        self.revalidate_own(id)?;
        self.bubble_value_change(id)
    }

    /// Programmatic assignment of some of a group's field children.
    /// Unlike user input, this leaves the interaction flags alone.
    pub fn patch_values<N, I>(&mut self, group: ControlId, entries: I) -> Result<(), EngineError>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, Value)>,
    {
        for (name, value) in entries {
            let child = self.tree.child(group, name.as_ref())?;
            self.tree.assign(child, value, false)?;
            self.emit(child, EventClass::ValueChanges);
        }
        self.evaluate(group)?;
        self.emit(group, EventClass::ValueChanges);
        self.bubble_value_change(group)
    }

    /// Programmatic assignment of *all* of a group's field children: every
    /// direct field child must be covered, and every entry must name an
    /// existing child.
    pub fn set_values<I>(&mut self, group: ControlId, entries: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let entries: IndexMap<String, Value> = entries.into_iter().collect();
        for name in entries.keys() {
            self.tree.child(group, name)?;
        }

        let children: Vec<(String, ControlId)> = match self.tree.node(group)?.kind() {
            ControlKind::Group { children } => {
                children.iter().map(|(n, &c)| (n.clone(), c)).collect()
            }
            _ => {
                return Err(EngineError::KindMismatch {
                    id: group,
                    expected: "group",
                });
            }
        };
        for (name, child) in &children {
            let is_field = matches!(self.tree.node(*child)?.kind(), ControlKind::Field { .. });
            if is_field && !entries.contains_key(name) {
                return Err(EngineError::MissingChild {
                    group,
                    name: name.clone(),
                });
            }
        }

        self.patch_values(group, entries)
    }

    /// Interaction signal: the control received and lost focus. Emits no
    /// value event and triggers no re-validation on its own.
    pub fn mark_touched(&mut self, id: ControlId) -> Result<(), EngineError> {
        self.tree.mark_touched(id)
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Re-runs the validators attached directly to the control, children
    /// first (bottom-up), then aggregates status per the invariant.
    ///
    /// Deterministic and idempotent: with no intervening mutation, repeat
    /// runs produce identical error maps and emit no further status events.
    pub fn evaluate(&mut self, id: ControlId) -> Result<(), EngineError> {
        for child in self.tree.children(id)? {
            self.evaluate(child)?;
        }
        self.revalidate_own(id)
    }

    /// Drains the event outbox in emission order.
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn emit(&mut self, control: ControlId, class: EventClass) {
        self.outbox.push(ControlEvent { control, class });
    }

    /// Runs the control's own validators and installs errors + status.
    /// Does not recurse; children keep their current results.
    fn revalidate_own(&mut self, id: ControlId) -> Result<(), EngineError> {
        let own = self.run_validators(id)?;
        self.install(id, own)
    }

    fn run_validators(&self, id: ControlId) -> Result<ErrorMap, EngineError> {
        let view = self.tree.control(id)?;
        let mut merged = ErrorMap::new();
        if let Some(set) = self.validators.get(&id) {
            for validator in set {
                if let Some(errors) = validator.validate(view) {
                    tracing::trace!(
                        control = ?id,
                        validator = validator.name(),
                        %errors,
                        "validator reported errors"
                    );
                    merged.merge(errors);
                }
            }
        }
        Ok(merged)
    }

    /// Installs own errors and the aggregated status, emitting a status
    /// event when the status flips.
    fn install(&mut self, id: ControlId, own: ErrorMap) -> Result<(), EngineError> {
        let child_invalid = self
            .tree
            .children(id)?
            .iter()
            .any(|&c| {
                self.tree
                    .node(c)
                    .is_ok_and(|n| n.status() == ControlStatus::Invalid)
            });
        let status = if !own.is_empty() || child_invalid {
            ControlStatus::Invalid
        } else {
            ControlStatus::Valid
        };
        if self.tree.install_result(id, own, status)? {
            self.emit(id, EventClass::StatusChanges);
        }
        Ok(())
    }

    /// Value-change propagation: every ancestor re-runs its *own*
    /// validators (cross-field validators must see sibling edits) and
    /// re-aggregates, emitting a `ValueChanges` event on the way up.
    fn bubble_value_change(&mut self, id: ControlId) -> Result<(), EngineError> {
        let mut cur = id;
        while let Some(parent) = self.tree.parent(cur)? {
            self.emit(parent, EventClass::ValueChanges);
            self.revalidate_own(parent)?;
            cur = parent;
        }
        Ok(())
    }

    /// Status-only propagation after a validator swap: ancestors
    /// re-aggregate without re-running their validators, so unrelated
    /// controls' validators are not re-triggered.
    fn refresh_ancestor_statuses(&mut self, id: ControlId) -> Result<(), EngineError> {
        let mut cur = id;
        while let Some(parent) = self.tree.parent(cur)? {
            let own = self.tree.node(parent)?.errors().clone();
            self.install(parent, own)?;
            cur = parent;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("controls", &self.tree.len())
            .field("validator_sets", &self.validators.len())
            .field("queued_events", &self.outbox.len())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator_set;
    use crate::validators::{email_match, in_range, required};

    struct Fixture {
        engine: ValidationEngine,
        root: ControlId,
        name: ControlId,
        rating: ControlId,
        pair: ControlId,
        email: ControlId,
        confirm: ControlId,
    }

    fn fixture() -> Fixture {
        let mut engine = ValidationEngine::new();
        let name = engine.new_field(Value::Null);
        let rating = engine.new_field(Value::Null);
        let email = engine.new_field(Value::Null);
        let confirm = engine.new_field(Value::Null);
        let pair = engine
            .new_group([("email", email), ("confirmEmail", confirm)])
            .unwrap();
        let root = engine
            .new_group([("name", name), ("rating", rating), ("emailGroup", pair)])
            .unwrap();

        engine.set_validators(name, validator_set![required()]).unwrap();
        engine
            .set_validators(rating, validator_set![in_range(1.0, 5.0)])
            .unwrap();
        engine
            .set_validators(pair, validator_set![email_match("email", "confirmEmail")])
            .unwrap();
        engine.evaluate(root).unwrap();
        engine.drain_events();

        Fixture {
            engine,
            root,
            name,
            rating,
            pair,
            email,
            confirm,
        }
    }

    #[test]
    fn evaluate_is_idempotent() {
        let mut f = fixture();
        f.engine.set_value(f.rating, Value::Number(9.0)).unwrap();

        f.engine.evaluate(f.root).unwrap();
        let first = f.engine.errors(f.rating).unwrap().clone();
        f.engine.evaluate(f.root).unwrap();
        let second = f.engine.errors(f.rating).unwrap().clone();

        assert_eq!(first, second);
        assert!(first.contains("range"));
    }

    #[test]
    fn repeat_evaluate_emits_no_further_status_events() {
        let mut f = fixture();
        f.engine.set_value(f.rating, Value::Number(9.0)).unwrap();
        f.engine.drain_events();

        f.engine.evaluate(f.root).unwrap();
        let events = f.engine.drain_events();
        assert!(
            events.iter().all(|e| e.class != EventClass::StatusChanges),
            "unexpected status events: {events:?}"
        );
    }

    #[test]
    fn invalid_descendant_makes_ancestors_invalid() {
        let mut f = fixture();
        assert_eq!(f.engine.status(f.root).unwrap(), ControlStatus::Invalid); // name is required+Null

        f.engine.set_value(f.name, Value::text("Ada")).unwrap();
        assert_eq!(f.engine.status(f.name).unwrap(), ControlStatus::Valid);
        assert_eq!(f.engine.status(f.root).unwrap(), ControlStatus::Valid);
    }

    #[test]
    fn group_errors_never_contain_field_error_keys() {
        let mut f = fixture();
        f.engine.set_value(f.email, Value::text("a@b.co")).unwrap();
        f.engine.set_value(f.confirm, Value::text("x@y.co")).unwrap();

        let group_errors = f.engine.errors(f.pair).unwrap();
        assert!(group_errors.contains("match"));
        assert_eq!(group_errors.len(), 1);
        // the field-level namespace stays on the fields
        assert!(f.engine.errors(f.name).unwrap().contains("required"));
        assert!(!f.engine.errors(f.root).unwrap().contains("required"));
    }

    #[test]
    fn sibling_edit_reruns_the_group_validator() {
        let mut f = fixture();
        f.engine.set_value(f.email, Value::text("a@b.co")).unwrap();
        f.engine.set_value(f.confirm, Value::text("x@y.co")).unwrap();
        assert!(f.engine.errors(f.pair).unwrap().contains("match"));

        // fixing the mismatch through a single sibling clears the group error
        f.engine.set_value(f.confirm, Value::text("a@b.co")).unwrap();
        assert!(f.engine.errors(f.pair).unwrap().is_empty());
    }

    #[test]
    fn set_validators_replaces_the_whole_set() {
        let mut f = fixture();
        assert!(f.engine.errors(f.name).unwrap().contains("required"));

        f.engine
            .set_validators(f.name, validator_set![in_range(1.0, 5.0)])
            .unwrap();
        let errors = f.engine.errors(f.name).unwrap();
        assert!(!errors.contains("required"));
        assert!(errors.is_empty()); // Null passes in_range
    }

    #[test]
    fn clear_validators_clears_own_errors_not_descendants() {
        let mut f = fixture();
        f.engine.set_value(f.email, Value::text("a@b.co")).unwrap();
        f.engine.set_value(f.confirm, Value::text("x@y.co")).unwrap();
        f.engine
            .set_validators(f.email, validator_set![required()])
            .unwrap();
        f.engine.set_value(f.email, Value::Null).unwrap();
        assert!(f.engine.errors(f.email).unwrap().contains("required"));

        f.engine.clear_validators(f.pair).unwrap();
        assert!(f.engine.errors(f.pair).unwrap().is_empty());
        assert!(f.engine.errors(f.email).unwrap().contains("required"));
        assert_eq!(f.engine.status(f.pair).unwrap(), ControlStatus::Invalid);
    }

    #[test]
    fn validator_swap_updates_ancestor_status() {
        let mut f = fixture();
        f.engine.set_value(f.name, Value::text("Ada")).unwrap();
        f.engine.set_value(f.rating, Value::Number(3.0)).unwrap();
        assert_eq!(f.engine.status(f.root).unwrap(), ControlStatus::Valid);

        // make rating newly required-and-missing via a swap
        f.engine.set_value(f.rating, Value::Null).unwrap();
        f.engine
            .set_validators(f.rating, validator_set![required()])
            .unwrap();
        assert_eq!(f.engine.status(f.root).unwrap(), ControlStatus::Invalid);

        f.engine.clear_validators(f.rating).unwrap();
        assert_eq!(f.engine.status(f.root).unwrap(), ControlStatus::Valid);
    }

    #[test]
    fn detached_control_fails_loudly() {
        let mut f = fixture();
        let stranger = ControlId(4242);
        assert!(matches!(
            f.engine.evaluate(stranger),
            Err(EngineError::UnknownControl(_))
        ));
        assert!(matches!(
            f.engine.set_validators(stranger, validator_set![required()]),
            Err(EngineError::UnknownControl(_))
        ));
    }

    #[test]
    fn set_values_demands_full_field_coverage() {
        let mut f = fixture();
        let err = f
            .engine
            .set_values(f.pair, [("email".to_owned(), Value::text("a@b.co"))])
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingChild { .. }));

        let err = f
            .engine
            .set_values(f.pair, [("nope".to_owned(), Value::Null)])
            .unwrap_err();
        assert!(matches!(err, EngineError::NoSuchChild { .. }));
    }

    #[test]
    fn patch_values_does_not_mark_dirty() {
        let mut f = fixture();
        f.engine
            .patch_values(f.pair, [("email", Value::text("a@b.co"))])
            .unwrap();
        assert!(f.engine.control(f.email).unwrap().pristine());
        assert_eq!(f.engine.value(f.email).unwrap(), &Value::text("a@b.co"));
    }

    #[test]
    fn value_changes_bubble_to_ancestors() {
        let mut f = fixture();
        f.engine.set_value(f.email, Value::text("a@b.co")).unwrap();
        let events = f.engine.drain_events();
        let value_changed: Vec<ControlId> = events
            .iter()
            .filter(|e| e.class == EventClass::ValueChanges)
            .map(|e| e.control)
            .collect();
        assert_eq!(value_changed, vec![f.email, f.pair, f.root]);
    }
}
