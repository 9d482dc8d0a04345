//! The customer-record form: a concrete control tree wired to the engine,
//! the subscriber registry, and a message resolver.
//!
//! This is the boundary a rendering host talks to. It owns:
//!
//! - the tree — root group with `firstName`, `lastName`, a nested
//!   `emailGroup` (email + confirmation pair), `phone`, `notification`,
//!   `rating`, `sendCatalog`, and a growable `addresses` list;
//! - the initial validator sets, including the cross-field email match on
//!   the pair group;
//! - debounced feedback messages for the email pair (1 s quiet period);
//! - the conditional validator swap on `phone` driven by the notification
//!   preference.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde_json::Value as Json;

use crate::engine::{EventClass, ValidationEngine};
use crate::foundation::EngineError;
use crate::messages::MessageResolver;
use crate::model::{ControlId, ControlStatus, Value};
use crate::reactive::Subscriptions;
use crate::validator_set;
use crate::validators::{email, email_match, in_range, min_length, required};

/// Debounce window for the email-pair feedback messages.
const MESSAGE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Ids of the named controls of the customer form.
#[derive(Debug, Clone, Copy)]
pub struct CustomerControls {
    /// Root group of the whole record.
    pub root: ControlId,
    /// First name (required, at least 3 characters).
    pub first_name: ControlId,
    /// Last name (required).
    pub last_name: ControlId,
    /// The email + confirmation pair group.
    pub email_group: ControlId,
    /// Email address.
    pub email: ControlId,
    /// Email confirmation.
    pub confirm_email: ControlId,
    /// Phone number; required only while notification preference is "text".
    pub phone: ControlId,
    /// Notification preference ("email" or "text").
    pub notification: ControlId,
    /// Rating, 1 to 5.
    pub rating: ControlId,
    /// Whether to send the catalog.
    pub send_catalog: ControlId,
    /// The growable address list.
    pub addresses: ControlId,
}

/// Feedback text derived by the debounced message subscriptions.
#[derive(Debug, Default)]
struct MessageBoard {
    email: String,
    confirm_email: String,
}

/// The assembled customer form.
pub struct CustomerForm {
    engine: ValidationEngine,
    subscriptions: Subscriptions,
    controls: CustomerControls,
    messages: Rc<RefCell<MessageBoard>>,
    resolver: MessageResolver,
}

impl CustomerForm {
    /// Builds the tree, attaches the initial validator sets, wires the
    /// debounced message subscriptions, and evaluates everything once.
    pub fn new(resolver: MessageResolver) -> Result<Self, EngineError> {
        let mut engine = ValidationEngine::new();

        let first_name = engine.new_field(Value::Null);
        let last_name = engine.new_field(Value::Null);
        let email_field = engine.new_field(Value::Null);
        let confirm_email = engine.new_field(Value::Null);
        let email_group =
            engine.new_group([("email", email_field), ("confirmEmail", confirm_email)])?;
        let phone = engine.new_field(Value::Null);
        let notification = engine.new_field(Value::text("email"));
        let rating = engine.new_field(Value::Null);
        let send_catalog = engine.new_field(Value::Bool(true));
        let addresses = engine.new_list([])?;
        let root = engine.new_group([
            ("firstName", first_name),
            ("lastName", last_name),
            ("emailGroup", email_group),
            ("phone", phone),
            ("notification", notification),
            ("rating", rating),
            ("sendCatalog", send_catalog),
            ("addresses", addresses),
        ])?;

        engine.set_validators(first_name, validator_set![required(), min_length(3)])?;
        engine.set_validators(last_name, validator_set![required()])?;
        engine.set_validators(email_field, validator_set![required(), email()])?;
        engine.set_validators(confirm_email, validator_set![required(), email()])?;
        engine.set_validators(
            email_group,
            validator_set![email_match("email", "confirmEmail")],
        )?;
        engine.set_validators(rating, validator_set![in_range(1.0, 5.0)])?;

        let controls = CustomerControls {
            root,
            first_name,
            last_name,
            email_group,
            email: email_field,
            confirm_email,
            phone,
            notification,
            rating,
            send_catalog,
            addresses,
        };

        let messages = Rc::new(RefCell::new(MessageBoard::default()));
        let mut subscriptions = Subscriptions::new();
        Self::wire_message_subscription(
            &mut subscriptions,
            &messages,
            &resolver,
            controls,
            email_field,
            |board, text| board.email = text,
        );
        Self::wire_message_subscription(
            &mut subscriptions,
            &messages,
            &resolver,
            controls,
            confirm_email,
            |board, text| board.confirm_email = text,
        );

        let mut form = Self {
            engine,
            subscriptions,
            controls,
            messages,
            resolver,
        };
        form.append_address()?;
        form.engine.evaluate(root)?;
        form.engine.drain_events(); // construction noise is nobody's event
        Ok(form)
    }

    fn wire_message_subscription(
        subscriptions: &mut Subscriptions,
        messages: &Rc<RefCell<MessageBoard>>,
        resolver: &MessageResolver,
        controls: CustomerControls,
        field: ControlId,
        store: fn(&mut MessageBoard, String),
    ) {
        let board = Rc::clone(messages);
        let resolver = resolver.clone();
        subscriptions.subscribe(
            field,
            EventClass::ValueChanges,
            MESSAGE_DEBOUNCE,
            Box::new(move |engine, id| {
                if let (Ok(control), Ok(group)) =
                    (engine.control(id), engine.control(controls.email_group))
                {
                    store(&mut board.borrow_mut(), resolver.resolve(control, Some(group)));
                }
            }),
        );
    }

    /// The named control ids, for hosts that address controls directly.
    #[must_use]
    pub fn controls(&self) -> &CustomerControls {
        &self.controls
    }

    /// Read access to the engine (status, errors, values, snapshots).
    #[must_use]
    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Mutating access for host-driven edits beyond the named operations.
    pub fn engine_mut(&mut self) -> &mut ValidationEngine {
        &mut self.engine
    }

    // ------------------------------------------------------------------
    // Named operations
    // ------------------------------------------------------------------

    /// Appends a fresh address group (`addressType` defaults to `"home"`,
    /// everything else empty) and evaluates it.
    pub fn append_address(&mut self) -> Result<ControlId, EngineError> {
        self.engine.append_group(
            self.controls.addresses,
            [
                ("addressType", Value::text("home")),
                ("street1", Value::text("")),
                ("street2", Value::text("")),
                ("city", Value::text("")),
                ("state", Value::text("")),
                ("zip", Value::text("")),
            ],
        )
    }

    /// Number of address groups currently in the list.
    #[must_use]
    pub fn address_count(&self) -> usize {
        self.engine
            .control(self.controls.addresses)
            .map_or(0, |list| list.child_count())
    }

    /// Sets the notification preference and performs the conditional
    /// validator swap on `phone`: `"text"` makes the phone required, any
    /// other preference clears the phone's validators. The engine does not
    /// derive this dependency itself; this is the host-side wiring.
    pub fn set_notification_preference(&mut self, preference: &str) -> Result<(), EngineError> {
        self.engine
            .set_value(self.controls.notification, Value::text(preference))?;
        if preference == "text" {
            self.engine
                .set_validators(self.controls.phone, validator_set![required()])
        } else {
            self.engine.clear_validators(self.controls.phone)
        }
    }

    /// User input into a field.
    pub fn type_into(&mut self, field: ControlId, value: Value) -> Result<(), EngineError> {
        self.engine.set_value(field, value)
    }

    /// Focus-loss signal for a field.
    pub fn leave(&mut self, field: ControlId) -> Result<(), EngineError> {
        self.engine.mark_touched(field)
    }

    /// The cooperative tick: feeds drained engine events to the subscriber
    /// registry and fires due debounce callbacks. Returns the number of
    /// callbacks fired.
    pub fn pump(&mut self, now: Instant) -> usize {
        for event in self.engine.drain_events() {
            self.subscriptions.observe(&event, now);
        }
        self.subscriptions.poll(now, &self.engine).len()
    }

    /// Current feedback text for the email field.
    #[must_use]
    pub fn email_message(&self) -> String {
        self.messages.borrow().email.clone()
    }

    /// Current feedback text for the confirmation field.
    #[must_use]
    pub fn confirm_email_message(&self) -> String {
        self.messages.borrow().confirm_email.clone()
    }

    /// Immediate (non-debounced) message derivation for any control, with
    /// the email-pair override applied when the control is one of the pair.
    #[must_use]
    pub fn message_for(&self, field: ControlId) -> String {
        let Ok(control) = self.engine.control(field) else {
            return String::new();
        };
        let group = (field == self.controls.email || field == self.controls.confirm_email)
            .then(|| self.engine.control(self.controls.email_group).ok())
            .flatten();
        self.resolver.resolve(control, group)
    }

    /// True when the whole form is valid; gates the save action.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.engine
            .status(self.controls.root)
            .is_ok_and(|s| s == ControlStatus::Valid)
    }

    /// Snapshot of the whole tree's values as nested JSON. The engine
    /// exposes the snapshot on demand and transmits nothing.
    pub fn save(&self) -> Result<Json, EngineError> {
        let snapshot = self.engine.snapshot(self.controls.root)?;
        tracing::info!(valid = self.is_valid(), "form snapshot taken");
        Ok(snapshot)
    }

    /// Fills in a plausible record for manual testing (programmatic patch;
    /// leaves pristine/touched flags alone).
    pub fn populate_test_data(&mut self) -> Result<(), EngineError> {
        self.engine.patch_values(
            self.controls.root,
            [
                ("firstName", Value::text("Jack")),
                ("lastName", Value::text("Harkness")),
                ("sendCatalog", Value::Bool(false)),
            ],
        )?;
        self.engine.patch_values(
            self.controls.email_group,
            [("email", Value::text("jack@torchwood.example"))],
        )
    }

    /// Tears down the reactive side: drops every subscription and any
    /// pending debounce timer without firing callbacks.
    pub fn teardown(&mut self) {
        self.subscriptions.unsubscribe_control(self.controls.email);
        self.subscriptions
            .unsubscribe_control(self.controls.confirm_email);
    }
}

impl std::fmt::Debug for CustomerForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerForm")
            .field("engine", &self.engine)
            .field("subscriptions", &self.subscriptions)
            .field("valid", &self.is_valid())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageCatalog;

    fn form() -> CustomerForm {
        CustomerForm::new(MessageResolver::new(MessageCatalog::customer_defaults())).unwrap()
    }

    #[test]
    fn fresh_form_is_invalid_but_addresses_are_valid() {
        let form = form();
        assert!(!form.is_valid()); // required fields are empty
        assert_eq!(form.address_count(), 1);
        let addresses = form.engine().control(form.controls().addresses).unwrap();
        assert_eq!(addresses.status(), ControlStatus::Valid);
    }

    #[test]
    fn append_address_grows_the_list_with_defaults() {
        let mut form = form();
        let group = form.append_address().unwrap();
        assert_eq!(form.address_count(), 2);

        let view = form.engine().control(group).unwrap();
        assert_eq!(
            view.child("addressType").unwrap().value(),
            &Value::text("home")
        );
        assert_eq!(view.child("street1").unwrap().value(), &Value::text(""));
    }

    #[test]
    fn notification_swap_toggles_phone_requirement() {
        let mut form = form();
        let phone = form.controls().phone;

        form.set_notification_preference("text").unwrap();
        assert_eq!(
            form.engine().status(phone).unwrap(),
            ControlStatus::Invalid
        );
        assert!(form.engine().errors(phone).unwrap().contains("required"));

        form.set_notification_preference("email").unwrap();
        assert_eq!(form.engine().status(phone).unwrap(), ControlStatus::Valid);
        assert!(form.engine().errors(phone).unwrap().is_empty());
    }

    #[test]
    fn save_snapshot_mirrors_the_tree() {
        let form = form();
        let snapshot = form.save().unwrap();
        assert_eq!(snapshot["notification"], serde_json::json!("email"));
        assert_eq!(snapshot["sendCatalog"], serde_json::json!(true));
        assert_eq!(snapshot["addresses"][0]["addressType"], serde_json::json!("home"));
        assert_eq!(snapshot["emailGroup"]["email"], serde_json::json!(null));
    }

    #[test]
    fn populate_test_data_patches_without_dirtying() {
        let mut form = form();
        form.populate_test_data().unwrap();

        let first_name = form.controls().first_name;
        assert_eq!(
            form.engine().value(first_name).unwrap(),
            &Value::text("Jack")
        );
        assert!(form.engine().control(first_name).unwrap().pristine());
    }
}
