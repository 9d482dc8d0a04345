//! End-to-end scenarios against the assembled customer form.

use formtree::prelude::*;
use pretty_assertions::assert_eq;

fn form() -> CustomerForm {
    CustomerForm::new(MessageResolver::new(MessageCatalog::customer_defaults()))
        .expect("form builds")
}

#[test]
fn empty_names_and_out_of_range_rating_make_the_form_invalid() {
    let mut form = form();
    let c = *form.controls();

    form.type_into(c.first_name, Value::text("")).unwrap();
    form.type_into(c.last_name, Value::text("")).unwrap();
    form.type_into(c.rating, Value::Number(6.0)).unwrap();

    let engine = form.engine();
    assert!(engine.errors(c.first_name).unwrap().contains("required"));
    assert!(engine.errors(c.last_name).unwrap().contains("required"));
    assert_eq!(engine.errors(c.rating).unwrap(), &ErrorMap::flag("range"));
    assert_eq!(engine.status(c.root).unwrap(), ControlStatus::Invalid);
    assert!(!form.is_valid());
}

#[test]
fn a_fully_filled_form_is_valid_and_saves_a_nested_snapshot() {
    let mut form = form();
    let c = *form.controls();

    form.type_into(c.first_name, Value::text("Jack")).unwrap();
    form.type_into(c.last_name, Value::text("Sparrow")).unwrap();
    form.type_into(c.email, Value::text("jack@pearl.example")).unwrap();
    form.type_into(c.confirm_email, Value::text("jack@pearl.example"))
        .unwrap();
    form.type_into(c.rating, Value::Number(4.0)).unwrap();

    assert!(form.is_valid());

    let snapshot = form.save().unwrap();
    assert_eq!(snapshot["firstName"], serde_json::json!("Jack"));
    assert_eq!(
        snapshot["emailGroup"],
        serde_json::json!({
            "email": "jack@pearl.example",
            "confirmEmail": "jack@pearl.example",
        })
    );
    assert_eq!(snapshot["addresses"][0]["addressType"], serde_json::json!("home"));
}

#[test]
fn appending_an_address_keeps_the_list_valid() {
    let mut form = form();
    assert_eq!(form.address_count(), 1);

    form.append_address().unwrap();
    assert_eq!(form.address_count(), 2);

    let addresses = form.engine().control(form.controls().addresses).unwrap();
    let second = addresses.item(1).unwrap();
    assert_eq!(second.child("addressType").unwrap().value(), &Value::text("home"));
    assert_eq!(second.child("zip").unwrap().value(), &Value::text(""));
    assert_eq!(addresses.status(), ControlStatus::Valid);
}

#[test]
fn notification_swap_does_not_disturb_unrelated_fields() {
    let mut form = form();
    let c = *form.controls();

    form.type_into(c.email, Value::text("not-an-email")).unwrap();
    let email_errors_before = form.engine().errors(c.email).unwrap().clone();
    assert!(email_errors_before.contains("email"));

    form.set_notification_preference("text").unwrap();
    assert!(form.engine().errors(c.phone).unwrap().contains("required"));
    assert_eq!(form.engine().errors(c.email).unwrap(), &email_errors_before);

    form.set_notification_preference("email").unwrap();
    assert!(form.engine().errors(c.phone).unwrap().is_empty());
    assert_eq!(form.engine().status(c.phone).unwrap(), ControlStatus::Valid);
    assert_eq!(form.engine().errors(c.email).unwrap(), &email_errors_before);
}

#[test]
fn email_mismatch_message_overrides_field_messages() {
    let mut form = form();
    let c = *form.controls();

    form.type_into(c.email, Value::text("one@example.com")).unwrap();
    form.type_into(c.confirm_email, Value::text("two@example.com"))
        .unwrap();
    form.leave(c.email).unwrap();

    assert!(form.engine().errors(c.email_group).unwrap().contains("match"));
    assert_eq!(
        form.message_for(c.email),
        "The confirmation does not match the email address."
    );
}

#[test]
fn mismatch_is_suppressed_while_the_confirmation_is_pristine() {
    let mut form = form();
    let c = *form.controls();

    form.type_into(c.email, Value::text("one@example.com")).unwrap();
    // confirmEmail never edited: no verdict, even though the values differ
    assert!(form.engine().errors(c.email_group).unwrap().is_empty());
}

#[test]
fn populate_then_confirm_completes_the_record() {
    let mut form = form();
    let c = *form.controls();

    form.populate_test_data().unwrap();
    assert_eq!(
        form.engine().value(c.first_name).unwrap(),
        &Value::text("Jack")
    );

    // the patch is programmatic, so the mismatch stays suppressed
    assert!(form.engine().errors(c.email_group).unwrap().is_empty());

    form.type_into(c.email, Value::text("jack@torchwood.example"))
        .unwrap();
    form.type_into(c.confirm_email, Value::text("jack@torchwood.example"))
        .unwrap();
    form.type_into(c.rating, Value::Number(5.0)).unwrap();
    assert!(form.is_valid());
}
