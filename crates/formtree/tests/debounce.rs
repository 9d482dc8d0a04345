//! Debounced message derivation driven through the host tick.
//!
//! No sleeping: deadlines are fabricated from a base `Instant` and the
//! registry is polled with explicit clocks.

use std::time::{Duration, Instant};

use formtree::prelude::*;
use pretty_assertions::assert_eq;

fn form() -> CustomerForm {
    CustomerForm::new(MessageResolver::new(MessageCatalog::customer_defaults()))
        .expect("form builds")
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn a_burst_of_edits_yields_one_message_for_the_final_value() {
    let mut form = form();
    let email = form.controls().email;
    let t0 = Instant::now();

    form.type_into(email, Value::text("j")).unwrap();
    assert_eq!(form.pump(t0), 0);
    form.type_into(email, Value::text("ja")).unwrap();
    assert_eq!(form.pump(t0 + ms(300)), 0);
    form.type_into(email, Value::text("still-not-an-email")).unwrap();
    assert_eq!(form.pump(t0 + ms(600)), 0);

    // quiet period restarts with every edit: last edit at 600, window 1000
    assert_eq!(form.email_message(), "");
    assert_eq!(form.pump(t0 + ms(1599)), 0);
    assert_eq!(form.pump(t0 + ms(1600)), 1);
    assert_eq!(form.email_message(), "Please enter a valid email address.");

    // the timer is disarmed after firing
    assert_eq!(form.pump(t0 + ms(5000)), 0);
}

#[test]
fn fixing_the_value_clears_the_message_on_the_next_fire() {
    let mut form = form();
    let email = form.controls().email;
    let t0 = Instant::now();

    form.type_into(email, Value::text("bad")).unwrap();
    form.pump(t0);
    assert_eq!(form.pump(t0 + ms(1000)), 1);
    assert_eq!(form.email_message(), "Please enter a valid email address.");

    form.type_into(email, Value::text("fine@example.com")).unwrap();
    form.pump(t0 + ms(1200));
    assert_eq!(form.pump(t0 + ms(2200)), 1);
    assert_eq!(form.email_message(), "");
}

#[test]
fn email_and_confirmation_timers_run_independently() {
    let mut form = form();
    let c = *form.controls();
    let t0 = Instant::now();

    // equal values keep the pair's match verdict out of the way
    form.type_into(c.email, Value::text("not-an-email")).unwrap();
    form.pump(t0);
    form.type_into(c.confirm_email, Value::text("not-an-email")).unwrap();
    form.pump(t0 + ms(400));

    assert_eq!(form.pump(t0 + ms(1000)), 1);
    assert_eq!(form.email_message(), "Please enter a valid email address.");
    assert_eq!(form.confirm_email_message(), "");

    assert_eq!(form.pump(t0 + ms(1400)), 1);
    assert_eq!(
        form.confirm_email_message(),
        "Please enter a valid email address."
    );
}

#[test]
fn teardown_cancels_pending_timers_without_firing() {
    let mut form = form();
    let email = form.controls().email;
    let t0 = Instant::now();

    form.type_into(email, Value::text("bad")).unwrap();
    form.pump(t0);
    form.teardown();

    assert_eq!(form.pump(t0 + ms(2000)), 0);
    assert_eq!(form.email_message(), "");
}
