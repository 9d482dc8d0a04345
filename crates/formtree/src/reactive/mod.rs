//! Debounced subscriptions over engine events.
//!
//! Scheduling is single-threaded, cooperative, and event-driven: there are
//! no background threads and no ambient clock. The host drives everything —
//! it drains the engine's outbox into [`Subscriptions::observe`] and then
//! calls [`Subscriptions::poll`] with the current time. Timers are plain
//! deadlines, so cancelled subscriptions release them by simply being
//! removed, and teardown cannot leak a callback.
//!
//! Debounce contract: an event on a subscribed key re-arms that key's
//! deadline to `now + window`; only the last event within a quiet period
//! fires the callback. Independent keys keep independent deadlines. No
//! ordering is guaranteed between two keys firing in the same poll beyond
//! the order their deadlines expired.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::engine::{ControlEvent, EventClass, ValidationEngine};
use crate::model::ControlId;

/// Callback invoked when a debounce window closes.
///
/// The engine reference is read-only on purpose: message derivation reads
/// control state, it never mutates the tree. Conditional validator swaps
/// are the host's job, outside the subscriber path.
pub type SubscriberFn = Box<dyn FnMut(&ValidationEngine, ControlId)>;

struct Subscription {
    window: Duration,
    deadline: Option<Instant>,
    callback: SubscriberFn,
}

/// Registry mapping `(control, event class)` to a debounced callback.
#[derive(Default)]
pub struct Subscriptions {
    entries: HashMap<(ControlId, EventClass), Subscription>,
}

impl Subscriptions {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for a control's event class with the given
    /// debounce window. A zero window fires on the next poll after any
    /// event. Re-subscribing a key replaces the previous entry and drops
    /// its pending timer.
    pub fn subscribe(
        &mut self,
        control: ControlId,
        class: EventClass,
        window: Duration,
        callback: SubscriberFn,
    ) {
        self.entries.insert(
            (control, class),
            Subscription {
                window,
                deadline: None,
                callback,
            },
        );
    }

    /// Removes one subscription; its pending timer (if any) is released
    /// with no callback firing. Returns whether an entry was removed.
    pub fn unsubscribe(&mut self, control: ControlId, class: EventClass) -> bool {
        self.entries.remove(&(control, class)).is_some()
    }

    /// Removes every subscription of a control, across event classes.
    pub fn unsubscribe_control(&mut self, control: ControlId) {
        self.entries.retain(|(id, _), _| *id != control);
    }

    /// Number of registered subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no subscriptions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of subscriptions with a pending (armed) timer.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries
            .values()
            .filter(|s| s.deadline.is_some())
            .count()
    }

    /// Feeds one engine event into the registry. A subscribed key re-arms
    /// its deadline to `now + window` (cancel-and-reschedule); events for
    /// unsubscribed keys are ignored.
    pub fn observe(&mut self, event: &ControlEvent, now: Instant) {
        if let Some(sub) = self.entries.get_mut(&(event.control, event.class)) {
            sub.deadline = Some(now + sub.window);
        }
    }

    /// Fires every callback whose deadline has passed, clearing the
    /// deadline first so each quiet period fires at most once. Callbacks
    /// run in deadline order; returns the keys that fired.
    pub fn poll(
        &mut self,
        now: Instant,
        engine: &ValidationEngine,
    ) -> SmallVec<[(ControlId, EventClass); 4]> {
        let mut due: SmallVec<[(Instant, ControlId, EventClass); 4]> = self
            .entries
            .iter()
            .filter_map(|(&(control, class), sub)| {
                sub.deadline
                    .filter(|&d| d <= now)
                    .map(|d| (d, control, class))
            })
            .collect();
        due.sort_unstable_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

        let mut fired = SmallVec::new();
        for (_, control, class) in due {
            if let Some(sub) = self.entries.get_mut(&(control, class)) {
                sub.deadline = None;
                (sub.callback)(engine, control);
                fired.push((control, class));
            }
        }
        fired
    }
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("entries", &self.entries.len())
            .field("pending", &self.pending())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
