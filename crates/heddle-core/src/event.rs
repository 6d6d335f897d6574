//! Synthetic events: one envelope shape regardless of backend.
//!
//! A [`SyntheticEvent`] wraps whatever the backend produced from the raw
//! native event. It is created once per native delivery and dropped when the
//! dispatch loop returns. When a special event forwards an event that is
//! already synthetic, the same envelope is reused and only its type changes.

use std::cell::{Cell, RefCell};
use std::fmt;

use smol_str::SmolStr;

/// Native input signal.
pub const INPUT: &str = "input";
/// Native change signal.
pub const CHANGE: &str = "change";
/// Native click signal.
pub const CLICK: &str = "click";
/// IME composition began.
pub const COMPOSITION_START: &str = "compositionstart";
/// IME composition committed.
pub const COMPOSITION_END: &str = "compositionend";
/// Legacy engines report value edits through this signal.
pub const PROPERTY_CHANGE: &str = "propertychange";
/// Composition-guarded input, built from the three signals above.
pub const MODEL: &str = "model";

/// The part of a normalized native event the core relies on.
///
/// Backends decide what default prevention and propagation stopping mean.
/// A standard engine calls the native methods; a legacy engine writes its
/// non-standard fields instead.
pub trait NativeEvent: 'static {
    /// The native type name, e.g. `"click"`.
    fn event_type(&self) -> SmolStr;

    /// Cancel the host's default action.
    fn prevent_default(&self);

    /// Stop the event from reaching further native listeners.
    fn stop_propagation(&self);
}

/// Normalized envelope handed to every logical listener.
pub struct SyntheticEvent<E> {
    event_type: RefCell<SmolStr>,
    original: E,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl<E: NativeEvent> SyntheticEvent<E> {
    /// Wrap a normalized event, keeping its native type.
    pub fn new(original: E) -> Self {
        let event_type = original.event_type();
        Self::with_type(event_type, original)
    }

    /// Wrap a normalized event under a different logical type.
    pub fn with_type(event_type: impl Into<SmolStr>, original: E) -> Self {
        Self {
            event_type: RefCell::new(event_type.into()),
            original,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// The logical type listeners subscribed under.
    pub fn event_type(&self) -> SmolStr {
        self.event_type.borrow().clone()
    }

    /// Retype the envelope. Used when a special event renames a raw signal.
    pub fn set_event_type(&self, event_type: &str) {
        let mut current = self.event_type.borrow_mut();
        if current.as_str() != event_type {
            *current = SmolStr::from(event_type);
        }
    }

    /// The normalized native event this envelope was built from.
    pub fn original_event(&self) -> &E {
        &self.original
    }

    pub fn prevent_default(&self) {
        if !self.default_prevented.replace(true) {
            self.original.prevent_default();
        }
    }

    pub fn stop_propagation(&self) {
        if !self.propagation_stopped.replace(true) {
            self.original.stop_propagation();
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl<E: fmt::Debug> fmt::Debug for SyntheticEvent<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticEvent")
            .field("event_type", &*self.event_type.borrow())
            .field("original", &self.original)
            .field("default_prevented", &self.default_prevented.get())
            .field("propagation_stopped", &self.propagation_stopped.get())
            .finish()
    }
}

/// What a native listener receives.
///
/// Hosts deliver raw events. Special events and legacy reroutes forward
/// envelopes they already built.
pub enum Incoming<'a, R, E> {
    Native(&'a R),
    Synthetic(&'a SyntheticEvent<E>),
}

impl<R, E> Clone for Incoming<'_, R, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, E> Copy for Incoming<'_, R, E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        kind: &'static str,
        prevented: Cell<u32>,
        stopped: Cell<u32>,
    }

    impl NativeEvent for Probe {
        fn event_type(&self) -> SmolStr {
            SmolStr::new_static(self.kind)
        }

        fn prevent_default(&self) {
            self.prevented.set(self.prevented.get() + 1);
        }

        fn stop_propagation(&self) {
            self.stopped.set(self.stopped.get() + 1);
        }
    }

    #[test]
    fn test_new_keeps_native_type() {
        let event = SyntheticEvent::new(Probe {
            kind: "click",
            ..Default::default()
        });
        assert_eq!(event.event_type(), "click");
        assert_eq!(event.original_event().event_type(), "click");
    }

    #[test]
    fn test_retype_leaves_original_alone() {
        let event = SyntheticEvent::new(Probe {
            kind: "input",
            ..Default::default()
        });
        event.set_event_type(MODEL);
        assert_eq!(event.event_type(), MODEL);
        assert_eq!(event.original_event().event_type(), "input");
    }

    #[test]
    fn test_prevent_and_stop_reach_original_once() {
        let event = SyntheticEvent::new(Probe::default());
        assert!(!event.is_default_prevented());
        event.prevent_default();
        event.prevent_default();
        event.stop_propagation();
        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
        assert_eq!(event.original_event().prevented.get(), 1);
        assert_eq!(event.original_event().stopped.get(), 1);
    }
}
