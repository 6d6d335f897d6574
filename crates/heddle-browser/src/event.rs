//! The normalized event every browser backend hands to listeners.

use heddle_core::NativeEvent;
use smol_str::SmolStr;
use web_sys::{Event, EventTarget};

#[cfg(feature = "legacy")]
use crate::legacy::LegacyEvent;

/// A browser event after backend normalization.
#[derive(Debug, Clone)]
pub enum DomEvent {
    /// Delivered by `addEventListener`; passed through untouched.
    Standard(Event),
    /// Delivered by `attachEvent`; targets filled in by the backend.
    #[cfg(feature = "legacy")]
    Legacy(LegacyEvent),
}

impl DomEvent {
    /// The event object the engine delivered.
    pub fn raw(&self) -> &Event {
        match self {
            DomEvent::Standard(event) => event,
            #[cfg(feature = "legacy")]
            DomEvent::Legacy(event) => event.raw(),
        }
    }

    pub fn target(&self) -> Option<EventTarget> {
        match self {
            DomEvent::Standard(event) => event.target(),
            #[cfg(feature = "legacy")]
            DomEvent::Legacy(event) => event.target(),
        }
    }

    pub fn current_target(&self) -> Option<EventTarget> {
        match self {
            DomEvent::Standard(event) => event.current_target(),
            #[cfg(feature = "legacy")]
            DomEvent::Legacy(event) => Some(event.current_target().clone()),
        }
    }
}

impl NativeEvent for DomEvent {
    fn event_type(&self) -> SmolStr {
        match self {
            DomEvent::Standard(event) => SmolStr::from(event.type_()),
            #[cfg(feature = "legacy")]
            DomEvent::Legacy(event) => event.event_type().clone(),
        }
    }

    fn prevent_default(&self) {
        match self {
            DomEvent::Standard(event) => event.prevent_default(),
            #[cfg(feature = "legacy")]
            DomEvent::Legacy(event) => event.prevent_default(),
        }
    }

    fn stop_propagation(&self) {
        match self {
            DomEvent::Standard(event) => event.stop_propagation(),
            #[cfg(feature = "legacy")]
            DomEvent::Legacy(event) => event.stop_propagation(),
        }
    }
}
