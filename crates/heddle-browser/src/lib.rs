//! Browser backends for the heddle event core.
//!
//! This crate wires `heddle-core` to the DOM. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `capabilities`: one-time feature probe, cached for the page
//! - `standard`: `addEventListener` backend over `gloo-events`
//! - `legacy`: `attachEvent` host (behind the `legacy` feature)
//! - `backend`: `WebBackend`, the variant picked from capabilities
//! - `dom`: element lookup, text and class helpers
//! - `logging`: tracing subscriber for the browser console
//!
//! The free functions [`on`], [`off`] and [`add_special_event`] work on a
//! registry kept per thread, created on first use.
//!
//! # Re-exports
//!
//! This crate re-exports `heddle-core` for convenience, so consumers only
//! need to depend on `heddle-browser`.

// Re-export core crate
pub use heddle_core;
pub use heddle_core::*;

pub mod backend;
pub mod capabilities;
pub mod dom;
pub mod event;
#[cfg(feature = "legacy")]
pub mod legacy;
pub mod logging;
pub mod standard;

pub use backend::WebBackend;
pub use capabilities::{WebProbe, capabilities, install_capabilities};
pub use dom::{add_class, find, remove_class, set_text, text};
pub use event::DomEvent;
#[cfg(feature = "legacy")]
pub use legacy::{AttachEventDom, LegacyEvent};
pub use logging::init_tracing;
pub use standard::{NodeIds, StandardDom};

use web_sys::EventTarget;

/// Listener type accepted by [`on`] and [`off`].
pub type DomListener = Listener<DomEvent>;

/// Event handed to a [`DomListener`].
pub type DomSyntheticEvent = SyntheticEvent<DomEvent>;

thread_local! {
    static EVENTS: Events<WebBackend> =
        Events::new(WebBackend::from_capabilities(capabilities()));
}

/// Run `f` against this thread's registry.
pub fn with_events<T>(f: impl FnOnce(&Events<WebBackend>) -> T) -> T {
    EVENTS.with(f)
}

/// Fire `listener` for every logical `event_type` event on `node`.
pub fn on(node: &EventTarget, event_type: &str, listener: &DomListener) {
    with_events(|events| events.on(node, event_type, listener))
}

/// Remove one registration of `listener`. Unknown registrations are ignored.
pub fn off(node: &EventTarget, event_type: &str, listener: &DomListener) {
    with_events(|events| events.off(node, event_type, listener))
}

/// Install hooks for a logical event type, replacing any existing entry.
pub fn add_special_event(event_type: &str, hooks: impl SpecialEvent<WebBackend> + 'static) {
    with_events(|events| events.add_special_event(event_type, hooks))
}
