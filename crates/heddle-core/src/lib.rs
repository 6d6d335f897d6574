//! heddle-core: event delegation for DOM adaptation, without a DOM.
//!
//! This crate provides:
//! - `Events<B>` - the listener registry: one native subscription per
//!   (node, type), fanned out to logical listeners as `SyntheticEvent`s
//! - `Backend` trait - the host's attach/detach/normalize primitives
//! - `SpecialEvent` trait and the built-in `model` event (IME-safe input)
//! - `Legacy<H>` - a backend for `attachEvent`-only engines
//! - `Capabilities` - per-capability probing, plus `className` helpers
//! - `memory` - an in-memory host for running all of the above in tests

pub mod backend;
pub mod capability;
pub mod error;
pub mod event;
pub mod legacy;
pub mod listener;
pub mod memory;
pub mod registry;
pub mod special;

pub use backend::{Backend, FanOut, NodeId};
pub use capability::{
    Capabilities, ClassApi, EventApi, Probe, SelectorApi, TextApi, add_class_name, id_selector,
    remove_class_name,
};
pub use error::DomError;
pub use event::{
    CHANGE, CLICK, COMPOSITION_END, COMPOSITION_START, INPUT, Incoming, MODEL, NativeEvent,
    PROPERTY_CHANGE, SyntheticEvent,
};
pub use legacy::{Legacy, LegacyHost};
pub use listener::{Listener, NativeListener, WeakNativeListener};
pub use registry::Events;
pub use smol_str::SmolStr;
pub use special::{ModelEvent, SpecialEvent, SpecialHooks};
