//! `addEventListener` backend.

use gloo_events::{EventListener, EventListenerOptions};
use heddle_core::{Backend, FanOut, Incoming, NodeId};
use js_sys::{Object, WeakMap};
use smol_str::SmolStr;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget};

use crate::event::DomEvent;

/// Node ids kept in a `WeakMap`, so a collected node takes its id with it.
pub struct NodeIds {
    map: WeakMap,
}

impl NodeIds {
    pub fn new() -> Self {
        Self { map: WeakMap::new() }
    }

    pub fn get(&self, node: &EventTarget) -> Option<NodeId> {
        self.map
            .get(node.unchecked_ref::<Object>())
            .as_f64()
            .map(|raw| NodeId::from_raw(raw as u64))
    }

    pub fn set(&self, node: &EventTarget, id: NodeId) {
        self.map
            .set(node.unchecked_ref::<Object>(), &JsValue::from_f64(id.get() as f64));
    }

    pub fn clear(&self, node: &EventTarget) {
        self.map.delete(node.unchecked_ref::<Object>());
    }
}

impl Default for NodeIds {
    fn default() -> Self {
        Self::new()
    }
}

fn guard_slot(event_type: &str) -> SmolStr {
    SmolStr::from(format!("$listener:{event_type}"))
}

/// Guards for one event type, one per target the callback is attached to.
type Guards = Vec<(EventTarget, EventListener)>;

/// Backend for engines with `addEventListener`.
///
/// Each attach creates a [`gloo_events::EventListener`] that is stashed on
/// the fan-out callback it serves, keyed by type and target. Detaching takes
/// the guard out of the stash and drops it, which removes the browser
/// subscription.
#[derive(Default)]
pub struct StandardDom {
    ids: NodeIds,
}

impl StandardDom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for StandardDom {
    type Node = EventTarget;
    type Raw = Event;
    type Event = DomEvent;

    fn attach(&self, node: &EventTarget, event_type: &str, listener: &FanOut<Self>) {
        let target = listener.downgrade();
        // Not passive: listeners may call prevent_default.
        let guard = EventListener::new_with_options(
            node,
            event_type.to_owned(),
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(listener) = target.upgrade() {
                    listener.call(Incoming::Native(event));
                }
            },
        );
        let slot = guard_slot(event_type);
        let mut guards = listener.take::<Guards>(&slot).unwrap_or_default();
        guards.push((node.clone(), guard));
        listener.stash(slot, guards);
    }

    fn detach(&self, node: &EventTarget, event_type: &str, listener: &FanOut<Self>) {
        let slot = guard_slot(event_type);
        let mut guards = listener.take::<Guards>(&slot).unwrap_or_default();
        match guards.iter().position(|(target, _)| target == node) {
            Some(index) => drop(guards.remove(index)),
            None => {
                if cfg!(feature = "dev") {
                    tracing::debug!(event_type, "detach of a listener that is not attached");
                }
            }
        }
        if !guards.is_empty() {
            listener.stash(slot, guards);
        }
    }

    fn normalize(&self, raw: &Event, _node: &EventTarget) -> DomEvent {
        DomEvent::Standard(raw.clone())
    }

    fn node_id(&self, node: &EventTarget) -> Option<NodeId> {
        self.ids.get(node)
    }

    fn set_node_id(&self, node: &EventTarget, id: NodeId) {
        self.ids.set(node, id)
    }

    fn clear_node_id(&self, node: &EventTarget) {
        self.ids.clear(node)
    }
}
