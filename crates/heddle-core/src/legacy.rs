//! Backend adapter for engines that only offer `attachEvent`.
//!
//! Such engines name handlers `on<type>`, do not fire `input`, and fire
//! `change` on checkboxes and radios too late. [`Legacy`] reroutes those two
//! signals and otherwise forwards to the host's attach/detach pair:
//!
//! - `input` is served by `propertychange`, filtered to value edits;
//! - `change` on a checkbox or radio is served by `click`.
//!
//! The internal listener of a reroute is stashed on the listener it serves,
//! keyed by the requested type, so detaching that listener finds the exact
//! subscription to remove.

use std::rc::Rc;

use smol_str::SmolStr;

use crate::backend::{Backend, NodeId};
use crate::error::{DomError, report, usage_fault};
use crate::event::{CHANGE, CLICK, INPUT, Incoming, NativeEvent, PROPERTY_CHANGE, SyntheticEvent};
use crate::listener::NativeListener;

/// Property whose change counts as input.
pub const VALUE_PROPERTY: &str = "value";

fn reroute_slot(event_type: &str) -> SmolStr {
    SmolStr::from(format!("$legacy:{event_type}"))
}

/// Primitives of an `attachEvent` engine.
pub trait LegacyHost: 'static {
    type Node: Clone + 'static;
    type Raw: 'static;
    type Event: NativeEvent;

    /// `node.attachEvent(handler, listener)`, with `handler` like `"onclick"`.
    fn attach_event(
        &self,
        node: &Self::Node,
        handler: &str,
        listener: &NativeListener<Self::Raw, Self::Event>,
    ) -> Result<(), DomError>;

    fn detach_event(
        &self,
        node: &Self::Node,
        handler: &str,
        listener: &NativeListener<Self::Raw, Self::Event>,
    ) -> Result<(), DomError>;

    /// Is `node` an `<input>` of type checkbox or radio?
    fn is_box_element(&self, node: &Self::Node) -> bool;

    /// `event.propertyName`, present on `propertychange` deliveries.
    fn property_name(&self, raw: &Self::Raw) -> Option<SmolStr>;

    /// Wrap a raw delivery: copy its fields, fill in `target` and
    /// `currentTarget`, and map prevention and stopping onto `returnValue`
    /// and `cancelBubble`.
    fn wrap_event(&self, raw: &Self::Raw, node: &Self::Node) -> Self::Event;

    fn node_id(&self, node: &Self::Node) -> Option<NodeId>;

    fn set_node_id(&self, node: &Self::Node, id: NodeId);

    fn clear_node_id(&self, node: &Self::Node);
}

enum Route {
    Direct,
    /// Serve the requested type from `via`. `only_value` keeps just
    /// `propertychange` deliveries for the value property.
    Reroute { via: &'static str, only_value: bool },
}

/// [`Backend`] over a [`LegacyHost`].
pub struct Legacy<H> {
    host: Rc<H>,
}

impl<H: LegacyHost> Legacy<H> {
    pub fn new(host: Rc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    fn route(&self, node: &H::Node, event_type: &str) -> Route {
        if event_type == INPUT {
            Route::Reroute {
                via: PROPERTY_CHANGE,
                only_value: true,
            }
        } else if event_type == CHANGE && self.host.is_box_element(node) {
            Route::Reroute {
                via: CLICK,
                only_value: false,
            }
        } else {
            Route::Direct
        }
    }

    /// Listener that filters and retypes `via` deliveries for `target`.
    fn reroute(
        &self,
        node: &H::Node,
        event_type: &str,
        only_value: bool,
        target: &NativeListener<H::Raw, H::Event>,
    ) -> NativeListener<H::Raw, H::Event> {
        let host = self.host.clone();
        let node = node.clone();
        let event_type = SmolStr::from(event_type);
        let target = target.downgrade();
        NativeListener::new(move |incoming: Incoming<'_, H::Raw, H::Event>| {
            let Some(target) = target.upgrade() else {
                return;
            };
            match incoming {
                Incoming::Native(raw) => {
                    if only_value
                        && host.property_name(raw).as_deref() != Some(VALUE_PROPERTY)
                    {
                        return;
                    }
                    let event =
                        SyntheticEvent::with_type(event_type.clone(), host.wrap_event(raw, &node));
                    target.call(Incoming::Synthetic(&event));
                }
                Incoming::Synthetic(event) => {
                    event.set_event_type(&event_type);
                    target.call(incoming);
                }
            }
        })
    }
}

fn handler_name(event_type: &str) -> String {
    format!("on{event_type}")
}

impl<H: LegacyHost> Backend for Legacy<H> {
    type Node = H::Node;
    type Raw = H::Raw;
    type Event = H::Event;

    fn attach(
        &self,
        node: &Self::Node,
        event_type: &str,
        listener: &NativeListener<Self::Raw, Self::Event>,
    ) {
        match self.route(node, event_type) {
            Route::Direct => {
                report(self.host.attach_event(node, &handler_name(event_type), listener))
            }
            Route::Reroute { via, only_value } => {
                let internal = self.reroute(node, event_type, only_value, listener);
                self.attach(node, via, &internal);
                listener.stash(reroute_slot(event_type), internal);
            }
        }
    }

    fn detach(
        &self,
        node: &Self::Node,
        event_type: &str,
        listener: &NativeListener<Self::Raw, Self::Event>,
    ) {
        match self.route(node, event_type) {
            Route::Direct => {
                report(self.host.detach_event(node, &handler_name(event_type), listener))
            }
            Route::Reroute { via, .. } => {
                let slot = reroute_slot(event_type);
                match listener.take::<NativeListener<H::Raw, H::Event>>(&slot) {
                    Some(internal) => self.detach(node, via, &internal),
                    None => usage_fault!(event_type, "detach of a reroute that was never attached"),
                }
            }
        }
    }

    fn normalize(&self, raw: &Self::Raw, node: &Self::Node) -> Self::Event {
        self.host.wrap_event(raw, node)
    }

    fn node_id(&self, node: &Self::Node) -> Option<NodeId> {
        self.host.node_id(node)
    }

    fn set_node_id(&self, node: &Self::Node, id: NodeId) {
        self.host.set_node_id(node, id)
    }

    fn clear_node_id(&self, node: &Self::Node) {
        self.host.clear_node_id(node)
    }
}
