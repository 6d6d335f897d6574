//! In-memory host for running the event core without a browser.
//!
//! [`MemoryHost`] implements both [`Backend`] (a standard engine) and
//! [`LegacyHost`] (an `attachEvent` engine, to be wrapped in
//! [`Legacy`](crate::legacy::Legacy)). Nodes record what is subscribed to
//! them and [`MemoryNode::fire`] plays the part of the engine delivering an
//! event. Nothing here models a tree; events do not propagate.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::backend::{Backend, NodeId};
use crate::error::{DomError, usage_fault};
use crate::event::{Incoming, NativeEvent, PROPERTY_CHANGE};
use crate::legacy::LegacyHost;
use crate::listener::NativeListener;

type MemoryListener = NativeListener<MemoryEvent, MemoryEvent>;

/// Host whose nodes live in memory.
#[derive(Default)]
pub struct MemoryHost {
    legacy: bool,
    next_key: Cell<usize>,
    ids: RefCell<HashMap<usize, NodeId>>,
}

impl MemoryHost {
    /// Standard engine: handlers are keyed by bare type names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Legacy engine: handlers are keyed by `on<type>` and events arrive
    /// without `target`/`currentTarget`.
    pub fn legacy() -> Self {
        Self {
            legacy: true,
            ..Self::default()
        }
    }

    pub fn element(&self, tag: &str) -> MemoryNode {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        MemoryNode {
            data: Rc::new(NodeData {
                key,
                tag: SmolStr::from(tag.to_ascii_lowercase()),
                legacy: self.legacy,
                input_type: RefCell::new(None),
                subscriptions: RefCell::new(Vec::new()),
                attach_count: Cell::new(0),
            }),
        }
    }

    pub fn node_id(&self, node: &MemoryNode) -> Option<NodeId> {
        self.ids.borrow().get(&node.data.key).copied()
    }

    pub fn set_node_id(&self, node: &MemoryNode, id: NodeId) {
        self.ids.borrow_mut().insert(node.data.key, id);
    }

    pub fn clear_node_id(&self, node: &MemoryNode) {
        self.ids.borrow_mut().remove(&node.data.key);
    }
}

struct NodeData {
    key: usize,
    tag: SmolStr,
    legacy: bool,
    input_type: RefCell<Option<SmolStr>>,
    subscriptions: RefCell<Vec<(SmolStr, MemoryListener)>>,
    attach_count: Cell<usize>,
}

/// Handle to a node created by [`MemoryHost::element`].
#[derive(Clone)]
pub struct MemoryNode {
    data: Rc<NodeData>,
}

impl MemoryNode {
    pub fn tag(&self) -> &str {
        &self.data.tag
    }

    pub fn set_input_type(&self, input_type: &str) {
        *self.data.input_type.borrow_mut() = Some(SmolStr::from(input_type));
    }

    pub fn input_type(&self) -> Option<SmolStr> {
        self.data.input_type.borrow().clone()
    }

    pub fn same(&self, other: &MemoryNode) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Native subscriptions under one handler name.
    pub fn subscriptions(&self, name: &str) -> usize {
        self.data
            .subscriptions
            .borrow()
            .iter()
            .filter(|(n, _)| n == name)
            .count()
    }

    pub fn total_subscriptions(&self) -> usize {
        self.data.subscriptions.borrow().len()
    }

    /// Subscriptions ever made, including removed ones.
    pub fn attach_count(&self) -> usize {
        self.data.attach_count.get()
    }

    /// Deliver `event` to whatever is subscribed for its type.
    pub fn fire(&self, event: MemoryEvent) {
        let event_type = event.data.event_type.clone();
        let name = if self.data.legacy {
            SmolStr::from(format!("on{event_type}"))
        } else {
            event.data.current_target.replace(Some(self.clone()));
            if event.data.src_element.borrow().is_none() {
                event.data.src_element.replace(Some(self.clone()));
            }
            event_type
        };

        let listeners: Vec<MemoryListener> = self
            .data
            .subscriptions
            .borrow()
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in &listeners {
            listener.call(Incoming::Native(&event));
        }
    }

    fn subscribe(&self, name: &str, listener: &MemoryListener) {
        self.data
            .subscriptions
            .borrow_mut()
            .push((SmolStr::from(name), listener.clone()));
        self.data.attach_count.set(self.data.attach_count.get() + 1);
    }

    fn unsubscribe(&self, name: &str, listener: &MemoryListener) {
        let mut subscriptions = self.data.subscriptions.borrow_mut();
        match subscriptions
            .iter()
            .position(|(n, l)| n == name && l.same(listener))
        {
            Some(index) => {
                subscriptions.remove(index);
            }
            None => usage_fault!(handler = name, "unsubscribe of a listener that is not attached"),
        }
    }
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} #{}>", self.data.tag, self.data.key)
    }
}

struct EventData {
    event_type: SmolStr,
    property_name: Option<SmolStr>,
    src_element: RefCell<Option<MemoryNode>>,
    current_target: RefCell<Option<MemoryNode>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    return_value: Cell<Option<bool>>,
    cancel_bubble: Cell<bool>,
}

#[derive(Clone)]
enum View {
    Standard,
    Legacy {
        target: MemoryNode,
        current_target: MemoryNode,
    },
}

/// An event delivered by the in-memory host.
///
/// Clones share state, so a test can keep the raw event it fired and inspect
/// what listeners did to it.
#[derive(Clone)]
pub struct MemoryEvent {
    data: Rc<EventData>,
    view: View,
}

impl MemoryEvent {
    pub fn new(event_type: &str) -> Self {
        Self::build(event_type, None)
    }

    /// A legacy `propertychange` delivery for `property`.
    pub fn property_change(property: &str) -> Self {
        Self::build(PROPERTY_CHANGE, Some(SmolStr::from(property)))
    }

    fn build(event_type: &str, property_name: Option<SmolStr>) -> Self {
        Self {
            data: Rc::new(EventData {
                event_type: SmolStr::from(event_type),
                property_name,
                src_element: RefCell::new(None),
                current_target: RefCell::new(None),
                default_prevented: Cell::new(false),
                propagation_stopped: Cell::new(false),
                return_value: Cell::new(None),
                cancel_bubble: Cell::new(false),
            }),
            view: View::Standard,
        }
    }

    /// Set the legacy `srcElement` (the standard `target`).
    pub fn with_src_element(self, node: &MemoryNode) -> Self {
        self.data.src_element.replace(Some(node.clone()));
        self
    }

    pub fn property_name(&self) -> Option<SmolStr> {
        self.data.property_name.clone()
    }

    pub fn target(&self) -> Option<MemoryNode> {
        match &self.view {
            View::Standard => self.data.src_element.borrow().clone(),
            View::Legacy { target, .. } => Some(target.clone()),
        }
    }

    pub fn current_target(&self) -> Option<MemoryNode> {
        match &self.view {
            View::Standard => self.data.current_target.borrow().clone(),
            View::Legacy { current_target, .. } => Some(current_target.clone()),
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.data.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.data.propagation_stopped.get()
    }

    /// Legacy `returnValue`.
    pub fn return_value(&self) -> Option<bool> {
        self.data.return_value.get()
    }

    /// Legacy `cancelBubble`.
    pub fn cancel_bubble(&self) -> bool {
        self.data.cancel_bubble.get()
    }
}

impl NativeEvent for MemoryEvent {
    fn event_type(&self) -> SmolStr {
        self.data.event_type.clone()
    }

    fn prevent_default(&self) {
        match self.view {
            View::Standard => self.data.default_prevented.set(true),
            View::Legacy { .. } => self.data.return_value.set(Some(false)),
        }
    }

    fn stop_propagation(&self) {
        match self.view {
            View::Standard => self.data.propagation_stopped.set(true),
            View::Legacy { .. } => self.data.cancel_bubble.set(true),
        }
    }
}

impl fmt::Debug for MemoryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEvent")
            .field("event_type", &self.data.event_type)
            .field("property_name", &self.data.property_name)
            .field("legacy", &matches!(self.view, View::Legacy { .. }))
            .finish()
    }
}

impl Backend for MemoryHost {
    type Node = MemoryNode;
    type Raw = MemoryEvent;
    type Event = MemoryEvent;

    fn attach(&self, node: &MemoryNode, event_type: &str, listener: &MemoryListener) {
        node.subscribe(event_type, listener);
    }

    fn detach(&self, node: &MemoryNode, event_type: &str, listener: &MemoryListener) {
        node.unsubscribe(event_type, listener);
    }

    fn normalize(&self, raw: &MemoryEvent, _node: &MemoryNode) -> MemoryEvent {
        raw.clone()
    }

    fn node_id(&self, node: &MemoryNode) -> Option<NodeId> {
        MemoryHost::node_id(self, node)
    }

    fn set_node_id(&self, node: &MemoryNode, id: NodeId) {
        MemoryHost::set_node_id(self, node, id)
    }

    fn clear_node_id(&self, node: &MemoryNode) {
        MemoryHost::clear_node_id(self, node)
    }
}

impl LegacyHost for MemoryHost {
    type Node = MemoryNode;
    type Raw = MemoryEvent;
    type Event = MemoryEvent;

    fn attach_event(
        &self,
        node: &MemoryNode,
        handler: &str,
        listener: &MemoryListener,
    ) -> Result<(), DomError> {
        node.subscribe(handler, listener);
        Ok(())
    }

    fn detach_event(
        &self,
        node: &MemoryNode,
        handler: &str,
        listener: &MemoryListener,
    ) -> Result<(), DomError> {
        node.unsubscribe(handler, listener);
        Ok(())
    }

    fn is_box_element(&self, node: &MemoryNode) -> bool {
        node.tag() == "input"
            && matches!(node.input_type().as_deref(), Some("checkbox") | Some("radio"))
    }

    fn property_name(&self, raw: &MemoryEvent) -> Option<SmolStr> {
        raw.property_name()
    }

    fn wrap_event(&self, raw: &MemoryEvent, node: &MemoryNode) -> MemoryEvent {
        let target = raw
            .data
            .src_element
            .borrow()
            .clone()
            .unwrap_or_else(|| node.clone());
        MemoryEvent {
            data: raw.data.clone(),
            view: View::Legacy {
                target,
                current_target: node.clone(),
            },
        }
    }

    fn node_id(&self, node: &MemoryNode) -> Option<NodeId> {
        MemoryHost::node_id(self, node)
    }

    fn set_node_id(&self, node: &MemoryNode, id: NodeId) {
        MemoryHost::set_node_id(self, node, id)
    }

    fn clear_node_id(&self, node: &MemoryNode) {
        MemoryHost::clear_node_id(self, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_reaches_only_matching_handlers() {
        let host = MemoryHost::new();
        let node = host.element("DIV");
        assert_eq!(node.tag(), "div");

        let hits = Rc::new(Cell::new(0));
        let listener = {
            let hits = hits.clone();
            MemoryListener::new(move |_| hits.set(hits.get() + 1))
        };
        Backend::attach(&host, &node, "click", &listener);
        node.fire(MemoryEvent::new("keydown"));
        node.fire(MemoryEvent::new("click"));
        assert_eq!(hits.get(), 1);

        Backend::detach(&host, &node, "click", &listener);
        node.fire(MemoryEvent::new("click"));
        assert_eq!(hits.get(), 1);
        assert_eq!(node.attach_count(), 1);
    }

    #[test]
    fn test_standard_fire_fills_targets() {
        let host = MemoryHost::new();
        let node = host.element("div");
        let event = MemoryEvent::new("click");
        node.fire(event.clone());
        assert!(event.target().is_some_and(|t| t.same(&node)));
        assert!(event.current_target().is_some_and(|t| t.same(&node)));
    }

    #[test]
    fn test_legacy_fire_leaves_targets_empty() {
        let host = MemoryHost::legacy();
        let node = host.element("div");
        let event = MemoryEvent::new("click");
        node.fire(event.clone());
        assert!(event.target().is_none());
        assert!(event.current_target().is_none());
    }

    #[test]
    fn test_box_elements() {
        let host = MemoryHost::legacy();
        let input = host.element("input");
        assert!(!host.is_box_element(&input));
        input.set_input_type("radio");
        assert!(host.is_box_element(&input));
        let div = host.element("div");
        div.set_input_type("checkbox");
        assert!(!host.is_box_element(&div));
    }

    #[test]
    fn test_identity_side_table() {
        let host = MemoryHost::new();
        let node = host.element("div");
        assert_eq!(host.node_id(&node), None);
        let id = NodeId::next();
        host.set_node_id(&node, id);
        assert_eq!(host.node_id(&node.clone()), Some(id));
        host.clear_node_id(&node);
        assert_eq!(host.node_id(&node), None);
    }
}
