//! Listener registry and the public event API.
//!
//! Every (node, type) pair with logical listeners owns exactly one fan-out
//! callback subscribed to the host. The fan-out wraps each native delivery in
//! a synthetic event and replays it to a snapshot of the logical listeners.
//!
//! No registry borrow is held while host code or listeners run, so listeners
//! may call [`Events::on`] and [`Events::off`] from inside a dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use smol_str::SmolStr;

use crate::backend::{Backend, FanOut, NodeId};
use crate::error::usage_fault;
use crate::event::{Incoming, MODEL, SyntheticEvent};
use crate::listener::{Listener, NativeListener};
use crate::special::{ModelEvent, SpecialEvent};

/// Per-node rows, reclaimed together once `refs` reaches zero.
struct NodeRows<B: Backend> {
    native: HashMap<SmolStr, FanOut<B>>,
    custom: HashMap<SmolStr, Vec<Listener<B::Event>>>,
    refs: usize,
}

impl<B: Backend> Default for NodeRows<B> {
    fn default() -> Self {
        Self {
            native: HashMap::new(),
            custom: HashMap::new(),
            refs: 0,
        }
    }
}

struct Inner<B: Backend> {
    backend: B,
    nodes: RefCell<HashMap<NodeId, NodeRows<B>>>,
    specials: RefCell<HashMap<SmolStr, Rc<dyn SpecialEvent<B>>>>,
}

/// Event delegation over one backend.
///
/// Cloning yields another handle to the same registry.
pub struct Events<B: Backend> {
    inner: Rc<Inner<B>>,
}

impl<B: Backend> Clone for Events<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: Backend> Events<B> {
    /// Registry with the built-in `model` special event installed.
    pub fn new(backend: B) -> Self {
        let events = Self::bare(backend);
        events.install(MODEL, Rc::new(ModelEvent));
        events
    }

    /// Registry with an empty special event table.
    pub fn bare(backend: B) -> Self {
        Self {
            inner: Rc::new(Inner {
                backend,
                nodes: RefCell::new(HashMap::new()),
                specials: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Fire `listener` on every logical `event_type` event seen on `node`.
    ///
    /// Registering the same listener twice makes it fire twice.
    pub fn on(&self, node: &B::Node, event_type: &str, listener: &Listener<B::Event>) {
        let backend = &self.inner.backend;
        let id = match backend.node_id(node) {
            Some(id) => id,
            None => {
                let id = NodeId::next();
                backend.set_node_id(node, id);
                id
            }
        };

        let fresh = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let rows = nodes.entry(id).or_default();
            let fresh = if rows.native.contains_key(event_type) {
                None
            } else {
                let fan_out = fan_out(Rc::downgrade(&self.inner), id, node, event_type);
                rows.native.insert(SmolStr::from(event_type), fan_out.clone());
                rows.refs += 1;
                Some(fan_out)
            };
            rows.custom
                .entry(SmolStr::from(event_type))
                .or_default()
                .push(listener.clone());
            fresh
        };

        if let Some(fan_out) = fresh {
            tracing::trace!(node = id.get(), event_type, "subscribing fan-out");
            match self.special_event(event_type) {
                Some(special) => special.on(self, node, &fan_out),
                None => backend.attach(node, event_type, &fan_out),
            }
        }
    }

    /// Remove the first registration of `listener` for `event_type` on `node`.
    ///
    /// Unknown nodes, types and listeners are silently ignored.
    pub fn off(&self, node: &B::Node, event_type: &str, listener: &Listener<B::Event>) {
        let backend = &self.inner.backend;
        let Some(id) = backend.node_id(node) else {
            usage_fault!(event_type, "off() on a node without listeners");
            return;
        };

        let released = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let Some(rows) = nodes.get_mut(&id) else {
                usage_fault!(node = id.get(), event_type, "off() on a node without rows");
                return;
            };
            let Some(list) = rows.custom.get_mut(event_type) else {
                usage_fault!(node = id.get(), event_type, "off() for a type never subscribed");
                return;
            };
            let Some(index) = list.iter().position(|l| l.same(listener)) else {
                usage_fault!(node = id.get(), event_type, "off() for an unknown listener");
                return;
            };
            list.remove(index);
            if !list.is_empty() {
                return;
            }

            rows.custom.remove(event_type);
            let released = rows.native.remove(event_type);
            if released.is_some() {
                rows.refs = rows.refs.saturating_sub(1);
            }
            if rows.refs == 0 {
                nodes.remove(&id);
                backend.clear_node_id(node);
                tracing::trace!(node = id.get(), "node rows reclaimed");
            }
            released
        };

        if let Some(fan_out) = released {
            tracing::trace!(node = id.get(), event_type, "tearing down fan-out");
            match self.special_event(event_type) {
                Some(special) => special.off(self, node, &fan_out),
                None => backend.detach(node, event_type, &fan_out),
            }
        }
    }

    /// Install hooks for a logical type, replacing any existing entry.
    pub fn add_special_event(&self, event_type: &str, hooks: impl SpecialEvent<B> + 'static) {
        self.install(event_type, Rc::new(hooks));
    }

    fn install(&self, event_type: &str, hooks: Rc<dyn SpecialEvent<B>>) {
        let replaced = self
            .inner
            .specials
            .borrow_mut()
            .insert(SmolStr::from(event_type), hooks);
        if cfg!(feature = "dev") {
            if replaced.is_some() {
                tracing::warn!(event_type, "special event already existed, replaced");
            }
            tracing::info!(event_type, "special event added");
        }
    }

    pub fn special_event(&self, event_type: &str) -> Option<Rc<dyn SpecialEvent<B>>> {
        self.inner.specials.borrow().get(event_type).cloned()
    }

    /// Installed special event types, sorted.
    pub fn special_events(&self) -> Vec<SmolStr> {
        let mut types: Vec<SmolStr> = self.inner.specials.borrow().keys().cloned().collect();
        types.sort();
        types
    }

    /// Logical listeners currently registered for (node, type).
    pub fn listener_count(&self, node: &B::Node, event_type: &str) -> usize {
        self.rows(node, |rows| rows.custom.get(event_type).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Whether a fan-out is subscribed for (node, type).
    pub fn is_subscribed(&self, node: &B::Node, event_type: &str) -> bool {
        self.rows(node, |rows| rows.native.contains_key(event_type))
            .unwrap_or(false)
    }

    /// Number of nodes holding registry rows.
    pub fn tracked_nodes(&self) -> usize {
        self.inner.nodes.borrow().len()
    }

    fn rows<T>(&self, node: &B::Node, f: impl FnOnce(&NodeRows<B>) -> T) -> Option<T> {
        let id = self.inner.backend.node_id(node)?;
        self.inner.nodes.borrow().get(&id).map(f)
    }
}

impl<B: Backend> Inner<B> {
    fn snapshot(&self, id: NodeId, event_type: &str) -> Vec<Listener<B::Event>> {
        self.nodes
            .borrow()
            .get(&id)
            .and_then(|rows| rows.custom.get(event_type))
            .cloned()
            .unwrap_or_default()
    }
}

fn fan_out<B: Backend>(
    registry: Weak<Inner<B>>,
    id: NodeId,
    node: &B::Node,
    event_type: &str,
) -> FanOut<B> {
    let node = node.clone();
    let event_type = SmolStr::from(event_type);
    NativeListener::new(move |incoming: Incoming<'_, B::Raw, B::Event>| {
        let Some(inner) = registry.upgrade() else {
            return;
        };
        let built;
        let event = match incoming {
            Incoming::Synthetic(event) => event,
            Incoming::Native(raw) => {
                built = SyntheticEvent::new(inner.backend.normalize(raw, &node));
                &built
            }
        };
        event.set_event_type(&event_type);

        let listeners = inner.snapshot(id, &event_type);
        tracing::trace!(
            node = id.get(),
            event_type = %event_type,
            listeners = listeners.len(),
            "dispatch"
        );
        for listener in &listeners {
            listener.call(event);
        }
    })
}
