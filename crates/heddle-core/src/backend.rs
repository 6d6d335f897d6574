//! The seam between the listener registry and the host platform.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::NativeEvent;
use crate::listener::NativeListener;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity assigned to a node while it has listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh id. Ids are never reused within a process.
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an id a host stored as a plain number.
    pub fn from_raw(raw: u64) -> Self {
        NodeId(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Fan-out callback type for a backend.
pub type FanOut<B> = NativeListener<<B as Backend>::Raw, <B as Backend>::Event>;

/// Event primitives of one host, selected once and injected into the registry.
///
/// Implementations never fail outward: a host error is logged and the call
/// becomes a no-op.
pub trait Backend: 'static {
    /// Handle to something that can carry listeners.
    type Node: Clone + 'static;
    /// Event as the host delivers it.
    type Raw: 'static;
    /// Event after normalization, wrapped by every synthetic event.
    type Event: NativeEvent;

    /// Subscribe `listener` to native `event_type` on `node`.
    fn attach(
        &self,
        node: &Self::Node,
        event_type: &str,
        listener: &NativeListener<Self::Raw, Self::Event>,
    );

    /// Undo exactly what [`Backend::attach`] did for the same arguments.
    fn detach(
        &self,
        node: &Self::Node,
        event_type: &str,
        listener: &NativeListener<Self::Raw, Self::Event>,
    );

    /// Turn a raw delivery on `node` into the normalized event.
    fn normalize(&self, raw: &Self::Raw, node: &Self::Node) -> Self::Event;

    /// Identity currently recorded for `node`, if any.
    ///
    /// Backends keep this in a side table keyed by node identity rather than
    /// on the node itself.
    fn node_id(&self, node: &Self::Node) -> Option<NodeId>;

    fn set_node_id(&self, node: &Self::Node, id: NodeId);

    fn clear_node_id(&self, node: &Self::Node);
}
