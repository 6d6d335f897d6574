//! Backend selection for the current page.

use heddle_core::{Backend, Capabilities, EventApi, FanOut, NodeId};
use web_sys::{Event, EventTarget};

use crate::event::DomEvent;
use crate::standard::StandardDom;

#[cfg(feature = "legacy")]
use crate::legacy::AttachEventDom;
#[cfg(feature = "legacy")]
use heddle_core::Legacy;
#[cfg(feature = "legacy")]
use std::rc::Rc;

/// The event backend the registry runs on, chosen once from capabilities.
pub enum WebBackend {
    Standard(StandardDom),
    #[cfg(feature = "legacy")]
    Legacy(Legacy<AttachEventDom>),
}

impl WebBackend {
    pub fn from_capabilities(capabilities: &Capabilities) -> Self {
        match capabilities.events {
            EventApi::Standard => WebBackend::Standard(StandardDom::new()),
            #[cfg(feature = "legacy")]
            EventApi::Legacy => WebBackend::Legacy(Legacy::new(Rc::new(AttachEventDom::new()))),
            #[cfg(not(feature = "legacy"))]
            EventApi::Legacy => {
                tracing::warn!(
                    "engine lacks addEventListener but the `legacy` feature is off, using the standard backend"
                );
                WebBackend::Standard(StandardDom::new())
            }
        }
    }

    #[cfg(feature = "legacy")]
    pub fn is_legacy(&self) -> bool {
        matches!(self, WebBackend::Legacy(_))
    }

    #[cfg(not(feature = "legacy"))]
    pub fn is_legacy(&self) -> bool {
        false
    }
}

impl Backend for WebBackend {
    type Node = EventTarget;
    type Raw = Event;
    type Event = DomEvent;

    fn attach(&self, node: &EventTarget, event_type: &str, listener: &FanOut<Self>) {
        match self {
            WebBackend::Standard(dom) => dom.attach(node, event_type, listener),
            #[cfg(feature = "legacy")]
            WebBackend::Legacy(dom) => dom.attach(node, event_type, listener),
        }
    }

    fn detach(&self, node: &EventTarget, event_type: &str, listener: &FanOut<Self>) {
        match self {
            WebBackend::Standard(dom) => dom.detach(node, event_type, listener),
            #[cfg(feature = "legacy")]
            WebBackend::Legacy(dom) => dom.detach(node, event_type, listener),
        }
    }

    fn normalize(&self, raw: &Event, node: &EventTarget) -> DomEvent {
        match self {
            WebBackend::Standard(dom) => dom.normalize(raw, node),
            #[cfg(feature = "legacy")]
            WebBackend::Legacy(dom) => dom.normalize(raw, node),
        }
    }

    fn node_id(&self, node: &EventTarget) -> Option<NodeId> {
        match self {
            WebBackend::Standard(dom) => dom.node_id(node),
            #[cfg(feature = "legacy")]
            WebBackend::Legacy(dom) => dom.node_id(node),
        }
    }

    fn set_node_id(&self, node: &EventTarget, id: NodeId) {
        match self {
            WebBackend::Standard(dom) => dom.set_node_id(node, id),
            #[cfg(feature = "legacy")]
            WebBackend::Legacy(dom) => dom.set_node_id(node, id),
        }
    }

    fn clear_node_id(&self, node: &EventTarget) {
        match self {
            WebBackend::Standard(dom) => dom.clear_node_id(node),
            #[cfg(feature = "legacy")]
            WebBackend::Legacy(dom) => dom.clear_node_id(node),
        }
    }
}
