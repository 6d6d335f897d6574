//! `attachEvent` host, for engines that predate `addEventListener`.
//!
//! Everything goes through `Reflect` because web-sys has no bindings for
//! these members. The rerouting of `input` and checkbox `change` lives in
//! [`heddle_core::Legacy`]; this module only supplies the primitives.

use heddle_core::{DomError, Incoming, LegacyHost, NativeListener, NodeId};
use js_sys::{Array, Function, Reflect};
use smol_str::SmolStr;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget};

use crate::dom::host_error;
use crate::event::DomEvent;
use crate::standard::NodeIds;

fn closure_slot(handler: &str) -> SmolStr {
    SmolStr::from(format!("$attach:{handler}"))
}

fn get(target: &JsValue, member: &str) -> Result<JsValue, DomError> {
    Reflect::get(target, &JsValue::from_str(member)).map_err(|err| host_error(member, err))
}

fn get_string(target: &JsValue, member: &str) -> Option<String> {
    get(target, member).ok().and_then(|value| value.as_string())
}

/// Call `target[member](...args)`.
fn invoke(target: &JsValue, member: &str, args: &[&JsValue]) -> Result<JsValue, DomError> {
    let function: Function = get(target, member)?
        .dyn_into()
        .map_err(|_| DomError::MissingMember(SmolStr::from(member)))?;
    let args: Array = args.iter().copied().collect();
    Reflect::apply(&function, target, &args).map_err(|err| host_error(member, err))
}

/// `window.event`, where these engines put the current event.
fn window_event() -> JsValue {
    web_sys::window()
        .and_then(|window| Reflect::get(&window, &JsValue::from_str("event")).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

type Handler = Closure<dyn FnMut(JsValue)>;

/// Closures for one handler name, one per node the listener is attached to.
type Handlers = Vec<(EventTarget, Handler)>;

/// [`LegacyHost`] over `attachEvent`/`detachEvent`.
///
/// The JS closure created for a listener is stashed on it per handler name
/// and node, and handed back to `detachEvent` on teardown.
#[derive(Default)]
pub struct AttachEventDom {
    ids: NodeIds,
}

impl AttachEventDom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LegacyHost for AttachEventDom {
    type Node = EventTarget;
    type Raw = Event;
    type Event = DomEvent;

    fn attach_event(
        &self,
        node: &EventTarget,
        handler: &str,
        listener: &NativeListener<Event, DomEvent>,
    ) -> Result<(), DomError> {
        let target = listener.downgrade();
        let closure: Handler = Closure::new(move |event: JsValue| {
            let event = if event.is_undefined() || event.is_null() {
                window_event()
            } else {
                event
            };
            if let Some(listener) = target.upgrade() {
                listener.call(Incoming::Native(event.unchecked_ref::<Event>()));
            }
        });
        invoke(
            node,
            "attachEvent",
            &[&JsValue::from_str(handler), closure.as_ref()],
        )?;
        let slot = closure_slot(handler);
        let mut handlers = listener.take::<Handlers>(&slot).unwrap_or_default();
        handlers.push((node.clone(), closure));
        listener.stash(slot, handlers);
        Ok(())
    }

    fn detach_event(
        &self,
        node: &EventTarget,
        handler: &str,
        listener: &NativeListener<Event, DomEvent>,
    ) -> Result<(), DomError> {
        let slot = closure_slot(handler);
        let mut handlers = listener.take::<Handlers>(&slot).unwrap_or_default();
        let found = handlers.iter().position(|(target, _)| target == node);
        let closure = found.map(|index| handlers.remove(index).1);
        if !handlers.is_empty() {
            listener.stash(slot, handlers);
        }
        let Some(closure) = closure else {
            if cfg!(feature = "dev") {
                tracing::debug!(handler, "detachEvent of a listener that is not attached");
            }
            return Ok(());
        };
        invoke(
            node,
            "detachEvent",
            &[&JsValue::from_str(handler), closure.as_ref()],
        )?;
        Ok(())
    }

    fn is_box_element(&self, node: &EventTarget) -> bool {
        let tag = get_string(node, "tagName").unwrap_or_default();
        if !tag.eq_ignore_ascii_case("input") {
            return false;
        }
        matches!(
            get_string(node, "type").as_deref(),
            Some("checkbox") | Some("radio")
        )
    }

    fn property_name(&self, raw: &Event) -> Option<SmolStr> {
        get_string(raw, "propertyName").map(SmolStr::from)
    }

    fn wrap_event(&self, raw: &Event, node: &EventTarget) -> DomEvent {
        let target = get(raw, "srcElement")
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .map(|value| value.unchecked_into::<EventTarget>())
            .unwrap_or_else(|| node.clone());
        DomEvent::Legacy(LegacyEvent {
            raw: raw.clone(),
            event_type: SmolStr::from(get_string(raw, "type").unwrap_or_default()),
            target,
            current_target: node.clone(),
        })
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

/// An `attachEvent` delivery with standard targets.
#[derive(Debug, Clone)]
pub struct LegacyEvent {
    raw: Event,
    event_type: SmolStr,
    target: EventTarget,
    current_target: EventTarget,
}

impl LegacyEvent {
    pub fn raw(&self) -> &Event {
        &self.raw
    }

    pub fn event_type(&self) -> &SmolStr {
        &self.event_type
    }

    /// `srcElement`, or the node listened on when the engine left it empty.
    pub fn target(&self) -> Option<EventTarget> {
        Some(self.target.clone())
    }

    pub fn current_target(&self) -> &EventTarget {
        &self.current_target
    }

    /// Read any other field of the delivered event.
    pub fn field(&self, name: &str) -> JsValue {
        get(&self.raw, name).unwrap_or(JsValue::UNDEFINED)
    }

    /// `returnValue = false`.
    pub fn prevent_default(&self) {
        let set = Reflect::set(&self.raw, &JsValue::from_str("returnValue"), &JsValue::FALSE);
        if let Err(err) = set {
            tracing::error!(error = %host_error("returnValue", err), "preventDefault failed");
        }
    }

    /// `cancelBubble = true`.
    pub fn stop_propagation(&self) {
        let set = Reflect::set(&self.raw, &JsValue::from_str("cancelBubble"), &JsValue::TRUE);
        if let Err(err) = set {
            tracing::error!(error = %host_error("cancelBubble", err), "stopPropagation failed");
        }
    }
}
