//! Capability detection against the live document.
//!
//! Probing runs once, on first use, and the result is cached for the life of
//! the page. A host that knows better can pin a selection first with
//! [`install_capabilities`].

use std::sync::OnceLock;

use heddle_core::{Capabilities, Probe};
use js_sys::Reflect;
use wasm_bindgen::JsValue;

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

/// Get cached capabilities. Detection runs once on first call.
pub fn capabilities() -> &'static Capabilities {
    CAPABILITIES.get_or_init(detect_capabilities)
}

/// Pin the capability selection before anything probes.
///
/// Returns the rejected value if capabilities were already resolved.
pub fn install_capabilities(capabilities: Capabilities) -> Result<(), Capabilities> {
    CAPABILITIES.set(capabilities)?;
    tracing::debug!(?capabilities, "capabilities installed");
    Ok(())
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
fn detect_capabilities() -> Capabilities {
    match WebProbe::new() {
        Some(probe) => Capabilities::detect(&probe),
        None => {
            tracing::warn!("no document to probe, assuming a modern engine");
            Capabilities::MODERN
        }
    }
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
fn detect_capabilities() -> Capabilities {
    Capabilities::MODERN
}

/// Probe over the global document and a scratch `<div>`.
pub struct WebProbe {
    document: JsValue,
    element: JsValue,
}

impl WebProbe {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let element = document.create_element("div").ok()?;
        Some(Self {
            document: document.into(),
            element: element.into(),
        })
    }
}

fn member(target: &JsValue, name: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

impl Probe for WebProbe {
    fn has_add_event_listener(&self) -> bool {
        member(&self.document, "addEventListener").is_function()
    }

    fn has_class_list(&self) -> bool {
        let class_list = member(&self.element, "classList");
        !class_list.is_undefined() && !class_list.is_null()
    }

    fn text_content_is_string(&self) -> bool {
        member(&self.element, "textContent").is_string()
    }

    fn has_query_selector(&self) -> bool {
        member(&self.document, "querySelector").is_function()
    }
}
