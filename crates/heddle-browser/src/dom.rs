//! Capability-driven element helpers: lookup, text and classes.

use heddle_core::error::report;
use heddle_core::{ClassApi, DomError, SelectorApi, add_class_name, id_selector, remove_class_name};
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::capabilities::capabilities;

pub(crate) fn host_error(member: &str, err: JsValue) -> DomError {
    DomError::host_call(member, err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn document() -> Result<Document, DomError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(DomError::NoDocument)
}

/// Locate the first element matching `selector`.
///
/// Engines without `querySelector` only understand `#id`.
pub fn find(selector: &str) -> Option<Element> {
    let document = match document() {
        Ok(document) => document,
        Err(err) => {
            tracing::error!(error = %err, selector, "find failed");
            return None;
        }
    };
    match capabilities().selector {
        SelectorApi::Query => match document.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                tracing::error!(error = %host_error("querySelector", err), selector, "find failed");
                None
            }
        },
        SelectorApi::IdOnly => document.get_element_by_id(id_selector(selector)),
    }
}

/// Element text through `textContent` or `innerText`.
pub fn text(element: &Element) -> String {
    let property = capabilities().text.property();
    Reflect::get(element, &JsValue::from_str(property))
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default()
}

pub fn set_text(element: &Element, text: &str) {
    let property = capabilities().text.property();
    report(
        Reflect::set(element, &JsValue::from_str(property), &JsValue::from_str(text))
            .map(drop)
            .map_err(|err| host_error(property, err)),
    );
}

pub fn add_class(element: &Element, class: &str) {
    match capabilities().classes {
        ClassApi::TokenList => report(
            element
                .class_list()
                .add_1(class)
                .map_err(|err| host_error("classList.add", err)),
        ),
        ClassApi::ClassName => {
            if let Some(class_name) = add_class_name(&element.class_name(), class) {
                element.set_class_name(&class_name);
            }
        }
    }
}

pub fn remove_class(element: &Element, class: &str) {
    match capabilities().classes {
        ClassApi::TokenList => report(
            element
                .class_list()
                .remove_1(class)
                .map_err(|err| host_error("classList.remove", err)),
        ),
        ClassApi::ClassName => {
            if let Some(class_name) = remove_class_name(&element.class_name(), class) {
                element.set_class_name(&class_name);
            }
        }
    }
}
