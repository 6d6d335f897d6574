//! Capability selection for modern and legacy engines.
//!
//! Each capability is probed on its own, so a host can be mostly modern and
//! still need the legacy event primitives. The result is plain data; hosts
//! cache it once (see `heddle-browser`) and build their backend from it.

use serde::{Deserialize, Serialize};

/// How native listeners are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventApi {
    /// `addEventListener` / `removeEventListener`.
    #[default]
    Standard,
    /// `attachEvent` / `detachEvent`, with input and checkbox reroutes.
    Legacy,
}

/// How classes are toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassApi {
    /// `classList.add` / `classList.remove`.
    #[default]
    TokenList,
    /// Rewriting the `className` string.
    ClassName,
}

/// Which property carries element text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextApi {
    #[default]
    TextContent,
    InnerText,
}

impl TextApi {
    pub fn property(self) -> &'static str {
        match self {
            TextApi::TextContent => "textContent",
            TextApi::InnerText => "innerText",
        }
    }
}

/// How an element is located by selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorApi {
    /// `querySelector`, any selector.
    #[default]
    Query,
    /// `getElementById`, `#id` selectors only.
    IdOnly,
}

/// The primitives a host resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub events: EventApi,
    pub classes: ClassApi,
    pub text: TextApi,
    pub selector: SelectorApi,
}

impl Capabilities {
    pub const MODERN: Capabilities = Capabilities {
        events: EventApi::Standard,
        classes: ClassApi::TokenList,
        text: TextApi::TextContent,
        selector: SelectorApi::Query,
    };

    pub const LEGACY: Capabilities = Capabilities {
        events: EventApi::Legacy,
        classes: ClassApi::ClassName,
        text: TextApi::InnerText,
        selector: SelectorApi::IdOnly,
    };

    /// Probe the host, one capability at a time.
    pub fn detect(probe: &impl Probe) -> Self {
        let events = if probe.has_add_event_listener() {
            EventApi::Standard
        } else {
            EventApi::Legacy
        };
        let classes = if probe.has_class_list() {
            ClassApi::TokenList
        } else {
            ClassApi::ClassName
        };
        let text = if probe.text_content_is_string() {
            TextApi::TextContent
        } else {
            TextApi::InnerText
        };
        let selector = if probe.has_query_selector() {
            SelectorApi::Query
        } else {
            SelectorApi::IdOnly
        };

        let capabilities = Capabilities {
            events,
            classes,
            text,
            selector,
        };
        tracing::debug!(?capabilities, "capabilities resolved");
        capabilities
    }

    pub fn is_modern(&self) -> bool {
        *self == Self::MODERN
    }
}

/// Feature questions asked once at startup.
pub trait Probe {
    /// Does the global document expose `addEventListener`?
    fn has_add_event_listener(&self) -> bool;

    /// Does a representative element expose `classList`?
    fn has_class_list(&self) -> bool;

    /// Does `textContent` read as a string on a representative node?
    fn text_content_is_string(&self) -> bool;

    /// Does the global document expose `querySelector`?
    fn has_query_selector(&self) -> bool;
}

const CLASS_SEPARATOR: char = ' ';

/// Append `class` to a `className` string.
///
/// Returns the new string, or `None` when the class is already present and
/// nothing needs writing.
pub fn add_class_name(class_name: &str, class: &str) -> Option<String> {
    let mut classes: Vec<&str> = class_name
        .split(CLASS_SEPARATOR)
        .filter(|c| !c.is_empty())
        .collect();
    if classes.contains(&class) {
        return None;
    }
    classes.push(class);
    Some(classes.join(" "))
}

/// Remove every occurrence of `class` from a `className` string.
///
/// Returns `None` when the class was absent.
pub fn remove_class_name(class_name: &str, class: &str) -> Option<String> {
    let classes: Vec<&str> = class_name
        .split(CLASS_SEPARATOR)
        .filter(|c| !c.is_empty())
        .collect();
    let kept: Vec<&str> = classes.iter().copied().filter(|c| *c != class).collect();
    if kept.len() == classes.len() {
        return None;
    }
    Some(kept.join(" "))
}

/// Reduce a selector to an element id for id-only lookups.
///
/// A leading `#` is stripped. Anything else is a usage fault: it is reported
/// and passed through as the id.
pub fn id_selector(selector: &str) -> &str {
    match selector.strip_prefix('#') {
        Some(id) => id,
        None => {
            if cfg!(feature = "dev") {
                tracing::error!(
                    selector,
                    "\"#id\" is the only supported selector for the legacy backend"
                );
            }
            selector
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed([bool; 4]);

    impl Probe for Fixed {
        fn has_add_event_listener(&self) -> bool {
            self.0[0]
        }
        fn has_class_list(&self) -> bool {
            self.0[1]
        }
        fn text_content_is_string(&self) -> bool {
            self.0[2]
        }
        fn has_query_selector(&self) -> bool {
            self.0[3]
        }
    }

    #[test]
    fn test_detect_all_modern() {
        let caps = Capabilities::detect(&Fixed([true; 4]));
        assert_eq!(caps, Capabilities::MODERN);
        assert!(caps.is_modern());
    }

    #[test]
    fn test_detect_all_legacy() {
        assert_eq!(Capabilities::detect(&Fixed([false; 4])), Capabilities::LEGACY);
    }

    #[test]
    fn test_detect_is_per_capability() {
        // Mostly modern host with legacy events.
        let caps = Capabilities::detect(&Fixed([false, true, true, true]));
        assert_eq!(caps.events, EventApi::Legacy);
        assert_eq!(caps.classes, ClassApi::TokenList);
        assert_eq!(caps.text, TextApi::TextContent);
        assert_eq!(caps.selector, SelectorApi::Query);
        assert!(!caps.is_modern());
    }

    #[test]
    fn test_text_property_names() {
        assert_eq!(TextApi::TextContent.property(), "textContent");
        assert_eq!(TextApi::InnerText.property(), "innerText");
    }

    #[test]
    fn test_class_name_sequence() {
        let mut class_name = String::new();
        for class in ["a", "b", "c"] {
            class_name = add_class_name(&class_name, class).unwrap();
        }
        assert_eq!(class_name, "a b c");
        assert_eq!(add_class_name(&class_name, "b"), None);

        class_name = remove_class_name(&class_name, "b").unwrap();
        assert_eq!(class_name, "a c");
        class_name = remove_class_name(&class_name, "a").unwrap();
        assert_eq!(class_name, "c");
        assert_eq!(remove_class_name(&class_name, "b"), None);
        class_name = remove_class_name(&class_name, "c").unwrap();
        assert_eq!(class_name, "");
    }

    #[test]
    fn test_remove_class_drops_duplicates() {
        assert_eq!(remove_class_name("x a x", "x").as_deref(), Some("a"));
    }

    #[test]
    fn test_id_selector() {
        assert_eq!(id_selector("#app"), "app");
        assert_eq!(id_selector("app"), "app");
        assert_eq!(id_selector(".app"), ".app");
    }

    #[test]
    fn test_capabilities_from_config() {
        let caps: Capabilities = serde_json::from_str(r#"{ "events": "legacy" }"#).unwrap();
        assert_eq!(caps.events, EventApi::Legacy);
        assert_eq!(caps.classes, ClassApi::TokenList);

        let caps: Capabilities = serde_json::from_str(
            r#"{ "events": "standard", "classes": "class_name", "text": "inner_text", "selector": "id_only" }"#,
        )
        .unwrap();
        assert_eq!(caps.classes, ClassApi::ClassName);
        assert_eq!(caps.text, TextApi::InnerText);
        assert_eq!(caps.selector, SelectorApi::IdOnly);
    }
}
