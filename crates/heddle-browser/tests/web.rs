//! WASM browser tests for heddle-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use heddle_browser::{
    Backend, CLICK, COMPOSITION_END, COMPOSITION_START, DomListener, DomSyntheticEvent, Events,
    FanOut, INPUT, MODEL, NativeEvent, SmolStr, SpecialHooks, WebBackend, add_class,
    add_special_event, capabilities, find, off, on, remove_class, set_text, text, with_events,
};
use web_sys::{Document, Element, Event, EventInit, EventTarget, HtmlElement};

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(tag: &str) -> Element {
    let document = document();
    let element = document.create_element(tag).unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

fn counter(hits: &Rc<Cell<u32>>) -> DomListener {
    let hits = hits.clone();
    DomListener::new(move |_| hits.set(hits.get() + 1))
}

fn dispatch(element: &Element, event_type: &str) {
    let event = Event::new(event_type).unwrap();
    element.dispatch_event(&event).unwrap();
}

// === Capabilities ===

#[wasm_bindgen_test]
fn test_modern_browser_is_modern() {
    assert!(capabilities().is_modern());
    assert!(!with_events(|events| events.backend().is_legacy()));
}

// === Registry over the real DOM ===

#[wasm_bindgen_test]
fn test_click_on_off() {
    let element = mount("div");
    let hits = Rc::new(Cell::new(0));
    let seen = Rc::new(RefCell::new(None));

    let listener = {
        let hits = hits.clone();
        let seen = seen.clone();
        DomListener::new(move |event: &DomSyntheticEvent| {
            hits.set(hits.get() + 1);
            *seen.borrow_mut() = Some((event.event_type(), event.original_event().event_type()));
        })
    };

    on(&element, CLICK, &listener);
    element.unchecked_ref::<HtmlElement>().click();
    assert_eq!(hits.get(), 1);
    assert_eq!(
        seen.borrow().clone(),
        Some((SmolStr::new("click"), SmolStr::new("click")))
    );

    off(&element, CLICK, &listener);
    element.unchecked_ref::<HtmlElement>().click();
    assert_eq!(hits.get(), 1);
    assert_eq!(with_events(|events| events.backend().node_id(&element)), None);
}

#[wasm_bindgen_test]
fn test_one_browser_subscription_per_type() {
    let element = mount("div");
    let hits = Rc::new(Cell::new(0));
    let a = counter(&hits);
    let b = counter(&hits);

    on(&element, CLICK, &a);
    on(&element, CLICK, &b);
    assert!(with_events(|events| events.is_subscribed(&element, CLICK)));
    assert_eq!(with_events(|events| events.listener_count(&element, CLICK)), 2);

    dispatch(&element, CLICK);
    assert_eq!(hits.get(), 2);

    off(&element, CLICK, &a);
    off(&element, CLICK, &b);
    assert!(!with_events(|events| events.is_subscribed(&element, CLICK)));
    dispatch(&element, CLICK);
    assert_eq!(hits.get(), 2);
}

#[wasm_bindgen_test]
fn test_prevent_default_reaches_browser() {
    let element = mount("div");
    let listener = DomListener::new(|event: &DomSyntheticEvent| event.prevent_default());
    on(&element, CLICK, &listener);

    let init = EventInit::new();
    init.set_cancelable(true);
    let event = Event::new_with_event_init_dict(CLICK, &init).unwrap();
    let not_cancelled = element.dispatch_event(&event).unwrap();
    assert!(!not_cancelled);
    assert!(event.default_prevented());

    off(&element, CLICK, &listener);
}

#[wasm_bindgen_test]
fn test_model_composition_guard() {
    let input = mount("input");
    let hits = Rc::new(Cell::new(0));
    let listener = counter(&hits);

    on(&input, MODEL, &listener);
    dispatch(&input, COMPOSITION_START);
    for _ in 0..3 {
        dispatch(&input, INPUT);
    }
    dispatch(&input, COMPOSITION_END);
    dispatch(&input, INPUT);
    assert_eq!(hits.get(), 2);

    off(&input, MODEL, &listener);
    dispatch(&input, INPUT);
    assert_eq!(hits.get(), 2);
    assert_eq!(with_events(|events| events.backend().node_id(&input)), None);
}

#[wasm_bindgen_test]
fn test_one_callback_on_two_targets() {
    add_special_event(
        "outside-click",
        SpecialHooks::new(
            |events: &Events<WebBackend>, node: &EventTarget, listener: &FanOut<WebBackend>| {
                events.backend().attach(node, CLICK, listener);
                events.backend().attach(&document(), CLICK, listener);
            },
            |events: &Events<WebBackend>, node: &EventTarget, listener: &FanOut<WebBackend>| {
                events.backend().detach(node, CLICK, listener);
                events.backend().detach(&document(), CLICK, listener);
            },
        ),
    );

    let element = mount("div");
    let hits = Rc::new(Cell::new(0));
    let listener = counter(&hits);
    on(&element, "outside-click", &listener);

    // Non-bubbling, so each dispatch reaches exactly one target.
    dispatch(&element, CLICK);
    assert_eq!(hits.get(), 1);
    document().dispatch_event(&Event::new(CLICK).unwrap()).unwrap();
    assert_eq!(hits.get(), 2);

    off(&element, "outside-click", &listener);
    dispatch(&element, CLICK);
    document().dispatch_event(&Event::new(CLICK).unwrap()).unwrap();
    assert_eq!(hits.get(), 2);
}

// === Element helpers ===

#[wasm_bindgen_test]
fn test_find_by_selector() {
    let element = mount("section");
    element.set_id("heddle-find");
    element.set_class_name("card");

    assert_eq!(find("#heddle-find"), Some(element.clone()));
    assert_eq!(find("section.card"), Some(element));
    assert!(find("#heddle-missing").is_none());
}

#[wasm_bindgen_test]
fn test_text_round_trip() {
    let element = mount("p");
    set_text(&element, "hello");
    assert_eq!(text(&element), "hello");
    assert_eq!(element.text_content().as_deref(), Some("hello"));
}

#[wasm_bindgen_test]
fn test_class_helpers() {
    let element = mount("div");
    add_class(&element, "a");
    add_class(&element, "b");
    add_class(&element, "a");
    assert_eq!(element.class_name(), "a b");
    remove_class(&element, "a");
    assert_eq!(element.class_name(), "b");
    remove_class(&element, "missing");
    assert_eq!(element.class_name(), "b");
}
