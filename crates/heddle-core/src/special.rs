//! Special events: logical types synthesized from other native signals.
//!
//! A special event receives the same fan-out callback the registry would
//! have attached directly, and decides which native subscriptions feed it.
//! Whatever it wires up it stashes on that callback, so `off` can undo it
//! given the same value.

use std::cell::Cell;
use std::rc::Rc;

use crate::backend::{Backend, FanOut};
use crate::event::{COMPOSITION_END, COMPOSITION_START, INPUT, Incoming};
use crate::listener::{Listener, NativeListener};
use crate::registry::Events;

/// `{on, off}` hooks for one logical event type.
pub trait SpecialEvent<B: Backend> {
    /// Wire native signals so that `listener` fires for the logical type.
    fn on(&self, events: &Events<B>, node: &B::Node, listener: &FanOut<B>);

    /// Undo exactly what [`SpecialEvent::on`] did for `listener`.
    fn off(&self, events: &Events<B>, node: &B::Node, listener: &FanOut<B>);
}

/// Special event built from a pair of closures.
pub struct SpecialHooks<On, Off> {
    on: On,
    off: Off,
}

impl<On, Off> SpecialHooks<On, Off> {
    pub fn new(on: On, off: Off) -> Self {
        Self { on, off }
    }
}

impl<B, On, Off> SpecialEvent<B> for SpecialHooks<On, Off>
where
    B: Backend,
    On: Fn(&Events<B>, &B::Node, &FanOut<B>),
    Off: Fn(&Events<B>, &B::Node, &FanOut<B>),
{
    fn on(&self, events: &Events<B>, node: &B::Node, listener: &FanOut<B>) {
        (self.on)(events, node, listener)
    }

    fn off(&self, events: &Events<B>, node: &B::Node, listener: &FanOut<B>) {
        (self.off)(events, node, listener)
    }
}

/// The built-in `model` event: input that stays quiet during IME composition.
///
/// Intermediate input while a composition is open is swallowed. The
/// `compositionend` event is forwarded once so the committed text is
/// reported exactly once.
pub struct ModelEvent;

impl<B: Backend> SpecialEvent<B> for ModelEvent {
    fn on(&self, events: &Events<B>, node: &B::Node, listener: &FanOut<B>) {
        // One flag per on/off pairing, shared by the three subscriptions.
        let locked = Rc::new(Cell::new(false));

        let start: Listener<B::Event> = {
            let locked = locked.clone();
            Listener::new(move |_| locked.set(true))
        };

        let end: Listener<B::Event> = {
            let locked = locked.clone();
            let target = listener.downgrade();
            Listener::new(move |event| {
                locked.set(false);
                if let Some(target) = target.upgrade() {
                    target.call(Incoming::Synthetic(event));
                }
            })
        };

        let input: FanOut<B> = {
            let target = listener.downgrade();
            NativeListener::new(move |incoming| {
                if locked.get() {
                    return;
                }
                if let Some(target) = target.upgrade() {
                    target.call(incoming);
                }
            })
        };

        events.on(node, COMPOSITION_START, &start);
        events.on(node, COMPOSITION_END, &end);
        events.backend().attach(node, INPUT, &input);

        listener.stash(COMPOSITION_START, start);
        listener.stash(COMPOSITION_END, end);
        listener.stash(INPUT, input);
    }

    fn off(&self, events: &Events<B>, node: &B::Node, listener: &FanOut<B>) {
        if let Some(start) = listener.take::<Listener<B::Event>>(COMPOSITION_START) {
            events.off(node, COMPOSITION_START, &start);
        }
        if let Some(end) = listener.take::<Listener<B::Event>>(COMPOSITION_END) {
            events.off(node, COMPOSITION_END, &end);
        }
        if let Some(input) = listener.take::<FanOut<B>>(INPUT) {
            events.backend().detach(node, INPUT, &input);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::event::{MODEL, NativeEvent, SyntheticEvent};
    use crate::legacy::Legacy;
    use crate::memory::{MemoryEvent, MemoryHost, MemoryNode};

    fn recorder(log: &Rc<RefCell<Vec<String>>>) -> Listener<MemoryEvent> {
        let log = log.clone();
        Listener::new(move |event: &SyntheticEvent<MemoryEvent>| {
            log.borrow_mut().push(format!(
                "{}<-{}",
                event.event_type(),
                event.original_event().event_type()
            ))
        })
    }

    fn type_sequence(node: &MemoryNode) {
        node.fire(MemoryEvent::new(COMPOSITION_START));
        for _ in 0..3 {
            node.fire(MemoryEvent::new(INPUT));
        }
        node.fire(MemoryEvent::new(COMPOSITION_END));
        node.fire(MemoryEvent::new(INPUT));
    }

    #[test]
    fn test_composition_guard() {
        let events = Events::new(MemoryHost::new());
        let input = events.backend().element("input");
        let log = Rc::new(RefCell::new(Vec::new()));

        events.on(&input, MODEL, &recorder(&log));
        type_sequence(&input);

        assert_eq!(
            *log.borrow(),
            vec!["model<-compositionend".to_string(), "model<-input".to_string()]
        );
    }

    #[test]
    fn test_model_wires_three_signals_as_a_unit() {
        let events = Events::new(MemoryHost::new());
        let input = events.backend().element("input");
        let listener = recorder(&Rc::new(RefCell::new(Vec::new())));

        events.on(&input, MODEL, &listener);
        assert_eq!(input.subscriptions(COMPOSITION_START), 1);
        assert_eq!(input.subscriptions(COMPOSITION_END), 1);
        assert_eq!(input.subscriptions(INPUT), 1);
        assert_eq!(input.subscriptions(MODEL), 0);

        events.off(&input, MODEL, &listener);
        assert_eq!(input.total_subscriptions(), 0);
        assert_eq!(events.tracked_nodes(), 0);
        assert_eq!(events.backend().node_id(&input), None);
    }

    #[test]
    fn test_model_flag_is_per_node() {
        let events = Events::new(MemoryHost::new());
        let a = events.backend().element("input");
        let b = events.backend().element("input");
        let log = Rc::new(RefCell::new(Vec::new()));
        let listener = recorder(&log);

        events.on(&a, MODEL, &listener);
        events.on(&b, MODEL, &listener);

        a.fire(MemoryEvent::new(COMPOSITION_START));
        b.fire(MemoryEvent::new(INPUT));
        a.fire(MemoryEvent::new(INPUT));
        assert_eq!(*log.borrow(), vec!["model<-input".to_string()]);
    }

    #[test]
    fn test_model_coexists_with_plain_input_listener() {
        let events = Events::new(MemoryHost::new());
        let input = events.backend().element("input");
        let log = Rc::new(RefCell::new(Vec::new()));
        let model = recorder(&log);
        let raw = recorder(&log);

        events.on(&input, MODEL, &model);
        events.on(&input, INPUT, &raw);
        input.fire(MemoryEvent::new(COMPOSITION_START));
        input.fire(MemoryEvent::new(INPUT));
        assert_eq!(*log.borrow(), vec!["input<-input".to_string()]);

        events.off(&input, MODEL, &model);
        assert_eq!(input.subscriptions(INPUT), 1);
        assert_eq!(events.tracked_nodes(), 1);
        events.off(&input, INPUT, &raw);
        assert_eq!(input.total_subscriptions(), 0);
    }

    #[test]
    fn test_composition_guard_on_legacy_backend() {
        let host = Rc::new(MemoryHost::legacy());
        let events = Events::new(Legacy::new(host.clone()));
        let input = host.element("input");
        let log = Rc::new(RefCell::new(Vec::new()));
        let listener = recorder(&log);

        events.on(&input, MODEL, &listener);
        // Raw input arrives as propertychange on the legacy engine.
        assert_eq!(input.subscriptions("onpropertychange"), 1);
        assert_eq!(input.subscriptions("oncompositionstart"), 1);

        input.fire(MemoryEvent::new(COMPOSITION_START));
        input.fire(MemoryEvent::property_change("value"));
        input.fire(MemoryEvent::new(COMPOSITION_END));
        input.fire(MemoryEvent::property_change("value"));
        input.fire(MemoryEvent::property_change("className"));

        assert_eq!(
            *log.borrow(),
            vec![
                "model<-compositionend".to_string(),
                "model<-propertychange".to_string()
            ]
        );

        events.off(&input, MODEL, &listener);
        assert_eq!(input.total_subscriptions(), 0);
    }
}
