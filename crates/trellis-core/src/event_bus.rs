use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use ahash::AHashMap;

/// Synchronous named-event register.
///
/// One instance lives inside every component (the lifecycle wiring) and the
/// application store reuses it with its own event type. Handlers for one
/// event run in registration order; events nobody registered for are
/// silently ignored. There is no handler removal and no wildcard matching.
pub struct EventBus<E, P> {
    handlers: RefCell<AHashMap<E, Vec<Rc<dyn Fn(&P)>>>>,
}

impl<E, P> EventBus<E, P>
where
    E: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(AHashMap::new()),
        }
    }

    /// Registers `handler` for `event`. Multiple handlers per event are
    /// allowed and keep registration order.
    pub fn on(&self, event: E, handler: impl Fn(&P) + 'static) {
        self.handlers
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(Rc::new(handler));
    }

    /// Synchronously invokes every handler registered for `event`.
    ///
    /// The handler list is snapshotted first, so a handler may register
    /// further handlers without poisoning the borrow; those only see later
    /// emissions.
    pub fn emit(&self, event: &E, payload: &P) {
        let snapshot: Vec<Rc<dyn Fn(&P)>> = match self.handlers.borrow().get(event) {
            Some(list) => list.clone(),
            None => return,
        };
        for handler in snapshot {
            handler(payload);
        }
    }

    pub fn handler_count(&self, event: &E) -> usize {
        self.handlers
            .borrow()
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl<E, P> Default for EventBus<E, P>
where
    E: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    enum Evt {
        Ping,
        Other,
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let bus: EventBus<Evt, u32> = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.on(Evt::Ping, move |n| seen.borrow_mut().push((tag, *n)));
        }
        bus.emit(&Evt::Ping, &7);
        assert_eq!(
            *seen.borrow(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn unknown_events_are_silently_ignored() {
        let bus: EventBus<Evt, ()> = EventBus::new();
        bus.emit(&Evt::Other, &());
    }

    #[test]
    fn emit_only_reaches_the_named_event() {
        let bus: EventBus<Evt, ()> = EventBus::new();
        let hits = Rc::new(RefCell::new(0u32));
        {
            let hits = hits.clone();
            bus.on(Evt::Ping, move |()| *hits.borrow_mut() += 1);
        }
        bus.emit(&Evt::Other, &());
        assert_eq!(*hits.borrow(), 0);
        bus.emit(&Evt::Ping, &());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn reentrant_registration_during_emit_does_not_panic() {
        let bus: Rc<EventBus<Evt, ()>> = Rc::new(EventBus::new());
        {
            let bus2 = bus.clone();
            bus.on(Evt::Ping, move |()| {
                bus2.on(Evt::Ping, |()| {});
            });
        }
        bus.emit(&Evt::Ping, &());
        assert_eq!(bus.handler_count(&Evt::Ping), 2);
    }
}
