//! Observable application state.
//!
//! The store is an explicitly constructed value passed to everything that
//! needs it; there is no global instance. Cloning the handle shares the
//! container, so every consumer observes the same state.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use trellis_core::EventBus;
use trellis_template::Value;

/// Ordered key/value application state.
pub type State = IndexMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    Updated,
}

/// Payload delivered to subscribers: the state before and after a merge.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub prev: State,
    pub next: State,
}

struct StoreInner {
    state: RefCell<State>,
    bus: EventBus<StoreEvent, StateChange>,
}

#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(State::new()),
                bus: EventBus::new(),
            }),
        }
    }

    /// Shallow-merges `patch` into the state and notifies subscribers with
    /// the prev/next snapshots. An empty patch still notifies; subscribers
    /// filter for the keys they care about.
    pub fn set_state(&self, patch: impl IntoIterator<Item = (String, Value)>) {
        let prev = self.inner.state.borrow().clone();
        self.inner.state.borrow_mut().extend(patch);
        let next = self.inner.state.borrow().clone();
        log::trace!("store updated, {} keys", next.len());
        self.inner
            .bus
            .emit(&StoreEvent::Updated, &StateChange { prev, next });
    }

    /// Single-key convenience for [`Store::set_state`].
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.set_state([(key.into(), value.into())]);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.state.borrow().get(key).cloned()
    }

    /// Snapshot of the whole state.
    pub fn state(&self) -> State {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self, handler: impl Fn(&StateChange) + 'static) {
        self.inner.bus.on(StoreEvent::Updated, handler);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{StateChange, Store};
    use std::cell::RefCell;
    use std::rc::Rc;
    use trellis_template::Value;

    #[test]
    fn set_state_merges_shallowly() {
        let store = Store::new();
        store.set("is_loading", false);
        store.set("auth_user", "alice");
        store.set("is_loading", true);

        assert_eq!(store.get("is_loading"), Some(Value::Bool(true)));
        assert_eq!(store.get("auth_user"), Some(Value::Str("alice".to_string())));
        assert_eq!(store.state().len(), 2);
    }

    #[test]
    fn subscribers_see_prev_and_next_snapshots() {
        let store = Store::new();
        store.set("count", 1);
        let seen: Rc<RefCell<Vec<(Option<Value>, Option<Value>)>>> =
            Rc::new(RefCell::new(Vec::new()));
        store.subscribe({
            let seen = seen.clone();
            move |change: &StateChange| {
                seen.borrow_mut().push((
                    change.prev.get("count").cloned(),
                    change.next.get("count").cloned(),
                ));
            }
        });
        store.set("count", 2);
        assert_eq!(
            *seen.borrow(),
            vec![(Some(Value::Int(1)), Some(Value::Int(2)))]
        );
    }

    #[test]
    fn clones_share_the_container() {
        let store = Store::new();
        let other = store.clone();
        other.set("flag", true);
        assert_eq!(store.get("flag"), Some(Value::Bool(true)));
    }
}
