//! Named-path router.
//!
//! A registry of path → handler with a current-path record. Handlers do the
//! page swap themselves; the router only dispatches and remembers where the
//! app is.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

/// Route paths of the messenger app.
pub mod routes {
    pub const SIGN_IN: &str = "/";
    pub const SIGN_UP: &str = "/sign-up";
    pub const MESSENGER: &str = "/messenger";
    pub const SETTINGS: &str = "/settings";
    pub const SERVER_ERROR: &str = "/500";
}

type RouteHandler = Box<dyn Fn()>;

struct RouterInner {
    handlers: RefCell<IndexMap<String, RouteHandler>>,
    current: RefCell<Option<String>>,
}

#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RouterInner {
                handlers: RefCell::new(IndexMap::new()),
                current: RefCell::new(None),
            }),
        }
    }

    /// Registers `handler` for `path`, replacing any previous registration.
    pub fn register(&self, path: impl Into<String>, handler: impl Fn() + 'static) {
        self.inner
            .handlers
            .borrow_mut()
            .insert(path.into(), Box::new(handler));
    }

    /// Navigates to `path`: records it as current and runs its handler.
    /// Unknown paths are logged and ignored.
    pub fn go(&self, path: &str) {
        // Taken out of the registry for the call so a handler may register
        // routes of its own.
        let handler = {
            let mut handlers = self.inner.handlers.borrow_mut();
            handlers.shift_remove(path)
        };
        let Some(handler) = handler else {
            log::warn!("router: no route registered for {path:?}");
            return;
        };
        log::debug!("router: navigating to {path}");
        *self.inner.current.borrow_mut() = Some(path.to_string());
        handler();
        self.inner
            .handlers
            .borrow_mut()
            .entry(path.to_string())
            .or_insert(handler);
    }

    pub fn current(&self) -> Option<String> {
        self.inner.current.borrow().clone()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{routes, Router};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn go_runs_the_handler_and_records_the_path() {
        let router = Router::new();
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        router.register(routes::MESSENGER, {
            let log = log.clone();
            move || log.borrow_mut().push("messenger")
        });

        router.go(routes::MESSENGER);
        assert_eq!(*log.borrow(), vec!["messenger"]);
        assert_eq!(router.current().as_deref(), Some(routes::MESSENGER));
    }

    #[test]
    fn unknown_paths_are_ignored() {
        let router = Router::new();
        router.go("/nowhere");
        assert_eq!(router.current(), None);
    }

    #[test]
    fn routes_stay_registered_across_navigations() {
        let router = Router::new();
        let hits = Rc::new(RefCell::new(0u32));
        router.register(routes::SIGN_IN, {
            let hits = hits.clone();
            move || *hits.borrow_mut() += 1
        });
        router.go(routes::SIGN_IN);
        router.go(routes::SIGN_IN);
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn handlers_may_navigate_further() {
        let router = Router::new();
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        router.register(routes::SERVER_ERROR, {
            let log = log.clone();
            move || log.borrow_mut().push("error page")
        });
        router.register(routes::MESSENGER, {
            let log = log.clone();
            let router = router.clone();
            move || {
                log.borrow_mut().push("messenger");
                router.go(routes::SERVER_ERROR);
            }
        });

        router.go(routes::MESSENGER);
        assert_eq!(*log.borrow(), vec!["messenger", "error page"]);
        assert_eq!(router.current().as_deref(), Some(routes::SERVER_ERROR));
    }
}
