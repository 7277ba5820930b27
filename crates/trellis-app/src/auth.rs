//! Auth orchestration over the API wrappers.
//!
//! Every operation runs the same bracket: raise `is_loading`, perform the
//! call, settle the outcome (navigate on success, `/500` on a server error,
//! record the rejection reason otherwise), lower `is_loading`. Transport
//! failures are logged and change nothing but the loading flag.

use trellis_template::Value;

use crate::api::{AuthApi, ErrorReason, Response, SignInRequest, SignUpRequest, Transport};
use crate::router::{routes, Router};
use crate::store::Store;

pub struct AuthService<T: Transport> {
    api: AuthApi<T>,
    store: Store,
    router: Router,
}

impl<T: Transport> AuthService<T> {
    pub fn new(api: AuthApi<T>, store: Store, router: Router) -> Self {
        Self { api, store, router }
    }

    pub fn login(&self, credentials: &SignInRequest) {
        self.store.set("is_loading", true);
        match self.api.sign_in(credentials) {
            Ok(response) if response.ok() => self.router.go(routes::MESSENGER),
            Ok(response) => self.reject(&response),
            Err(err) => log::error!("sign-in failed: {err}"),
        }
        self.store.set("is_loading", false);
    }

    pub fn register(&self, registration: &SignUpRequest) {
        self.store.set("is_loading", true);
        match self.api.sign_up(registration) {
            Ok(response) if response.ok() => self.router.go(routes::SIGN_IN),
            Ok(response) => self.reject(&response),
            Err(err) => log::error!("sign-up failed: {err}"),
        }
        self.store.set("is_loading", false);
    }

    /// Fetches the signed-in profile; success stores it under `auth_user`
    /// and lands the app on the messenger page.
    pub fn fetch_user(&self) {
        self.store.set("is_loading", true);
        match self.api.user() {
            Ok(response) if response.ok() => match response.json::<serde_json::Value>() {
                Ok(profile) => {
                    self.store.set("auth_user", json_to_value(profile));
                    self.router.go(routes::MESSENGER);
                }
                Err(err) => log::error!("profile decode failed: {err}"),
            },
            Ok(response) => self.reject(&response),
            Err(err) => log::error!("profile fetch failed: {err}"),
        }
        self.store.set("is_loading", false);
    }

    pub fn logout(&self) {
        self.store.set("is_loading", true);
        match self.api.logout() {
            Ok(response) if response.ok() => {
                self.store.set("auth_user", Value::Null);
                self.router.go(routes::SIGN_IN);
            }
            Ok(response) => self.reject(&response),
            Err(err) => log::error!("logout failed: {err}"),
        }
        self.store.set("is_loading", false);
    }

    /// Non-2xx settlement: server errors land on the error page, everything
    /// else records the backend's reason for the UI to display.
    fn reject(&self, response: &Response) {
        if response.server_error() {
            self.router.go(routes::SERVER_ERROR);
            return;
        }
        let reason = response
            .json::<ErrorReason>()
            .map(|e| e.reason)
            .unwrap_or_else(|_| response.body.clone());
        log::warn!("request rejected ({}): {reason}", response.status);
        self.store.set("auth_error", reason);
    }
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(key, value)| (key, json_to_value(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::AuthService;
    use crate::api::{AuthApi, Request, Response, SignInRequest, Transport, TransportError};
    use crate::router::{routes, Router};
    use crate::store::Store;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use trellis_template::Value;

    struct Scripted {
        responses: RefCell<VecDeque<Result<Response, TransportError>>>,
    }

    impl Scripted {
        fn one(result: Result<Response, TransportError>) -> Self {
            Self { responses: RefCell::new(VecDeque::from([result])) }
        }
    }

    impl Transport for Scripted {
        fn send(&self, _request: &Request) -> Result<Response, TransportError> {
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected request")
        }
    }

    fn harness(result: Result<Response, TransportError>) -> (AuthService<Scripted>, Store, Router) {
        let store = Store::new();
        let router = Router::new();
        for path in [
            routes::SIGN_IN,
            routes::MESSENGER,
            routes::SERVER_ERROR,
        ] {
            router.register(path, || {});
        }
        let service = AuthService::new(
            AuthApi::new(Scripted::one(result)),
            store.clone(),
            router.clone(),
        );
        (service, store, router)
    }

    fn credentials() -> SignInRequest {
        SignInRequest { login: "alice".into(), password: "hunter2".into() }
    }

    #[test]
    fn successful_login_lands_on_the_messenger_page() {
        let (service, store, router) = harness(Ok(Response::new(200, "OK")));
        service.login(&credentials());
        assert_eq!(router.current().as_deref(), Some(routes::MESSENGER));
        assert_eq!(store.get("is_loading"), Some(Value::Bool(false)));
    }

    #[test]
    fn login_brackets_the_loading_flag() {
        let (service, store, _router) = harness(Ok(Response::new(200, "OK")));
        let flags: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
        store.subscribe({
            let flags = flags.clone();
            move |change| {
                if let Some(flag) = change.next.get("is_loading") {
                    flags.borrow_mut().push(flag.clone());
                }
            }
        });
        service.login(&credentials());
        assert_eq!(*flags.borrow(), vec![Value::Bool(true), Value::Bool(false)]);
    }

    #[test]
    fn server_errors_land_on_the_error_page() {
        let (service, _store, router) = harness(Ok(Response::new(500, "boom")));
        service.login(&credentials());
        assert_eq!(router.current().as_deref(), Some(routes::SERVER_ERROR));
    }

    #[test]
    fn rejections_record_the_backend_reason() {
        let (service, store, router) =
            harness(Ok(Response::new(401, r#"{"reason":"invalid credentials"}"#)));
        service.login(&credentials());
        assert_eq!(router.current(), None);
        assert_eq!(
            store.get("auth_error"),
            Some(Value::Str("invalid credentials".to_string()))
        );
        assert_eq!(store.get("is_loading"), Some(Value::Bool(false)));
    }

    #[test]
    fn transport_failures_only_touch_the_loading_flag() {
        let (service, store, router) =
            harness(Err(TransportError("connection refused".to_string())));
        service.login(&credentials());
        assert_eq!(router.current(), None);
        assert_eq!(store.get("auth_error"), None);
        assert_eq!(store.get("is_loading"), Some(Value::Bool(false)));
    }

    #[test]
    fn fetch_user_stores_the_profile() {
        let body = r#"{"id":7,"first_name":"Alice","second_name":"Liddell",
            "display_name":null,"login":"alice","email":"a@b.c",
            "phone":"+100","avatar":null}"#;
        let (service, store, router) = harness(Ok(Response::new(200, body)));
        service.fetch_user();

        let Some(Value::Map(profile)) = store.get("auth_user") else {
            panic!("expected the profile map in the store");
        };
        assert_eq!(profile.get("login"), Some(&Value::Str("alice".to_string())));
        assert_eq!(router.current().as_deref(), Some(routes::MESSENGER));
    }

    #[test]
    fn logout_clears_the_user_and_returns_to_sign_in() {
        let (service, store, router) = harness(Ok(Response::new(200, "OK")));
        store.set("auth_user", "alice");
        service.logout();
        assert_eq!(store.get("auth_user"), Some(Value::Null));
        assert_eq!(router.current().as_deref(), Some(routes::SIGN_IN));
    }
}
