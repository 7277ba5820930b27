//! Login page wired end to end: components, store, router and the auth
//! service against a canned transport. Run with `RUST_LOG=debug` to watch
//! the lifecycle.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_app::{
    routes, AuthApi, AuthService, Request, Response, Router, SignInRequest, Store, Transport,
    TransportError,
};
use trellis_core::{Behavior, Component, ComponentSpec, DomEvent, Fragment};
use trellis_template::Template;
use trellis_ui::{button, input, link};

/// Stands in for the network: every auth call succeeds.
struct CannedTransport;

impl Transport for CannedTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        log::info!("-> {:?} {}", request.method, request.path);
        Ok(Response::new(200, "OK"))
    }
}

struct LoginPage {
    template: Template,
}

impl Behavior for LoginPage {
    fn render(&self, host: &Component) -> Option<Fragment> {
        Some(host.compile(&self.template))
    }
}

const PAGE_TEMPLATE: &str = "\
<form class=\"login-form\">\
<h1>{{title}}</h1>\
{{login}}{{password}}{{submit}}{{signup}}\
</form>";

/// Field that records its latest value in the store under `store_key` and
/// validates on blur.
fn field(
    store: &Store,
    label: &str,
    name: &str,
    kind: &str,
    store_key: &'static str,
) -> Component {
    let slot: Rc<RefCell<Option<Component>>> = Rc::new(RefCell::new(None));
    let component = input(
        ComponentSpec::new()
            .prop("label", label)
            .prop("name", name)
            .prop("kind", kind)
            .prop("value", "")
            .prop("placeholder", label.to_lowercase())
            .prop("error", "")
            .on("blur", {
                let store = store.clone();
                let slot = slot.clone();
                let required = format!("{name} is required");
                move |event: &DomEvent| {
                    let value = event.value().unwrap_or("").to_string();
                    let error = if value.is_empty() { required.as_str() } else { "" };
                    if let Some(field) = slot.borrow().as_ref() {
                        field
                            .set_props(ComponentSpec::new().prop("error", error))
                            .expect("plain prop key");
                    }
                    store.set(store_key, value);
                }
            }),
    )
    .expect("input template parses");
    slot.borrow_mut().replace(component.clone());
    component
}

fn main() {
    env_logger::init();

    let store = Store::new();
    let router = Router::new();
    router.register(routes::SIGN_IN, || println!("[page] sign in"));
    router.register(routes::SIGN_UP, || println!("[page] sign up"));
    router.register(routes::MESSENGER, || println!("[page] messenger"));
    router.register(routes::SERVER_ERROR, || println!("[page] something went wrong"));

    let service = Rc::new(AuthService::new(
        AuthApi::new(CannedTransport),
        store.clone(),
        router.clone(),
    ));

    let login_field = field(&store, "Login", "login", "text", "login_value");
    let password_field = field(&store, "Password", "password", "password", "password_value");

    let submit = button(ComponentSpec::new().prop("label", "Sign in").prop("kind", "submit").on(
        "click",
        {
            let store = store.clone();
            let service = service.clone();
            move |_| {
                let read = |key: &str| {
                    store
                        .get(key)
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_default()
                };
                service.login(&SignInRequest {
                    login: read("login_value"),
                    password: read("password_value"),
                });
            }
        },
    ))
    .expect("button template parses");

    let signup = link(
        ComponentSpec::new().prop("label", "No account?").prop("href", routes::SIGN_UP),
    )
    .expect("link template parses");

    let submit_element = submit.content().expect("button element");
    let page = Component::new(
        "main",
        ComponentSpec::new()
            .prop("title", "Sign in")
            .child("login", login_field.clone())
            .child("password", password_field.clone())
            .child("submit", submit)
            .child("signup", signup),
        LoginPage { template: Template::parse(PAGE_TEMPLATE).expect("page template parses") },
    );

    router.go(routes::SIGN_IN);
    page.dispatch_mounted();
    println!("{}", page.content().expect("page element").outer_html());

    // A user tabs through an empty login field, fixes it, fills the
    // password, then submits.
    let login_element = login_field.content().expect("login element");
    login_element.dispatch(&DomEvent::with_value("blur", ""));
    println!("after empty blur:\n{}", login_element.outer_html());

    login_element.dispatch(&DomEvent::with_value("blur", "alice"));
    password_field
        .content()
        .expect("password element")
        .dispatch(&DomEvent::with_value("blur", "hunter2"));

    submit_element.dispatch(&DomEvent::new("click"));
    println!(
        "route after submit: {}",
        router.current().unwrap_or_else(|| "<none>".to_string())
    );
}
