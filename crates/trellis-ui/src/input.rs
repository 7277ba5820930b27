use trellis_core::{Behavior, Component, ComponentSpec, Fragment, Props};
use trellis_template::{Template, TemplateError};

const TEMPLATE: &str = "\
<label class=\"input__label\">{{label}}</label>\
<input class=\"input__field\" name=\"{{name}}\" type=\"{{kind}}\" \
value=\"{{value}}\" placeholder=\"{{placeholder}}\">\
{{#if error}}<span class=\"input__error\">{{error}}</span>{{/if}}";

struct InputBehavior {
    template: Template,
}

impl Behavior for InputBehavior {
    fn render(&self, host: &Component) -> Option<Fragment> {
        Some(host.compile(&self.template))
    }

    /// Only the validation message is externally visible state; `value`
    /// writes track what the user already typed, and re-rendering for them
    /// would clobber the live field.
    fn has_updated(&self, old: &Props, new: &Props) -> bool {
        let changed = old.get("error") != new.get("error");
        if !changed {
            log::trace!("input update skipped, error text unchanged");
        }
        changed
    }
}

/// Labeled input field with an inline validation line.
///
/// Expected props: `label`, `name`, `kind` (the `type` attribute), `value`,
/// `placeholder`, `error`. Validation is driven from outside, typically by a
/// `blur` binding on the spec.
pub fn input(spec: ComponentSpec) -> Result<Component, TemplateError> {
    let template = Template::parse(TEMPLATE)?;
    Ok(Component::new("div", spec, InputBehavior { template }))
}

#[cfg(test)]
mod tests {
    use super::input;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trellis_core::{ComponentSpec, DomEvent};

    fn login_input() -> trellis_core::Component {
        input(
            ComponentSpec::new()
                .prop("label", "Login")
                .prop("name", "login")
                .prop("kind", "text")
                .prop("value", "")
                .prop("placeholder", "your login")
                .prop("error", ""),
        )
        .expect("input template parses")
    }

    #[test]
    fn renders_label_and_field_without_error_line() {
        let component = login_input();
        let html = component.content().expect("element").outer_html();
        assert!(html.contains(r#"<label class="input__label">Login</label>"#));
        assert!(html.contains(r#"name="login""#));
        assert!(!html.contains("input__error"));
    }

    #[test]
    fn error_prop_change_rerenders_the_error_line() {
        let component = login_input();
        component
            .set_props(ComponentSpec::new().prop("error", "login is required"))
            .unwrap();
        let html = component.content().expect("element").outer_html();
        assert!(html.contains(r#"<span class="input__error">login is required</span>"#));
    }

    #[test]
    fn value_only_changes_do_not_rerender() {
        let component = login_input();
        component
            .set_props(ComponentSpec::new().prop("value", "typed"))
            .unwrap();
        let html = component.content().expect("element").outer_html();
        // The stored prop changed but the DOM kept the pre-change render.
        assert_eq!(component.props().get_str("value"), Some("typed"));
        assert!(html.contains(r#"value="""#));
    }

    #[test]
    fn blur_bindings_fire_in_capture_mode() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let component = input(ComponentSpec::new().prop("label", "Login").on("blur", {
            let seen = seen.clone();
            move |event: &DomEvent| {
                seen.borrow_mut().push(event.value().unwrap_or("").to_string());
            }
        }))
        .expect("input template parses");

        component
            .content()
            .expect("element")
            .dispatch(&DomEvent::with_value("blur", "typed"));
        assert_eq!(*seen.borrow(), vec!["typed"]);
    }
}
