use trellis_core::{Behavior, Component, ComponentSpec, Fragment, Settings};
use trellis_template::{Template, TemplateError};

const TEMPLATE: &str = r#"<a class="link" href="{{href}}">{{label}}</a>"#;

struct LinkBehavior {
    template: Template,
}

impl Behavior for LinkBehavior {
    fn render(&self, host: &Component) -> Option<Fragment> {
        Some(host.compile(&self.template))
    }
}

/// Navigation anchor; wrapper-less like [`button`](crate::button). Routing
/// is wired by binding `click` and calling the router, the anchor itself
/// never navigates.
///
/// Expected props: `label`, `href`.
pub fn link(spec: ComponentSpec) -> Result<Component, TemplateError> {
    let template = Template::parse(TEMPLATE)?;
    let spec = spec.settings(Settings { is_simple: true, ..Settings::default() });
    Ok(Component::new("div", spec, LinkBehavior { template }))
}

#[cfg(test)]
mod tests {
    use super::link;
    use trellis_core::ComponentSpec;

    #[test]
    fn renders_an_anchor_with_href() {
        let component = link(
            ComponentSpec::new().prop("label", "No account?").prop("href", "/sign-up"),
        )
        .expect("link template parses");
        let element = component.content().expect("element");
        assert_eq!(element.tag(), "a");
        assert_eq!(element.attribute("href").as_deref(), Some("/sign-up"));
        assert_eq!(element.text_content(), "No account?");
    }
}
