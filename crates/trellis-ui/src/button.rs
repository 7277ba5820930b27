use trellis_core::{Behavior, Component, ComponentSpec, Fragment, Settings};
use trellis_template::{Template, TemplateError};

const TEMPLATE: &str = r#"<button class="button" type="{{kind}}">{{label}}</button>"#;

struct ButtonBehavior {
    template: Template,
}

impl Behavior for ButtonBehavior {
    fn render(&self, host: &Component) -> Option<Fragment> {
        Some(host.compile(&self.template))
    }
}

/// Submit/action button. The `<button>` in the template is the real node,
/// so the component runs wrapper-less.
///
/// Expected props: `label`, `kind` (the `type` attribute).
pub fn button(spec: ComponentSpec) -> Result<Component, TemplateError> {
    let template = Template::parse(TEMPLATE)?;
    let spec = spec.settings(Settings { is_simple: true, ..Settings::default() });
    Ok(Component::new("div", spec, ButtonBehavior { template }))
}
