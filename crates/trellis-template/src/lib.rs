//! Logic-less template engine for the Trellis component framework.
//!
//! Templates are Handlebars-flavored: `{{path}}` interpolation (escaped),
//! `{{{path}}}` raw interpolation, `{{#if}}`/`{{else}}`/`{{/if}}`
//! conditionals, `{{#each}}`/`{{/each}}` loops with `this` and `@index`,
//! and `{{! …}}` comments. Dotted paths traverse map values.
//!
//! Rendering is a two-stage pipeline: the parsed template renders against a
//! [`Context`] to markup text, which is then leniently parsed into the typed
//! [`markup::Node`] tree. Nested-component placeholders travel through both
//! stages as [`Value::Slot`] markers and come out as [`markup::Node::Slot`]
//! variants, so the consumer grafts real content in with a typed tree walk.
//!
//! All structural errors are reported by [`Template::parse`]; rendering a
//! parsed template never fails (missing values render as nothing, markup
//! parsing is browser-lenient).

mod context;
mod error;
pub mod html;
mod parse;
mod render;
mod value;

pub use context::Context;
pub use error::TemplateError;
pub use html::parse_markup;
pub use value::{SlotId, Value};

pub mod markup {
    //! Typed output tree produced by rendering.
    pub use crate::html::{MarkupElement, Node};
}

/// A parsed, reusable template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    ast: Vec<parse::Ast>,
}

impl Template {
    /// Parses template source, validating section structure up front.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        Ok(Self { ast: parse::parse(source)? })
    }

    /// Renders against `context` and returns the typed markup tree.
    pub fn render(&self, context: &Context) -> Vec<markup::Node> {
        html::parse_markup(&self.render_to_string(context))
    }

    /// Renders against `context` and returns the raw markup text.
    pub fn render_to_string(&self, context: &Context) -> String {
        render::render(&self.ast, context)
    }
}
