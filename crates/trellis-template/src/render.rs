use std::fmt::Write as _;

use crate::context::Context;
use crate::parse::{Ast, Path};
use crate::value::Value;

/// One `{{#each}}` iteration frame.
struct Scope<'a> {
    this: &'a Value,
    index: usize,
}

pub(crate) fn render(ast: &[Ast], context: &Context) -> String {
    let mut out = String::new();
    let mut scopes: Vec<Scope<'_>> = Vec::new();
    render_nodes(ast, context, &mut scopes, &mut out);
    out
}

fn render_nodes<'a>(
    nodes: &'a [Ast],
    context: &'a Context,
    scopes: &mut Vec<Scope<'a>>,
    out: &mut String,
) {
    for node in nodes {
        match node {
            Ast::Text(text) => out.push_str(text),
            Ast::Var { path, raw } => render_var(path, context, scopes, *raw, out),
            Ast::If { path, then_body, else_body } => {
                let truthy = resolve(path, context, scopes)
                    .map(Value::is_truthy)
                    .unwrap_or(false);
                let body = if truthy { then_body } else { else_body };
                render_nodes(body, context, scopes, out);
            }
            Ast::Each { path, body } => {
                let Some(Value::List(items)) = resolve(path, context, scopes) else {
                    continue;
                };
                for (index, item) in items.iter().enumerate() {
                    scopes.push(Scope { this: item, index });
                    render_nodes(body, context, scopes, out);
                    scopes.pop();
                }
            }
        }
    }
}

fn render_var(
    path: &Path,
    context: &Context,
    scopes: &[Scope<'_>],
    raw: bool,
    out: &mut String,
) {
    // @index is the only value that lives on the iteration frame itself.
    if path.segments.len() == 1 && path.segments[0] == "@index" {
        if let Some(scope) = scopes.last() {
            let _ = write!(out, "{}", scope.index);
        }
        return;
    }
    let Some(value) = resolve(path, context, scopes) else {
        return;
    };
    render_value(value, raw, out);
}

fn render_value(value: &Value, raw: bool, out: &mut String) {
    match value {
        // Slot markers are emitted as markup regardless of escaping so the
        // lenient parser can turn them back into typed nodes.
        Value::Slot(id) => {
            let _ = write!(out, "<slot data-slot-id=\"{id}\"></slot>");
        }
        Value::List(items) => {
            for item in items {
                render_value(item, raw, out);
            }
        }
        other => {
            let text = other.to_string();
            if raw {
                out.push_str(&text);
            } else {
                escape_into(&text, out);
            }
        }
    }
}

/// Walks iteration scopes innermost-first, then falls back to the root
/// context. `this` and `@index` address the innermost scope directly.
fn resolve<'a>(path: &Path, context: &'a Context, scopes: &[Scope<'a>]) -> Option<&'a Value> {
    let mut segments = path.segments.iter().map(String::as_str);
    let head = segments.next()?;

    let mut value = match head {
        "this" => Some(scopes.last()?.this),
        // @index is handled by render_var; it never resolves to a borrowed value.
        "@index" => None,
        name => {
            let mut found = None;
            for scope in scopes.iter().rev() {
                if let Some(field) = scope.this.field(name) {
                    found = Some(field);
                    break;
                }
            }
            found.or_else(|| context.get(name))
        }
    }?;

    for segment in segments {
        value = value.field(segment)?;
    }
    Some(value)
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}
