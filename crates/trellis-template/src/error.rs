use std::fmt;

/// Structural template errors. All of these are reported by
/// [`Template::parse`](crate::Template::parse); rendering itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{` with no matching `}}` before the end of the source.
    UnterminatedTag { offset: usize },
    /// A section opener (`{{#if …}}`/`{{#each …}}`) with no matching close.
    UnclosedSection { name: String },
    /// A `{{/…}}` that does not match the innermost open section.
    MismatchedClose { expected: Option<String>, found: String },
    /// `{{else}}` outside an `{{#if}}` section.
    StrayElse,
    /// A tag with an empty or malformed expression, e.g. `{{}}` or `{{#if}}`.
    EmptyExpression { offset: usize },
    /// A section helper the engine does not implement, e.g. `{{#unless …}}`.
    UnknownSection { name: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnterminatedTag { offset } => {
                write!(f, "unterminated tag at byte {offset}")
            }
            TemplateError::UnclosedSection { name } => {
                write!(f, "section {{{{#{name}}}}} is never closed")
            }
            TemplateError::MismatchedClose { expected, found } => match expected {
                Some(expected) => write!(
                    f,
                    "close tag {{{{/{found}}}}} does not match open section {{{{#{expected}}}}}"
                ),
                None => write!(f, "close tag {{{{/{found}}}}} with no open section"),
            },
            TemplateError::StrayElse => write!(f, "{{{{else}}}} outside of an if section"),
            TemplateError::EmptyExpression { offset } => {
                write!(f, "empty expression in tag at byte {offset}")
            }
            TemplateError::UnknownSection { name } => {
                write!(f, "unknown section helper {{{{#{name}}}}}")
            }
        }
    }
}

impl std::error::Error for TemplateError {}
