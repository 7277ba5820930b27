use crate::error::TemplateError;

/// Dotted lookup path, e.g. `user.name`. `this` and `@index` are ordinary
/// segments resolved against the innermost iteration scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Path {
    pub(crate) segments: Vec<String>,
}

impl Path {
    fn parse(expr: &str, offset: usize) -> Result<Self, TemplateError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(TemplateError::EmptyExpression { offset });
        }
        let segments: Vec<String> = expr.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(TemplateError::EmptyExpression { offset });
        }
        Ok(Self { segments })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Ast {
    Text(String),
    Var { path: Path, raw: bool },
    If { path: Path, then_body: Vec<Ast>, else_body: Vec<Ast> },
    Each { path: Path, body: Vec<Ast> },
}

enum Token {
    Text(String),
    Var { path: Path, raw: bool },
    OpenIf(Path),
    OpenEach(Path),
    Else,
    CloseIf,
    CloseEach,
}

fn tokenize(source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0usize;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            tokens.push(Token::Text(rest[..start].to_string()));
        }
        let tag_offset = offset + start;
        let after_open = &rest[start + 2..];

        // Raw interpolation keeps triple-stash syntax.
        let (body, consumed, raw) = if let Some(inner) = after_open.strip_prefix('{') {
            let end = inner
                .find("}}}")
                .ok_or(TemplateError::UnterminatedTag { offset: tag_offset })?;
            (&inner[..end], start + 2 + 1 + end + 3, true)
        } else {
            let end = after_open
                .find("}}")
                .ok_or(TemplateError::UnterminatedTag { offset: tag_offset })?;
            (&after_open[..end], start + 2 + end + 2, false)
        };

        let trimmed = body.trim();
        if let Some(comment) = trimmed.strip_prefix('!') {
            let _ = comment; // comments render to nothing
        } else if let Some(section) = trimmed.strip_prefix('#') {
            let (name, expr) = match section.find(char::is_whitespace) {
                Some(split) => (&section[..split], &section[split..]),
                None => (section, ""),
            };
            match name {
                "if" => tokens.push(Token::OpenIf(Path::parse(expr, tag_offset)?)),
                "each" => tokens.push(Token::OpenEach(Path::parse(expr, tag_offset)?)),
                other => {
                    return Err(TemplateError::UnknownSection { name: other.to_string() })
                }
            }
        } else if let Some(close) = trimmed.strip_prefix('/') {
            match close.trim() {
                "if" => tokens.push(Token::CloseIf),
                "each" => tokens.push(Token::CloseEach),
                other => {
                    return Err(TemplateError::MismatchedClose {
                        expected: None,
                        found: other.to_string(),
                    })
                }
            }
        } else if trimmed == "else" {
            tokens.push(Token::Else);
        } else {
            tokens.push(Token::Var {
                path: Path::parse(trimmed, tag_offset)?,
                raw,
            });
        }

        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    Ok(tokens)
}

enum Frame {
    Root,
    If { path: Path, then_body: Vec<Ast>, in_else: bool, else_body: Vec<Ast> },
    Each { path: Path },
}

impl Frame {
    fn name(&self) -> Option<&'static str> {
        match self {
            Frame::Root => None,
            Frame::If { .. } => Some("if"),
            Frame::Each { .. } => Some("each"),
        }
    }
}

/// Parses the tokenized source into a section tree. Sections must be strictly
/// nested; an unbalanced close or a dangling open is a parse error.
pub(crate) fn parse(source: &str) -> Result<Vec<Ast>, TemplateError> {
    let tokens = tokenize(source)?;
    let mut frames: Vec<(Frame, Vec<Ast>)> = vec![(Frame::Root, Vec::new())];

    for token in tokens {
        match token {
            Token::Text(text) => current(&mut frames).push(Ast::Text(text)),
            Token::Var { path, raw } => current(&mut frames).push(Ast::Var { path, raw }),
            Token::OpenIf(path) => frames.push((
                Frame::If {
                    path,
                    then_body: Vec::new(),
                    in_else: false,
                    else_body: Vec::new(),
                },
                Vec::new(),
            )),
            Token::OpenEach(path) => frames.push((Frame::Each { path }, Vec::new())),
            Token::Else => {
                let (frame, body) = frames.last_mut().filter(|(f, _)| f.name() == Some("if"))
                    .ok_or(TemplateError::StrayElse)?;
                if let Frame::If { then_body, in_else, .. } = frame {
                    if *in_else {
                        return Err(TemplateError::StrayElse);
                    }
                    *then_body = std::mem::take(body);
                    *in_else = true;
                }
            }
            Token::CloseIf => {
                let (frame, body) = frames.pop().filter(|(f, _)| f.name() == Some("if")).ok_or(
                    TemplateError::MismatchedClose {
                        expected: None,
                        found: "if".to_string(),
                    },
                )?;
                if let Frame::If { path, mut then_body, in_else, mut else_body } = frame {
                    if in_else {
                        else_body = body;
                    } else {
                        then_body = body;
                    }
                    current(&mut frames).push(Ast::If { path, then_body, else_body });
                }
            }
            Token::CloseEach => {
                let (frame, body) = frames.pop().filter(|(f, _)| f.name() == Some("each")).ok_or(
                    TemplateError::MismatchedClose {
                        expected: None,
                        found: "each".to_string(),
                    },
                )?;
                if let Frame::Each { path } = frame {
                    current(&mut frames).push(Ast::Each { path, body });
                }
            }
        }
    }

    match frames.pop() {
        Some((Frame::Root, body)) if frames.is_empty() => Ok(body),
        Some((frame, _)) => Err(TemplateError::UnclosedSection {
            name: frame.name().unwrap_or("if").to_string(),
        }),
        None => Ok(Vec::new()),
    }
}

fn current<'a>(frames: &'a mut [(Frame, Vec<Ast>)]) -> &'a mut Vec<Ast> {
    &mut frames
        .last_mut()
        .expect("parser frame stack never empties before the root is popped")
        .1
}
