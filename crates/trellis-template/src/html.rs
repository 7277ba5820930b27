//! Lenient markup parsing.
//!
//! Rendered template text is parsed into a typed node tree the way a browser
//! would ingest `innerHTML`: unknown constructs are skipped, unclosed
//! elements auto-close at end of input, stray close tags are ignored. This
//! stage never fails; structural template problems are caught earlier by
//! [`Template::parse`](crate::Template::parse).

use indexmap::IndexMap;

use crate::value::SlotId;

/// Typed markup node. [`Node::Slot`] survives parsing as its own variant so
/// placeholder grafting is a tree walk, not attribute matching.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(MarkupElement),
    Text(String),
    Slot(SlotId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

/// Elements that never carry children and take no close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parses markup text into a list of root nodes.
pub fn parse_markup(input: &str) -> Vec<Node> {
    let mut parser = Parser { input, pos: 0 };
    let mut stack: Vec<MarkupElement> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    while let Some(piece) = parser.next_piece() {
        match piece {
            Piece::Text(text) => {
                if !text.trim().is_empty() {
                    push_node(&mut stack, &mut roots, Node::Text(unescape(&text)));
                }
            }
            Piece::Open { tag, attrs, self_closing } => {
                if tag == "slot" {
                    if let Some(id) = attrs.get("data-slot-id").and_then(|v| v.parse().ok()) {
                        push_node(&mut stack, &mut roots, Node::Slot(id));
                        continue;
                    }
                }
                if self_closing || is_void(&tag) {
                    push_node(&mut stack, &mut roots, Node::Element(MarkupElement {
                        tag,
                        attrs,
                        children: Vec::new(),
                    }));
                } else {
                    stack.push(MarkupElement { tag, attrs, children: Vec::new() });
                }
            }
            Piece::Close(tag) => {
                if tag == "slot" {
                    // Slot close tags were consumed with the marker itself.
                    continue;
                }
                if let Some(depth) = stack.iter().rposition(|open| open.tag == tag) {
                    // Auto-close anything left open inside the matched element.
                    while stack.len() > depth + 1 {
                        let inner = stack.pop().map(Node::Element);
                        if let Some(inner) = inner {
                            push_node(&mut stack, &mut roots, inner);
                        }
                    }
                    if let Some(closed) = stack.pop() {
                        push_node(&mut stack, &mut roots, Node::Element(closed));
                    }
                }
                // Unmatched close tags are ignored, browser-style.
            }
        }
    }

    // Auto-close everything still open at end of input.
    while let Some(open) = stack.pop() {
        push_node(&mut stack, &mut roots, Node::Element(open));
    }
    roots
}

fn push_node(stack: &mut [MarkupElement], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => roots.push(node),
    }
}

enum Piece {
    Text(String),
    Open { tag: String, attrs: IndexMap<String, String>, self_closing: bool },
    Close(String),
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn next_piece(&mut self) -> Option<Piece> {
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }
            if let Some(stripped) = rest.strip_prefix("<!--") {
                match stripped.find("-->") {
                    Some(end) => {
                        self.pos += 4 + end + 3;
                        continue;
                    }
                    None => {
                        self.pos = self.input.len();
                        return None;
                    }
                }
            }
            if rest.starts_with("<!") {
                let skip = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
                self.pos += skip;
                continue;
            }
            if let Some(stripped) = rest.strip_prefix("</") {
                let end = stripped.find('>').unwrap_or(stripped.len());
                let tag = stripped[..end].trim().to_ascii_lowercase();
                self.pos += 2 + end + 1.min(stripped.len() - end);
                return Some(Piece::Close(tag));
            }
            if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                return Some(self.parse_open_tag());
            }
            if rest.starts_with('<') {
                // A lone '<' that opens nothing: treat it as text.
                let end = rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len());
                self.pos += end;
                return Some(Piece::Text(rest[..end].to_string()));
            }
            let end = rest.find('<').unwrap_or(rest.len());
            self.pos += end;
            return Some(Piece::Text(rest[..end].to_string()));
        }
    }

    fn parse_open_tag(&mut self) -> Piece {
        let rest = self.rest();
        let body_end = rest.find('>').unwrap_or(rest.len());
        let body = &rest[1..body_end];
        self.pos += body_end + if body_end < rest.len() { 1 } else { 0 };

        let (body, self_closing) = match body.strip_suffix('/') {
            Some(stripped) => (stripped, true),
            None => (body, false),
        };

        let mut chars = body.char_indices();
        let name_end = chars
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        let tag = body[..name_end].to_ascii_lowercase();
        let attrs = parse_attrs(&body[name_end..]);
        Piece::Open { tag, attrs, self_closing }
    }
}

fn parse_attrs(input: &str) -> IndexMap<String, String> {
    let mut attrs = IndexMap::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = input[name_start..i].to_ascii_lowercase();
        if name.is_empty() {
            i += 1;
            continue;
        }
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                let value = &input[value_start..i];
                if i < bytes.len() {
                    i += 1; // closing quote
                }
                value
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                &input[value_start..i]
            };
            attrs.insert(name, unescape(value));
        } else {
            // Bare attribute, e.g. `disabled`.
            attrs.insert(name, String::new());
        }
    }
    attrs
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
