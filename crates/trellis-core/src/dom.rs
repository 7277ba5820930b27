//! In-memory DOM element bridge.
//!
//! There is no browser host; components own a lightweight element tree that
//! mirrors the native-element surface the engine needs: attributes, child
//! nodes, event listeners with a capture flag, inline styles for visibility
//! toggling, and HTML serialization for inspection. Operations here never
//! fail and never retry.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Host event delivered to listeners, carrying the event kind and an
/// optional payload value (e.g. the input text on `blur`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    kind: String,
    value: Option<String>,
}

impl DomEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), value: None }
    }

    pub fn with_value(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value.into()),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

pub type EventCallback = Rc<dyn Fn(&DomEvent)>;

struct Listener {
    event: String,
    capture: bool,
    callback: EventCallback,
}

/// A child position in an element: either another element or a text run.
#[derive(Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Detached list of nodes produced by a render pass, ready to be appended.
#[derive(Clone, Default)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

impl FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self { nodes: iter.into_iter().collect() }
    }
}

struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    children: Vec<Node>,
    listeners: Vec<Listener>,
}

/// Cheaply-cloneable handle to a mutable element. Every clone refers to the
/// same backing node, matching reference semantics of a native element.
#[derive(Clone)]
pub struct Element {
    data: Rc<RefCell<ElementData>>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            data: Rc::new(RefCell::new(ElementData {
                tag: tag.into(),
                attributes: IndexMap::new(),
                styles: IndexMap::new(),
                children: Vec::new(),
                listeners: Vec::new(),
            })),
        }
    }

    /// Identity comparison: do both handles point at the same node?
    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    pub fn tag(&self) -> String {
        self.data.borrow().tag.clone()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.data
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.data.borrow().attributes.get(name).cloned()
    }

    pub fn remove_attribute(&self, name: &str) {
        self.data.borrow_mut().attributes.shift_remove(name);
    }

    pub fn set_style(&self, property: impl Into<String>, value: impl Into<String>) {
        self.data
            .borrow_mut()
            .styles
            .insert(property.into(), value.into());
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.data.borrow().styles.get(property).cloned()
    }

    /// Makes the element visible again after [`Element::hide`].
    pub fn show(&self) {
        self.set_style("display", "block");
    }

    pub fn hide(&self) {
        self.set_style("display", "none");
    }

    pub fn clear_children(&self) {
        self.data.borrow_mut().children.clear();
    }

    pub fn append_node(&self, node: Node) {
        self.data.borrow_mut().children.push(node);
    }

    pub fn append_fragment(&self, fragment: Fragment) {
        self.data
            .borrow_mut()
            .children
            .extend(fragment.into_nodes());
    }

    pub fn child_count(&self) -> usize {
        self.data.borrow().children.len()
    }

    pub fn first_element_child(&self) -> Option<Element> {
        self.data.borrow().children.iter().find_map(|node| match node {
            Node::Element(el) => Some(el.clone()),
            Node::Text(_) => None,
        })
    }

    /// Depth-first search for a descendant element with the given attribute
    /// value. Test/debug addressing for `data-id`-stamped roots.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<Element> {
        if self.attribute(name).as_deref() == Some(value) {
            return Some(self.clone());
        }
        let children: Vec<Node> = self.data.borrow().children.clone();
        for node in children {
            if let Node::Element(el) = node {
                if let Some(found) = el.find_by_attribute(name, value) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Concatenated text content of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn add_listener(&self, event: impl Into<String>, capture: bool, callback: EventCallback) {
        self.data.borrow_mut().listeners.push(Listener {
            event: event.into(),
            capture,
            callback,
        });
    }

    /// Drops every attached listener. Called before each re-render so
    /// handlers are never bound twice.
    pub fn remove_listeners(&self) {
        self.data.borrow_mut().listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.data.borrow().listeners.len()
    }

    /// Delivers `event` to this element's listeners: capture listeners
    /// first, then bubble listeners, each group in registration order.
    pub fn dispatch(&self, event: &DomEvent) {
        let matching: Vec<(bool, EventCallback)> = self
            .data
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.event == event.kind())
            .map(|listener| (listener.capture, listener.callback.clone()))
            .collect();
        for (_, callback) in matching.iter().filter(|(capture, _)| *capture) {
            callback(event);
        }
        for (_, callback) in matching.iter().filter(|(capture, _)| !*capture) {
            callback(event);
        }
    }

    /// Serializes the subtree as HTML.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("Element")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("children", &data.children.len())
            .field("listeners", &data.listeners.len())
            .finish()
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn write_element(element: &Element, out: &mut String) {
    let data = element.data.borrow();
    out.push('<');
    out.push_str(&data.tag);
    for (name, value) in &data.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(value, out);
        out.push('"');
    }
    if !data.styles.is_empty() {
        out.push_str(" style=\"");
        for (i, (property, value)) in data.styles.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(property);
            out.push_str(": ");
            escape_into(value, out);
            out.push(';');
        }
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&data.tag.as_str()) {
        return;
    }
    for child in &data.children {
        match child {
            Node::Element(el) => write_element(el, out),
            Node::Text(text) => escape_into(text, out),
        }
    }
    out.push_str("</");
    out.push_str(&data.tag);
    out.push('>');
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.data.borrow().children {
        match child {
            Node::Element(el) => collect_text(el, out),
            Node::Text(text) => out.push_str(text),
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DomEvent, Element, Fragment, Node};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn append_and_serialize() {
        let root = Element::new("div");
        root.set_attribute("class", "card");
        let inner = Element::new("span");
        inner.append_node(Node::Text("hi & bye".to_string()));
        let mut fragment = Fragment::new();
        fragment.push(Node::Element(inner));
        root.append_fragment(fragment);
        assert_eq!(
            root.outer_html(),
            r#"<div class="card"><span>hi &amp; bye</span></div>"#
        );
    }

    #[test]
    fn first_element_child_skips_text() {
        let root = Element::new("div");
        root.append_node(Node::Text("leading".to_string()));
        let inner = Element::new("button");
        root.append_node(Node::Element(inner.clone()));
        let found = root.first_element_child().expect("element child");
        assert!(found.same_node(&inner));
    }

    #[test]
    fn capture_listeners_run_before_bubble_listeners() {
        let element = Element::new("input");
        let order = Rc::new(RefCell::new(Vec::new()));
        {
            let order = order.clone();
            element.add_listener("blur", false, Rc::new(move |_| order.borrow_mut().push("bubble")));
        }
        {
            let order = order.clone();
            element.add_listener("blur", true, Rc::new(move |_| order.borrow_mut().push("capture")));
        }
        element.dispatch(&DomEvent::new("blur"));
        assert_eq!(*order.borrow(), vec!["capture", "bubble"]);
    }

    #[test]
    fn remove_listeners_detaches_everything() {
        let element = Element::new("button");
        let hits = Rc::new(RefCell::new(0u32));
        {
            let hits = hits.clone();
            element.add_listener("click", false, Rc::new(move |_| *hits.borrow_mut() += 1));
        }
        element.remove_listeners();
        element.dispatch(&DomEvent::new("click"));
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(element.listener_count(), 0);
    }

    #[test]
    fn show_and_hide_toggle_display() {
        let element = Element::new("div");
        element.hide();
        assert_eq!(element.style("display").as_deref(), Some("none"));
        assert!(element.outer_html().contains(r#"style="display: none;""#));
        element.show();
        assert_eq!(element.style("display").as_deref(), Some("block"));
    }

    #[test]
    fn dispatch_only_reaches_matching_event_kind() {
        let element = Element::new("input");
        let hits = Rc::new(RefCell::new(0u32));
        {
            let hits = hits.clone();
            element.add_listener("blur", true, Rc::new(move |_| *hits.borrow_mut() += 1));
        }
        element.dispatch(&DomEvent::new("click"));
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn find_by_attribute_walks_depth_first() {
        let root = Element::new("div");
        let nested = Element::new("section");
        let target = Element::new("span");
        target.set_attribute("data-id", "42");
        nested.append_node(Node::Element(target.clone()));
        root.append_node(Node::Element(nested));
        let found = root.find_by_attribute("data-id", "42").expect("descendant");
        assert!(found.same_node(&target));
    }
}
