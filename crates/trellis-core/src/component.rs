//! Component lifecycle controller.
//!
//! Every component instance runs the same state machine: construction wires
//! the lifecycle bus and fires INIT, INIT creates the backing element and
//! fires RENDER, the owner fires MOUNTED once the content is attached to a
//! live tree, and prop merges that really change something fire UPDATED
//! followed by a synchronous re-RENDER. All of it is in-line and
//! single-threaded; control only returns to the caller once the transition
//! chain has settled.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use trellis_template::{markup, Context, Template, Value};

use crate::dom::{DomEvent, Element, EventCallback, Fragment, Node};
use crate::event_bus::EventBus;
use crate::props::{Changed, Props, PropsError};

/// Process-unique component identity. Never reused, never changes.
pub type ComponentId = u64;

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_component_id() -> ComponentId {
    NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle events carried by the per-component bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Init,
    Render,
    Mounted,
    Updated,
}

/// Payload attached to a lifecycle emission. Only UPDATED carries data:
/// the prop snapshots from before and after the merge.
#[derive(Debug, Clone)]
pub enum LifecyclePayload {
    Empty,
    PropChange { old: Props, new: Props },
}

/// When a freshly mounted component should run a bonus render.
///
/// The original engine re-rendered on mount whenever the component had
/// children, to cover children acquired after the initial render. The exact
/// trigger is policy here rather than a hard-coded conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountRenderPolicy {
    /// Re-render after mount iff the component currently has children.
    #[default]
    WhenChildrenPresent,
    Always,
    Never,
}

/// Per-component configuration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    /// Stamp the component id on the root element as `data-id` for
    /// test/debug addressing.
    pub with_internal_id: bool,
    /// The template root is the real node: after render, the tracked
    /// element collapses to the first rendered child element.
    pub is_simple: bool,
    pub mount_render: MountRenderPolicy,
}

/// Extension seam implemented by concrete components.
///
/// Hooks default to inert implementations: a component with no template
/// renders nothing, and the update predicate re-renders on any change.
pub trait Behavior {
    /// Produces this render pass's content, typically via
    /// [`Component::compile`].
    fn render(&self, host: &Component) -> Option<Fragment> {
        let _ = host;
        None
    }

    /// Runs when the component's content has been attached to a live tree.
    fn mounted(&self, host: &Component) {
        let _ = host;
    }

    /// Decides whether a prop change is externally meaningful enough to
    /// warrant a re-render.
    fn has_updated(&self, old: &Props, new: &Props) -> bool {
        let _ = (old, new);
        true
    }
}

/// The inert behavior used by plain container components.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehavior;

impl Behavior for DefaultBehavior {}

/// Typed construction input. The original engine classified one ambiguous
/// map by runtime shape inspection; here every key lands in exactly one
/// bucket because the builder has one method per bucket.
#[derive(Default)]
pub struct ComponentSpec {
    props: Vec<(String, Value)>,
    children: IndexMap<String, Component>,
    lists: IndexMap<String, Vec<Component>>,
    events: IndexMap<String, EventCallback>,
    attrs: IndexMap<String, Value>,
    settings: Settings,
}

impl ComponentSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain prop value.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.push((key.into(), value.into()));
        self
    }

    /// Adds a single nested component.
    pub fn child(mut self, key: impl Into<String>, component: Component) -> Self {
        self.children.insert(key.into(), component);
        self
    }

    /// Adds an ordered sequence of nested components.
    pub fn list(
        mut self,
        key: impl Into<String>,
        items: impl IntoIterator<Item = Component>,
    ) -> Self {
        self.lists.insert(key.into(), items.into_iter().collect());
        self
    }

    /// Binds a native event handler, e.g. `on("click", …)`. `blur` handlers
    /// are attached in capture mode.
    pub fn on(mut self, event: impl Into<String>, callback: impl Fn(&DomEvent) + 'static) -> Self {
        self.events.insert(event.into(), Rc::new(callback));
        self
    }

    /// Adds an HTML attribute applied to the root element on every render.
    /// Attributes live in props under the `attrs` key, so later
    /// [`Component::set_props`] merges can replace them.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

struct ComponentInner {
    id: ComponentId,
    tag_name: String,
    settings: Settings,
    props: RefCell<Props>,
    children: RefCell<IndexMap<String, Component>>,
    lists: RefCell<IndexMap<String, Vec<Component>>>,
    events: RefCell<IndexMap<String, EventCallback>>,
    element: RefCell<Option<Element>>,
    pending_update: Cell<bool>,
    bus: EventBus<Lifecycle, LifecyclePayload>,
    behavior: Rc<dyn Behavior>,
}

/// Handle to a component instance. Clones share the instance, matching the
/// reference semantics children and owners need.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Constructs the component and synchronously runs INIT → RENDER.
    pub fn new(tag_name: &str, spec: ComponentSpec, behavior: impl Behavior + 'static) -> Self {
        let ComponentSpec { props, children, lists, events, attrs, settings } = spec;
        let id = next_component_id();

        let mut initial = Props::new();
        for (key, value) in props {
            initial.seed_internal(&key, value);
        }
        if !attrs.is_empty() {
            let map: IndexMap<String, Value> = attrs.into_iter().collect();
            initial.seed_internal("attrs", Value::Map(map));
        }
        initial.seed_internal("__id", i64::try_from(id).unwrap_or(i64::MAX));

        let component = Self {
            inner: Rc::new(ComponentInner {
                id,
                tag_name: tag_name.to_string(),
                settings,
                props: RefCell::new(initial),
                children: RefCell::new(children),
                lists: RefCell::new(lists),
                events: RefCell::new(events),
                element: RefCell::new(None),
                pending_update: Cell::new(false),
                bus: EventBus::new(),
                behavior: Rc::new(behavior),
            }),
        };
        component.register_lifecycle();
        component.inner.bus.emit(&Lifecycle::Init, &LifecyclePayload::Empty);
        component
    }

    /// A component with no hooks and no template; renders nothing itself and
    /// exists to host children/attributes.
    pub fn plain(tag_name: &str, spec: ComponentSpec) -> Self {
        Self::new(tag_name, spec, DefaultBehavior)
    }

    pub fn id(&self) -> ComponentId {
        self.inner.id
    }

    pub fn tag_name(&self) -> &str {
        &self.inner.tag_name
    }

    pub fn settings(&self) -> Settings {
        self.inner.settings
    }

    /// The backing element, present once INIT has completed.
    pub fn content(&self) -> Option<Element> {
        self.inner.element.borrow().clone()
    }

    /// Snapshot of the current props.
    pub fn props(&self) -> Props {
        self.inner.props.borrow().clone()
    }

    pub fn prop(&self, key: &str) -> Option<Value> {
        self.inner.props.borrow().get(key).cloned()
    }

    /// Whether a prop write changed something since the last UPDATED
    /// emission. Reset after every emission.
    pub fn has_pending_update(&self) -> bool {
        self.inner.pending_update.get()
    }

    pub fn child_keys(&self) -> Vec<String> {
        self.inner.children.borrow().keys().cloned().collect()
    }

    pub fn show(&self) {
        if let Some(element) = self.content() {
            element.show();
        }
    }

    pub fn hide(&self) {
        if let Some(element) = self.content() {
            element.hide();
        }
    }

    /// Shallow-merges `patch` into the component: new keys are added,
    /// existing keys overwritten, untouched keys kept. Event bindings and
    /// settings are fixed at construction and ignored here. If any prop
    /// value really changed, the update predicate decides whether UPDATED →
    /// RENDER runs — synchronously, before this returns.
    pub fn set_props(&self, patch: ComponentSpec) -> Result<(), PropsError> {
        self.inner.pending_update.set(false);
        let old_props = self.inner.props.borrow().clone();

        {
            let mut props = self.inner.props.borrow_mut();
            for (key, value) in patch.props {
                if props.set(&key, value)? == Changed::Yes {
                    self.inner.pending_update.set(true);
                }
            }
            if !patch.attrs.is_empty() {
                let map: IndexMap<String, Value> = patch.attrs.into_iter().collect();
                if props.set("attrs", Value::Map(map))? == Changed::Yes {
                    self.inner.pending_update.set(true);
                }
            }
        }

        {
            let mut children = self.inner.children.borrow_mut();
            for (key, child) in patch.children {
                let changed = children
                    .get(&key)
                    .map_or(true, |existing| !existing.same_instance(&child));
                children.insert(key, child);
                if changed {
                    self.inner.pending_update.set(true);
                }
            }
        }

        // Lists were not change-tracked in the original engine either; a
        // list-only merge does not schedule an update on its own.
        self.inner.lists.borrow_mut().extend(patch.lists);

        if self.inner.pending_update.get() {
            let new_props = self.inner.props.borrow().clone();
            self.inner.bus.emit(
                &Lifecycle::Updated,
                &LifecyclePayload::PropChange { old: old_props, new: new_props },
            );
            self.inner.pending_update.set(false);
        }
        Ok(())
    }

    /// Signals that this component's content is attached to a live tree.
    /// Runs the mount hook, then mounts every child in declaration order
    /// (lists are grafted content, not mounted recursively), then applies
    /// the configured mount-render policy.
    pub fn dispatch_mounted(&self) {
        self.inner.bus.emit(&Lifecycle::Mounted, &LifecyclePayload::Empty);

        let rerender = match self.inner.settings.mount_render {
            MountRenderPolicy::WhenChildrenPresent => !self.inner.children.borrow().is_empty(),
            MountRenderPolicy::Always => true,
            MountRenderPolicy::Never => false,
        };
        if rerender {
            self.inner.bus.emit(&Lifecycle::Render, &LifecyclePayload::Empty);
        }
    }

    /// Compiles `template` against the live props, with child and list
    /// placeholders resolved to the components' current content.
    pub fn compile(&self, template: &Template) -> Fragment {
        let mut context = Context::new();
        for (key, value) in self.inner.props.borrow().iter() {
            context.insert(key, value.clone());
        }
        self.compile_into(template, context)
    }

    /// Compile variant with an explicit prop context. Values are deep
    /// copies of the given props; nested components still come from the
    /// live children/lists maps (they are identity-bound to their markers
    /// and never copied).
    pub fn compile_with(&self, template: &Template, props: &Props) -> Fragment {
        let mut context = Context::new();
        for (key, value) in props.iter() {
            context.insert(key, value.clone());
        }
        self.compile_into(template, context)
    }

    fn compile_into(&self, template: &Template, mut context: Context) -> Fragment {
        for (key, child) in self.inner.children.borrow().iter() {
            context.insert(key, Value::Slot(child.id()));
        }
        for (key, list) in self.inner.lists.borrow().iter() {
            let slots: Vec<Value> = list.iter().map(|item| Value::Slot(item.id())).collect();
            context.insert(key, Value::List(slots));
        }

        let rendered = template.render(&context);
        let mut fragment = Fragment::new();
        for node in rendered {
            if let Some(node) = self.graft(node) {
                fragment.push(node);
            }
        }
        fragment
    }

    /// Converts one rendered markup node into a live DOM node, splicing
    /// child content over slot markers. A slot whose component has no
    /// content yet resolves to nothing, so the returned tree never contains
    /// leftover markers.
    fn graft(&self, node: markup::Node) -> Option<Node> {
        match node {
            markup::Node::Text(text) => Some(Node::Text(text)),
            markup::Node::Slot(id) => self.slot_content(id).map(Node::Element),
            markup::Node::Element(el) => {
                let element = Element::new(el.tag);
                for (name, value) in el.attrs {
                    element.set_attribute(name, value);
                }
                for child in el.children {
                    if let Some(child) = self.graft(child) {
                        element.append_node(child);
                    }
                }
                Some(Node::Element(element))
            }
        }
    }

    fn slot_content(&self, id: ComponentId) -> Option<Element> {
        if let Some(child) = self.inner.children.borrow().values().find(|c| c.id() == id) {
            return child.content();
        }
        self.inner
            .lists
            .borrow()
            .values()
            .flatten()
            .find(|item| item.id() == id)
            .and_then(Component::content)
    }

    pub fn same_instance(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn register_lifecycle(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.bus.on(Lifecycle::Init, with_component(&weak, |component, _| {
            component.on_init();
        }));
        let weak = Rc::downgrade(&self.inner);
        self.inner.bus.on(Lifecycle::Render, with_component(&weak, |component, _| {
            component.on_render();
        }));
        let weak = Rc::downgrade(&self.inner);
        self.inner.bus.on(Lifecycle::Mounted, with_component(&weak, |component, _| {
            component.on_mounted();
        }));
        let weak = Rc::downgrade(&self.inner);
        self.inner.bus.on(Lifecycle::Updated, with_component(&weak, |component, payload| {
            if let LifecyclePayload::PropChange { old, new } = payload {
                component.on_updated(old, new);
            }
        }));
    }

    fn on_init(&self) {
        log::trace!("component {} init ({})", self.inner.id, self.inner.tag_name);
        let element = Element::new(self.inner.tag_name.clone());
        if self.inner.settings.with_internal_id {
            element.set_attribute("data-id", self.inner.id.to_string());
        }
        *self.inner.element.borrow_mut() = Some(element);
        self.inner.bus.emit(&Lifecycle::Render, &LifecyclePayload::Empty);
    }

    fn on_render(&self) {
        log::trace!("component {} render", self.inner.id);
        let behavior = Rc::clone(&self.inner.behavior);
        let block = behavior.render(self);

        let Some(element) = self.content() else {
            return;
        };
        // Strict order: detach listeners, clear content, append, attrs,
        // re-attach. Reordering any of these double-binds or drops state.
        element.remove_listeners();
        element.clear_children();
        if let Some(fragment) = block {
            element.append_fragment(fragment);
            if self.inner.settings.is_simple {
                // Wrapper-less component: the first rendered child element
                // becomes the tracked node.
                *self.inner.element.borrow_mut() = element.first_element_child();
            }
        }
        self.apply_attributes();
        self.attach_listeners();
    }

    fn on_mounted(&self) {
        log::trace!("component {} mounted", self.inner.id);
        let behavior = Rc::clone(&self.inner.behavior);
        behavior.mounted(self);
        let children: Vec<Component> = self.inner.children.borrow().values().cloned().collect();
        for child in children {
            child.dispatch_mounted();
        }
    }

    fn on_updated(&self, old: &Props, new: &Props) {
        let rerender = self.inner.behavior.has_updated(old, new);
        log::debug!("component {} updated, rerender={rerender}", self.inner.id);
        if rerender {
            self.inner.bus.emit(&Lifecycle::Render, &LifecyclePayload::Empty);
        }
    }

    fn apply_attributes(&self) {
        let Some(element) = self.content() else {
            return;
        };
        if let Some(Value::Map(attrs)) = self.inner.props.borrow().get("attrs") {
            for (name, value) in attrs {
                element.set_attribute(name.clone(), value.to_string());
            }
        }
    }

    fn attach_listeners(&self) {
        let Some(element) = self.content() else {
            return;
        };
        for (event, callback) in self.inner.events.borrow().iter() {
            // blur must fire on the element before its children lose focus,
            // so it is the one handler kind registered in capture mode.
            let capture = event == "blur";
            element.add_listener(event.clone(), capture, callback.clone());
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("tag", &self.inner.tag_name)
            .field("children", &self.inner.children.borrow().len())
            .field("mounted_element", &self.inner.element.borrow().is_some())
            .finish()
    }
}

fn with_component(
    weak: &Weak<ComponentInner>,
    f: impl Fn(&Component, &LifecyclePayload) + 'static,
) -> impl Fn(&LifecyclePayload) + 'static {
    let weak = weak.clone();
    move |payload| {
        if let Some(inner) = weak.upgrade() {
            f(&Component { inner }, payload);
        }
    }
}
