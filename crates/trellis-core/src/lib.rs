//! Component lifecycle and reactivity engine for the Trellis framework.
//!
//! The engine is the contract everything else consumes: a [`Component`] owns
//! a backing [`dom::Element`], reactive [`Props`] with explicit
//! change-detecting setters, typed child/list maps, and a private
//! synchronous [`EventBus`] that sequences INIT → RENDER → MOUNT → UPDATE.
//! Rendering compiles a [`trellis_template::Template`] against the live
//! props, with nested components standing in as typed slot markers that are
//! grafted over with real content in a second pass.
//!
//! Everything is single-threaded and synchronous: there is no task queue and
//! no deferral; an update triggered by [`Component::set_props`] finishes its
//! re-render before the call returns.

pub mod component;
pub mod dom;
pub mod event_bus;
pub mod props;

pub use component::{
    Behavior, Component, ComponentId, ComponentSpec, DefaultBehavior, Lifecycle,
    LifecyclePayload, MountRenderPolicy, Settings,
};
pub use dom::{DomEvent, Element, EventCallback, Fragment, Node};
pub use event_bus::EventBus;
pub use props::{Changed, Props, PropsError, RESERVED_PREFIX};
