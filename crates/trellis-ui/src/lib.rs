//! Concrete form components for the Trellis engine.
//!
//! Each constructor parses its template once, fixes the settings the
//! component's markup depends on, and hands the caller a plain
//! [`Component`](trellis_core::Component) handle. Callers supply props and
//! event bindings through the usual
//! [`ComponentSpec`](trellis_core::ComponentSpec) builder.

mod button;
mod input;
mod link;

pub use button::button;
pub use input::input;
pub use link::link;
