//! Application services for Trellis apps.
//!
//! Everything here is explicitly constructed and passed where it is needed:
//! the observable [`Store`], the [`Router`], and the auth layer
//! ([`AuthApi`] over a [`Transport`] seam, orchestrated by [`AuthService`]).
//! No globals, no hidden wiring.

pub mod api;
pub mod auth;
pub mod router;
pub mod store;

pub use api::{
    ApiError, AuthApi, Method, Request, Response, SignInRequest, SignUpRequest, Transport,
    TransportError, UserResponse,
};
pub use auth::AuthService;
pub use router::{routes, Router};
pub use store::{State, StateChange, Store, StoreEvent};
