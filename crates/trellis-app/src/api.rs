//! Auth HTTP surface.
//!
//! The wire layer is behind the [`Transport`] seam so services stay testable
//! without network I/O; the demo wires a canned transport, a real host would
//! wire fetch/XHR.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request/response body: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), body: None }
    }

    pub fn post(path: impl Into<String>, body: Option<String>) -> Self {
        Self { method: Method::Post, path: path.into(), body }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn server_error(&self) -> bool {
        self.status >= 500
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Delivery seam: send one request, get one response. Transport-level
/// failures (no connection, aborted) are distinct from non-2xx responses.
pub trait Transport {
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignUpRequest {
    pub first_name: String,
    pub second_name: String,
    pub login: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub display_name: Option<String>,
    pub login: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
}

/// Failure body shape used by the backend for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReason {
    pub reason: String,
}

/// Thin wrappers over the auth endpoints. One method per endpoint, no
/// interpretation of the response beyond delivery.
pub struct AuthApi<T: Transport> {
    transport: T,
}

impl<T: Transport> AuthApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn sign_in(&self, credentials: &SignInRequest) -> Result<Response, ApiError> {
        self.post_json("/auth/signin", credentials)
    }

    pub fn sign_up(&self, registration: &SignUpRequest) -> Result<Response, ApiError> {
        self.post_json("/auth/signup", registration)
    }

    pub fn user(&self) -> Result<Response, ApiError> {
        Ok(self.transport.send(&Request::get("/auth/user"))?)
    }

    pub fn logout(&self) -> Result<Response, ApiError> {
        Ok(self.transport.send(&Request::post("/auth/logout", None))?)
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        let body = serde_json::to_string(body)?;
        Ok(self.transport.send(&Request::post(path, Some(body)))?)
    }
}
