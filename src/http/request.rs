//! Correlation identifiers and the per-request context that carries them.
//!
//! # Responsibilities
//! - Resolve the request ID from `X-Request-Id` or mint a UUID v4
//! - Carry it to handlers as an explicit [`RequestContext`]
//!
//! The boundary middleware stores the context in request extensions; the
//! extractor hands it to handlers, which pass it on by reference. Nothing is
//! kept in thread-locals, so a reused worker cannot observe a previous
//! request's identifier.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

/// Header read from requests and written to every response.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Opaque correlation identifier for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// The caller-supplied identifier, if present, printable and non-blank.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .map(|value| Self(value.into()))
    }

    /// Forward the caller's identifier or mint a new one.
    pub fn resolve(headers: &HeaderMap) -> Self {
        Self::from_headers(headers).unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cross-cutting values scoped to a single request.
///
/// Immutable once built. A detached context (no boundary ran) carries no
/// identifier, and downstream code treats the identifier as optional.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: Option<RequestId>,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id: Some(request_id),
        }
    }

    /// A context with no correlation identifier.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
