//! Request identification.
//!
//! # Responsibilities
//! - Assign a UUID `x-request-id` to every inbound request lacking one
//! - Echo the id back on the response
//! - Expose the id to handlers for log correlation

use axum::http::{HeaderMap, HeaderName};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Wrap a router with request id assignment and propagation.
pub fn with_request_id(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}

/// The request id of an inbound request, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
