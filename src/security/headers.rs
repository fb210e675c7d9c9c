//! Security response headers.
//!
//! # Responsibilities
//! - Add nosniff, frame, referrer and HSTS headers to every response
//! - Leave headers set by handlers untouched

use axum::http::{header, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

const HSTS: &str = "max-age=15552000; includeSubDomains";

/// Headers added to every response, as (name, value).
pub fn security_headers() -> [(header::HeaderName, HeaderValue); 4] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS)),
    ]
}

/// Wrap a router so every response carries the security headers.
pub fn with_security_headers(mut router: Router) -> Router {
    for (name, value) in security_headers() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }
    router
}
