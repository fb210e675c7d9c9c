//! Cross-origin policy for the dashboard.
//!
//! Two pieces: the CORS layer answers preflights and decorates responses,
//! and [`origin_guard`] refuses requests from unlisted origins before any
//! handler runs, so they never trigger a signed upstream call.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Origins permitted to call the gateway.
#[derive(Debug, Clone)]
pub struct AllowedOrigins(Arc<[HeaderValue]>);

impl AllowedOrigins {
    /// Entries that are not valid header values are skipped with a warning.
    pub fn from_config(config: &CorsConfig) -> Self {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        Self(origins.into())
    }

    pub fn contains(&self, origin: &HeaderValue) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }
}

/// Build the CORS layer from configured origins.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.0.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Reject requests whose `Origin` is not allowed.
///
/// Requests without an `Origin` header (curl, server-to-server) pass.
pub async fn origin_guard(
    State(origins): State<AllowedOrigins>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let refused = match request.headers().get(header::ORIGIN) {
        Some(origin) if !origins.contains(origin) => Some(format!("{:?}", origin)),
        _ => None,
    };

    match refused {
        Some(origin) => {
            tracing::warn!(
                origin = %origin,
                path = %request.uri().path(),
                "Rejected request from disallowed origin"
            );
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "CORS not allowed" })),
            )
                .into_response()
        }
        None => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_skip_invalid_entries() {
        let config = CorsConfig {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "bad\norigin".to_string(),
            ],
        };
        let origins = AllowedOrigins::from_config(&config);

        assert!(origins.contains(&HeaderValue::from_static("http://localhost:3000")));
        assert!(!origins.contains(&HeaderValue::from_static("http://localhost:3001")));
        assert_eq!(origins.0.len(), 1);
    }
}
