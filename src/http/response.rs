//! Response mapping.
//!
//! # Responsibilities
//! - Forward upstream outcomes verbatim (status and JSON body)
//! - Map core failures to a 500 with a safe message
//!
//! # Design Decisions
//! - Diagnostic detail goes to the log, never to the client
//! - An upstream status that is not a valid HTTP status becomes 502

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::upstream::{DispatchError, Outcome};

/// Render an upstream outcome.
pub fn outcome_response(outcome: Outcome) -> Response {
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(outcome.data)).into_response()
}

/// Caller-facing error for a failed dispatch.
#[derive(Debug)]
pub struct ApiError {
    request_id: String,
    source: DispatchError,
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, source: DispatchError) -> Self {
        Self {
            request_id: request_id.into(),
            source,
        }
    }

    fn public_message(&self) -> &'static str {
        match self.source {
            DispatchError::AllVariantsExhausted { .. } => "All signature variants failed",
            _ => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(request_id = %self.request_id, error = %self.source, "Dispatch failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}
