//! Route handlers for the transaction endpoints.
//!
//! Each dispatch runs on its own task. A dropped inbound request (client
//! disconnect, request timeout) never cuts the variant loop short.

use std::future::Future;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::request::request_id;
use crate::http::response::{outcome_response, ApiError};
use crate::http::server::AppState;
use crate::transactions::DEFAULT_PAGE;
use crate::upstream::{DispatchError, Outcome};

/// `?p=` page selector.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub p: Option<u32>,
}

/// Body of `POST /api/transactions/search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub page: Option<u32>,
}

#[derive(Serialize)]
pub struct Health {
    pub ok: bool,
}

pub async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

/// `GET /api/transactions?p=N`
pub async fn list_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let request_id = request_id(&headers);
    let page = page.p.unwrap_or(DEFAULT_PAGE);

    tracing::info!(request_id = %request_id, page = page, "Listing transactions");

    let api = state.api.clone();
    run_detached(request_id, async move { api.list(page).await }).await
}

/// `POST /api/transactions/search?p=N` with `{ "query": ..., "page"?: N }`
///
/// The query-string page wins over the body page.
pub async fn search_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let request_id = request_id(&headers);
    let page = page.p.or(request.page).unwrap_or(DEFAULT_PAGE);

    tracing::info!(request_id = %request_id, page = page, "Searching transactions");

    let api = state.api.clone();
    let query = request.query;
    run_detached(request_id, async move { api.search(&query, page).await }).await
}

/// Spawn a dispatch and wait for it.
///
/// The task owns the run, so it reaches completion or exhaustion even if
/// this future is dropped.
async fn run_detached<F>(request_id: &str, dispatch: F) -> Result<Response, ApiError>
where
    F: Future<Output = Result<Outcome, DispatchError>> + Send + 'static,
{
    match tokio::spawn(dispatch).await {
        Ok(Ok(outcome)) => Ok(outcome_response(outcome)),
        Ok(Err(e)) => Err(ApiError::new(request_id, e)),
        Err(e) => Err(ApiError::new(
            request_id,
            DispatchError::Interrupted(e.to_string()),
        )),
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}
