//! Transaction endpoints of the wallet API.
//!
//! ```text
//! list(page)          → GET  /api/en/transaction/find-by-user?p={page}
//! search(query, page) → POST /api/en/transaction/search?p={page}  {"query": ...}
//! ```

use serde::Serialize;

use crate::signing::Payload;
use crate::upstream::{DispatchError, Dispatcher, Outcome, ReqwestTransport, Transport};

pub const FIND_BY_USER_PATH: &str = "/api/en/transaction/find-by-user";
pub const SEARCH_PATH: &str = "/api/en/transaction/search";

/// Page used when the caller supplies none.
pub const DEFAULT_PAGE: u32 = 1;

/// Search request body. Exactly `{query}`, nothing else.
#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
}

/// Typed access to the transaction endpoints.
#[derive(Debug)]
pub struct TransactionsApi<T = ReqwestTransport> {
    dispatcher: Dispatcher<T>,
}

impl<T: Transport> TransactionsApi<T> {
    pub fn new(dispatcher: Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Transactions of the authenticated wallet, page-numbered from 1.
    pub async fn list(&self, page: u32) -> Result<Outcome, DispatchError> {
        let path = format!("{}?p={}", FIND_BY_USER_PATH, page);
        self.dispatcher.dispatch("GET", &path, Payload::None).await
    }

    /// Full-text search over the wallet's transactions.
    pub async fn search(&self, query: &str, page: u32) -> Result<Outcome, DispatchError> {
        let path = format!("{}?p={}", SEARCH_PATH, page);
        let body = serde_json::to_value(SearchBody { query })
            .map_err(crate::signing::SigningError::from)?;
        self.dispatcher.dispatch("POST", &path, Payload::Json(body)).await
    }
}
