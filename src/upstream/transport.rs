//! HTTP transport to the wallet API.
//!
//! # Responsibilities
//! - Issue one signed request and read the JSON response
//! - Enforce the per-attempt timeout
//! - Report network failures as values, never panics
//!
//! Any status code is a valid response here; the dispatcher decides what a
//! status means.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;

/// A fully prepared upstream request.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Exact bytes to send. `None` sends no body.
    pub body: Option<String>,
}

/// Status and decoded body of an upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub data: Value,
}

/// Network-level failures. None of these carry an HTTP status.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Sends a single upstream request.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send {
        (**self).send(request)
    }
}

/// `reqwest`-backed transport with a per-attempt deadline.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    attempt_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport whose attempts are each bounded by `attempt_timeout`.
    pub fn new(attempt_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(attempt_timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            attempt_timeout,
        })
    }

    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(UpstreamResponse {
            status,
            data: decode_body(&bytes),
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        // The message ends up in diagnostics, so drop the URL.
        let err = err.without_url();
        if err.is_timeout() {
            TransportError::Timeout(self.attempt_timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        match timeout(self.attempt_timeout, self.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.attempt_timeout)),
        }
    }
}

/// Decode a response body as JSON; non-JSON bodies become a JSON string and an
/// empty body becomes `null`.
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_body() {
        assert_eq!(decode_body(br#"{"ok":true}"#), json!({ "ok": true }));
    }

    #[test]
    fn test_decode_non_json_body() {
        assert_eq!(decode_body(b"Bad Gateway"), json!("Bad Gateway"));
        assert_eq!(decode_body(b""), Value::Null);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let result = transport
            .send(UpstreamRequest {
                method: Method::GET,
                url: format!("http://{}/x", addr),
                headers: HeaderMap::new(),
                body: None,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_attempt_timeout() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let transport = ReqwestTransport::new(Duration::from_millis(200)).unwrap();
        let result = transport
            .send(UpstreamRequest {
                method: Method::GET,
                url: format!("http://{}/slow", addr),
                headers: HeaderMap::new(),
                body: None,
            })
            .await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }
}
