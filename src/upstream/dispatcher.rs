//! Variant dispatcher: sign, send, and fall back through signing variants.
//!
//! # Responsibilities
//! - Take one timestamp per dispatch and derive each variant's form of it
//! - Sign and send each variant strictly in order, one attempt at a time
//! - Stop at the first response that is not a signature rejection
//! - Forward the last upstream rejection when every variant fails
//!
//! # State Machine
//! ```text
//! Trying(0) ──rejected / network error──▶ Trying(1) ──▶ ... ──▶ Exhausted
//!     │                                       │
//!     └──────────────accepted─────────────────┴──────────────▶ Accepted
//! ```
//!
//! Attempts never race: the wallet API may act on a request even when it
//! rejects the signature.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::observability::metrics;
use crate::signing::{
    self, Credentials, FallbackScheme, Payload, SignedHeaders, SigningError, SigningScheme,
    SigningVariant,
};
use crate::upstream::clock::{Clock, SystemClock};
use crate::upstream::transport::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

/// An upstream response handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: u16,
    pub data: Value,
}

impl From<UpstreamResponse> for Outcome {
    fn from(response: UpstreamResponse) -> Self {
        Self {
            status: response.status,
            data: response.data,
        }
    }
}

/// Terminal dispatch failures.
///
/// Messages never contain the secret or signature material.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Signed headers for variant {0} are not valid header values")]
    InvalidHeader(&'static str),

    #[error("All signature variants failed (last variant {variant}): {detail}")]
    AllVariantsExhausted { variant: &'static str, detail: String },

    #[error("Dispatch task did not complete: {0}")]
    Interrupted(String),
}

/// Why a single variant attempt did not produce the final outcome.
#[derive(Debug)]
enum AttemptFailure {
    /// The upstream answered but refused the signature.
    SigningVariantRejected {
        variant: SigningVariant,
        response: UpstreamResponse,
    },
    /// No HTTP response was obtained.
    NetworkFailure {
        variant: SigningVariant,
        error: TransportError,
    },
}

/// True when a response means "wrong signing convention, try the next one".
///
/// That is a 401, or a JSON `error` string mentioning "signature" in any case.
/// Every other status, including unrelated 4xx and 5xx, is a real answer.
pub fn is_signature_rejection(status: u16, data: &Value) -> bool {
    if status == 401 {
        return true;
    }
    data.get("error")
        .and_then(Value::as_str)
        .is_some_and(|error| error.to_ascii_lowercase().contains("signature"))
}

/// Ensure the path starts with `/`.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Signs requests for one wallet API account and sends them through `T`.
pub struct Dispatcher<T> {
    base_url: String,
    credentials: Credentials,
    scheme: Arc<dyn SigningScheme>,
    clock: Arc<dyn Clock>,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher using the fallback scheme and the system clock.
    ///
    /// Trailing slashes on `base_url` are stripped.
    pub fn new(base_url: &str, credentials: Credentials, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            scheme: Arc::new(FallbackScheme),
            clock: Arc::new(SystemClock),
            transport,
        }
    }

    pub fn with_scheme(mut self, scheme: Arc<dyn SigningScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> &dyn SigningScheme {
        self.scheme.as_ref()
    }

    /// Run one signed request through the variant state machine.
    ///
    /// A `Payload::None` body means GET semantics: nothing is sent, and the
    /// body segment of the canonical string is empty.
    pub async fn dispatch(
        &self,
        method: &str,
        path: &str,
        body: Payload,
    ) -> Result<Outcome, DispatchError> {
        let start = Instant::now();
        let result = self.run(method, path, body).await;

        let label = match &result {
            Ok(_) => "completed",
            Err(DispatchError::AllVariantsExhausted { .. }) => "exhausted",
            Err(_) => "error",
        };
        metrics::record_dispatch(label, start);
        result
    }

    async fn run(&self, method: &str, path: &str, body: Payload) -> Result<Outcome, DispatchError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| DispatchError::InvalidMethod(method.to_string()))?;
        let path = normalize_path(path);
        let url = format!("{}{}", self.base_url, path);

        // Serialize once so every variant signs, and sends, the same bytes.
        let body = Payload::Text(body.canonical()?.into_owned());
        let send_body = match &body {
            Payload::Text(text) if method != Method::GET && !body.is_empty() => Some(text.clone()),
            _ => None,
        };

        // One clock read per dispatch; the microsecond form is derived from it.
        let millis = self.clock.now_millis();

        let mut last_failure = None;

        for (attempt, variant) in self.scheme.variants().iter().copied().enumerate() {
            let timestamp = variant.timestamp(millis);
            let endpoint = variant.endpoint(&path);

            let signed = signing::sign(
                method.as_str(),
                endpoint,
                &body,
                self.credentials.secret(),
                &timestamp,
            )?;

            tracing::debug!(
                variant = %variant,
                attempt = attempt + 1,
                url = %url,
                signed_endpoint = %endpoint,
                timestamp = %timestamp,
                canonical = %signed.canonical,
                "Trying signing variant"
            );

            let headers = SignedHeaders {
                api_key: self.credentials.api_key().to_string(),
                timestamp,
                signature: signed.signature,
            }
            .to_header_map()
            .map_err(|_| DispatchError::InvalidHeader(variant.name()))?;

            let request = UpstreamRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body: send_body.clone(),
            };

            match self.transport.send(request).await {
                Ok(response) if is_signature_rejection(response.status, &response.data) => {
                    tracing::warn!(
                        variant = %variant,
                        status = response.status,
                        body = %response.data,
                        "Signing variant rejected"
                    );
                    metrics::record_variant_attempt(variant.name(), "rejected");
                    last_failure = Some(AttemptFailure::SigningVariantRejected { variant, response });
                }
                Ok(response) => {
                    tracing::info!(
                        variant = %variant,
                        status = response.status,
                        "Signing variant accepted"
                    );
                    metrics::record_variant_attempt(variant.name(), "accepted");
                    return Ok(response.into());
                }
                Err(error) => {
                    tracing::warn!(variant = %variant, error = %error, "Network error for signing variant");
                    metrics::record_variant_attempt(variant.name(), "network_error");
                    last_failure = Some(AttemptFailure::NetworkFailure { variant, error });
                }
            }
        }

        match last_failure {
            Some(AttemptFailure::SigningVariantRejected { variant, response }) => {
                tracing::warn!(
                    last_variant = %variant,
                    status = response.status,
                    "All signing variants rejected, forwarding last upstream response"
                );
                Ok(response.into())
            }
            Some(AttemptFailure::NetworkFailure { variant, error }) => {
                tracing::error!(last_variant = %variant, error = %error, "All signing variants failed");
                Err(DispatchError::AllVariantsExhausted {
                    variant: variant.name(),
                    detail: error.to_string(),
                })
            }
            None => Err(DispatchError::AllVariantsExhausted {
                variant: "none",
                detail: format!("scheme '{}' yielded no variants", self.scheme.name()),
            }),
        }
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("scheme", &self.scheme.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::headers::{API_SIGN_HEADER, API_TIMESTAMP_HEADER};
    use crate::signing::FixedScheme;
    use crate::upstream::clock::FixedClock;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const NOW: u64 = 1_700_000_000_000;

    /// Replays scripted results and records every request it sees.
    #[derive(Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<UpstreamResponse, TransportError>>>,
        seen: Mutex<Vec<UpstreamRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<UpstreamResponse, TransportError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn header(&self, idx: usize, name: &str) -> String {
            self.seen.lock().unwrap()[idx].headers[name]
                .to_str()
                .unwrap()
                .to_string()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::Connect("script exhausted".into())))
        }
    }

    fn status(code: u16, data: Value) -> Result<UpstreamResponse, TransportError> {
        Ok(UpstreamResponse { status: code, data })
    }

    fn dispatcher(transport: Arc<ScriptedTransport>) -> Dispatcher<Arc<ScriptedTransport>> {
        let creds = Credentials::new("key-1", "s3cr3t").unwrap();
        Dispatcher::new("https://sandbox.yayawallet.com//", creds, transport)
            .with_clock(Arc::new(FixedClock::new(NOW)))
    }

    #[test]
    fn test_rejection_policy() {
        assert!(is_signature_rejection(401, &Value::Null));
        assert!(is_signature_rejection(400, &json!({ "error": "Invalid SIGNATURE" })));
        assert!(is_signature_rejection(200, &json!({ "error": "signature mismatch" })));
        assert!(!is_signature_rejection(403, &json!({ "error": "Forbidden" })));
        assert!(!is_signature_rejection(500, &json!({ "message": "signature" })));
        assert!(!is_signature_rejection(400, &json!({ "error": { "signature": true } })));
        assert!(!is_signature_rejection(200, &json!([1, 2])));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a?b=1"), "/a?b=1");
        assert_eq!(normalize_path("a?b=1"), "/a?b=1");
    }

    #[tokio::test]
    async fn test_first_variant_accepted_short_circuits() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(200, json!({ "data": [] }))]));
        let outcome = dispatcher(transport.clone())
            .dispatch("get", "/api/en/transaction/find-by-user?p=1", Payload::None)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome { status: 200, data: json!({ "data": [] }) });
        assert_eq!(transport.calls(), 1);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::GET);
        assert_eq!(
            seen[0].url,
            "https://sandbox.yayawallet.com/api/en/transaction/find-by-user?p=1"
        );
        assert!(seen[0].body.is_none());
        assert_eq!(seen[0].headers[API_TIMESTAMP_HEADER], "1700000000000");
        assert_eq!(
            seen[0].headers[API_SIGN_HEADER],
            "I00vNSKy+oyspit9tMVQs0lCerVZDyW+pGJQp8Bri/k="
        );
    }

    #[tokio::test]
    async fn test_401_moves_to_next_variant() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(401, json!({ "error": "Unauthorized" })),
            status(200, json!({ "ok": true })),
        ]));
        let outcome = dispatcher(transport.clone())
            .dispatch("GET", "/api/en/transaction/find-by-user?p=1", Payload::None)
            .await
            .unwrap();

        assert_eq!(outcome.status, 200);
        assert_eq!(transport.calls(), 2);
        assert_ne!(transport.header(0, API_SIGN_HEADER), transport.header(1, API_SIGN_HEADER));
        assert_eq!(transport.header(1, API_TIMESTAMP_HEADER), "1700000000000000");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url, seen[1].url);
    }

    #[tokio::test]
    async fn test_all_401_forwards_last_rejection() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(401, json!({ "error": "a" })),
            status(401, json!({ "error": "b" })),
            status(401, json!({ "error": "c" })),
            status(401, json!({ "error": "d" })),
        ]));
        let outcome = dispatcher(transport.clone())
            .dispatch("GET", "/p?x=1", Payload::None)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome { status: 401, data: json!({ "error": "d" }) });
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn test_every_variant_signs_differently() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(401, Value::Null),
            status(401, Value::Null),
            status(401, Value::Null),
            status(401, Value::Null),
        ]));
        dispatcher(transport.clone())
            .dispatch("GET", "/api/en/transaction/find-by-user?p=1", Payload::None)
            .await
            .unwrap();

        let expected = [
            "1700000000000GET/api/en/transaction/find-by-user?p=1",
            "1700000000000000GET/api/en/transaction/find-by-user?p=1",
            "1700000000000GET/api/en/transaction/find-by-user",
            "1700000000000000GET/api/en/transaction/find-by-user",
        ];
        for (idx, canonical) in expected.iter().enumerate() {
            let sig = signing::canonical::compute_signature("s3cr3t", canonical).unwrap();
            assert_eq!(transport.header(idx, API_SIGN_HEADER), sig, "variant {}", idx);
        }
    }

    #[tokio::test]
    async fn test_signature_error_body_is_rejection() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(400, json!({ "error": "Invalid signature provided" })),
            status(400, json!({ "error": "Invalid page" })),
        ]));
        let outcome = dispatcher(transport.clone())
            .dispatch("GET", "/p", Payload::None)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome { status: 400, data: json!({ "error": "Invalid page" }) });
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_network_errors_continue_loop() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Connect("connection refused".into())),
            Err(TransportError::Timeout(std::time::Duration::from_secs(15))),
            status(500, json!({ "error": "Internal" })),
        ]));
        let outcome = dispatcher(transport.clone())
            .dispatch("GET", "/p", Payload::None)
            .await
            .unwrap();

        assert_eq!(outcome.status, 500);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_with_network_failure_last() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(401, Value::Null),
            status(401, Value::Null),
            status(401, Value::Null),
            Err(TransportError::Connect("dns error".into())),
        ]));
        let err = dispatcher(transport.clone())
            .dispatch("GET", "/p", Payload::None)
            .await
            .unwrap_err();

        match &err {
            DispatchError::AllVariantsExhausted { variant, detail } => {
                assert_eq!(*variant, "us+noQuery");
                assert!(detail.contains("dns error"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let message = err.to_string();
        assert!(!message.contains("s3cr3t"));
        assert!(!message.contains(&transport.header(3, API_SIGN_HEADER)));
    }

    #[tokio::test]
    async fn test_post_body_sent_as_signed() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(200, json!({}))]));
        dispatcher(transport.clone())
            .dispatch(
                "POST",
                "/api/en/transaction/search?p=2",
                Payload::Json(json!({ "query": "abebe" })),
            )
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::POST);
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"query":"abebe"}"#));
        assert_eq!(
            seen[0].headers[API_SIGN_HEADER],
            "dgSYIGsE5rYMYaDqwwpbX4uKPhrp3XC1Ew7WsXpmcE0="
        );
    }

    #[tokio::test]
    async fn test_get_never_sends_body() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(200, json!({}))]));
        dispatcher(transport.clone())
            .dispatch("GET", "/p", Payload::Json(json!({ "q": 1 })))
            .await
            .unwrap();
        assert!(transport.seen.lock().unwrap()[0].body.is_none());
    }

    #[tokio::test]
    async fn test_empty_post_body_is_not_sent() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(200, json!({})),
            status(200, json!({})),
        ]));
        let dispatcher = dispatcher(transport.clone());
        dispatcher.dispatch("POST", "/p", Payload::Json(json!(""))).await.unwrap();
        dispatcher.dispatch("POST", "/p", Payload::Json(Value::Null)).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert!(seen.iter().all(|request| request.body.is_none()));
        let expected = signing::canonical::compute_signature("s3cr3t", "1700000000000POST/p").unwrap();
        assert_eq!(seen[0].headers[API_SIGN_HEADER], expected.as_str());
    }

    #[tokio::test]
    async fn test_fixed_scheme_single_attempt() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(401, json!({}))]));
        let outcome = dispatcher(transport.clone())
            .with_scheme(Arc::new(FixedScheme::new(SigningVariant::MS_NO_QUERY)))
            .dispatch("GET", "/p?x=1", Payload::None)
            .await
            .unwrap();

        assert_eq!(outcome.status, 401);
        assert_eq!(transport.calls(), 1);
        let expected = signing::canonical::compute_signature("s3cr3t", "1700000000000GET/p").unwrap();
        assert_eq!(transport.header(0, API_SIGN_HEADER), expected);
    }

    #[tokio::test]
    async fn test_invalid_method() {
        let transport = Arc::new(ScriptedTransport::default());
        let err = dispatcher(transport.clone())
            .dispatch("GE T", "/p", Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidMethod(_)));
        assert_eq!(transport.calls(), 0);
    }
}
