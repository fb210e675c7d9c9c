//! Credential and payload types plus signing errors.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while producing a request signature.
#[derive(Debug, Error)]
pub enum SigningError {
    /// A required credential was empty or absent.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// The JSON body could not be serialized.
    #[error("Body serialization failed: {0}")]
    Body(#[from] serde_json::Error),
}

/// Result type for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;

/// API key and shared secret issued by the wallet provider.
///
/// The secret is never printed by `Debug`.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Build credentials, refusing empty values.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> SigningResult<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();

        if api_key.trim().is_empty() {
            return Err(SigningError::MissingCredential("api key"));
        }
        if api_secret.is_empty() {
            return Err(SigningError::MissingCredential("api secret"));
        }

        Ok(Self { api_key, api_secret })
    }

    /// Build credentials from optional values (e.g. unset environment variables).
    pub fn from_parts(api_key: Option<&str>, api_secret: Option<&str>) -> SigningResult<Self> {
        let api_key = api_key.ok_or(SigningError::MissingCredential("api key"))?;
        let api_secret = api_secret.ok_or(SigningError::MissingCredential("api secret"))?;
        Self::new(api_key, api_secret)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// A request body as it enters the signer.
///
/// `None`, `Json(Value::Null)` and an empty string in either form all
/// canonicalize to the empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No body at all.
    #[default]
    None,
    /// An already-serialized body, signed byte for byte.
    Text(String),
    /// A structure serialized to compact JSON.
    Json(Value),
}

impl Payload {
    /// The body segment of the canonical string.
    pub fn canonical(&self) -> SigningResult<Cow<'_, str>> {
        match self {
            Payload::None => Ok(Cow::Borrowed("")),
            Payload::Text(text) => Ok(Cow::Borrowed(text.as_str())),
            Payload::Json(Value::Null) => Ok(Cow::Borrowed("")),
            Payload::Json(Value::String(s)) if s.is_empty() => Ok(Cow::Borrowed("")),
            Payload::Json(value) => Ok(Cow::Owned(serde_json::to_string(value)?)),
        }
    }

    /// True when the payload canonicalizes to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::None | Payload::Json(Value::Null) => true,
            Payload::Text(text) => text.is_empty(),
            Payload::Json(Value::String(s)) => s.is_empty(),
            Payload::Json(_) => false,
        }
    }
}
