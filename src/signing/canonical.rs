//! Canonical string construction and HMAC-SHA-256 signing.
//!
//! ```text
//! canonical = timestamp + METHOD + endpoint + body
//! signature = Base64(HMAC-SHA256(secret, canonical))
//! ```
//!
//! No separators, no normalization of the endpoint. The timestamp is always
//! supplied by the caller.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::signing::types::{Payload, SigningError, SigningResult};

type HmacSha256 = Hmac<Sha256>;

/// A canonical string and the signature computed over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signed {
    pub canonical: String,
    pub signature: String,
}

/// Concatenate the canonical string for a request.
pub fn canonical_string(
    method: &str,
    endpoint: &str,
    body: &Payload,
    timestamp: &str,
) -> SigningResult<String> {
    let body = body.canonical()?;
    let method = method.to_ascii_uppercase();

    let mut canonical =
        String::with_capacity(timestamp.len() + method.len() + endpoint.len() + body.len());
    canonical.push_str(timestamp);
    canonical.push_str(&method);
    canonical.push_str(endpoint);
    canonical.push_str(&body);
    Ok(canonical)
}

/// Base64 HMAC-SHA-256 of `message` under `secret`.
pub fn compute_signature(secret: &str, message: &str) -> SigningResult<String> {
    if secret.is_empty() {
        return Err(SigningError::MissingCredential("api secret"));
    }
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SigningError::MissingCredential("api secret"))?;
    mac.update(message.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Build the canonical string for a request and sign it.
pub fn sign(
    method: &str,
    endpoint: &str,
    body: &Payload,
    secret: &str,
    timestamp: &str,
) -> SigningResult<Signed> {
    let canonical = canonical_string(method, endpoint, body, timestamp)?;
    let signature = compute_signature(secret, &canonical)?;
    Ok(Signed {
        canonical,
        signature,
    })
}
