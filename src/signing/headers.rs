//! Signed request headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, CONTENT_TYPE};

pub const API_KEY_HEADER: &str = "yaya-api-key";
pub const API_TIMESTAMP_HEADER: &str = "yaya-api-timestamp";
pub const API_SIGN_HEADER: &str = "yaya-api-sign";

/// The four headers attached to every signed request.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub api_key: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignedHeaders {
    /// Convert into a header map ready for the transport.
    pub fn to_header_map(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            HeaderValue::from_str(&self.api_key)?,
        );
        headers.insert(
            HeaderName::from_static(API_TIMESTAMP_HEADER),
            HeaderValue::from_str(&self.timestamp)?,
        );
        let mut sign = HeaderValue::from_str(&self.signature)?;
        sign.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_SIGN_HEADER), sign);
        Ok(headers)
    }
}

impl std::fmt::Debug for SignedHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedHeaders")
            .field("api_key", &self.api_key)
            .field("timestamp", &self.timestamp)
            .field("signature", &"<redacted>")
            .finish()
    }
}
