//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port valid)
//! - The request timeout must outlast a full variant loop
//! - Check the upstream URL and signing variant name
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Credentials are checked separately at startup

use thiserror::Error;

use crate::config::schema::{GatewayConfig, SigningMode};
use crate::signing::{scheme, SigningVariant};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("upstream.attempt_timeout_secs must be greater than zero")]
    ZeroAttemptTimeout,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error(
        "timeouts.request_secs ({request_secs}) must exceed {variants} variants x \
         upstream.attempt_timeout_secs ({attempt_secs})"
    )]
    RequestTimeoutTooShort {
        request_secs: u64,
        variants: usize,
        attempt_secs: u64,
    },

    #[error("listener.port must be greater than zero")]
    ZeroPort,

    #[error("signing.variant: {0}")]
    UnknownVariant(String),

    #[error("cors.allowed_origins entry '{0}' is not a valid origin")]
    InvalidOrigin(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.upstream.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.upstream.attempt_timeout_secs == 0 {
        errors.push(ValidationError::ZeroAttemptTimeout);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    } else {
        let variants = scheme::from_config(&config.signing).variants().len();
        let worst_case = config
            .upstream
            .attempt_timeout_secs
            .saturating_mul(variants as u64);
        if config.timeouts.request_secs <= worst_case {
            errors.push(ValidationError::RequestTimeoutTooShort {
                request_secs: config.timeouts.request_secs,
                variants,
                attempt_secs: config.upstream.attempt_timeout_secs,
            });
        }
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.signing.mode == SigningMode::Fixed {
        if let Err(e) = config.signing.variant.parse::<SigningVariant>() {
            errors.push(ValidationError::UnknownVariant(e));
        }
    }

    for origin in &config.cors.allowed_origins {
        let valid = url::Url::parse(origin)
            .map(|u| u.origin().is_tuple())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
