//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve credentials from validated configuration
//! - Build the transport, signing scheme and dispatcher
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing key or secret is reported before anything is bound or sent

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{ConfigError, GatewayConfig};
use crate::signing::{scheme, Credentials, SigningError};
use crate::transactions::TransactionsApi;
use crate::upstream::{Dispatcher, ReqwestTransport, TransportError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0} (set YAYA_API_KEY and YAYA_API_SECRET)")]
    Credentials(#[from] SigningError),

    #[error("HTTP client error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve credentials from configuration.
pub fn credentials(config: &GatewayConfig) -> Result<Credentials, SigningError> {
    Credentials::from_parts(
        config.upstream.api_key.as_deref(),
        config.upstream.api_secret.as_deref(),
    )
}

/// Build the dispatcher-backed transactions API for a validated config.
pub fn build_transactions_api(config: &GatewayConfig) -> Result<TransactionsApi, StartupError> {
    let credentials = credentials(config)?;
    let transport = ReqwestTransport::new(Duration::from_secs(config.upstream.attempt_timeout_secs))?;
    let scheme: Arc<dyn crate::signing::SigningScheme> = Arc::from(scheme::from_config(&config.signing));

    tracing::info!(
        base_url = %config.upstream.base_url,
        scheme = scheme.name(),
        variants = scheme.variants().len(),
        attempt_timeout_secs = config.upstream.attempt_timeout_secs,
        "Wallet API client initialized"
    );

    let dispatcher = Dispatcher::new(&config.upstream.base_url, credentials, transport).with_scheme(scheme);
    Ok(TransactionsApi::new(dispatcher))
}
