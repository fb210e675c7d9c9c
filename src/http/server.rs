//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, CORS and origin guard, security headers, request ID, limits)
//! - Bind server to listener
//! - Shut down gracefully on signal

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::with_request_id;
use crate::security::cors::{cors_layer, origin_guard, AllowedOrigins};
use crate::security::headers::with_security_headers;
use crate::transactions::TransactionsApi;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<TransactionsApi>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig, api: Arc<TransactionsApi>) -> Self {
        let state = AppState { api };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let origins = AllowedOrigins::from_config(&config.cors);

        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/transactions", get(handlers::list_transactions))
            .route("/api/transactions/", get(handlers::list_transactions))
            .route("/api/transactions/search", post(handlers::search_transactions))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(middleware::from_fn_with_state(origins.clone(), origin_guard))
            .layer(cors_layer(&origins))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http());

        let router = if config.security.enable_headers {
            with_security_headers(router)
        } else {
            router
        };

        with_request_id(router)
    }

    /// The router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_url = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
