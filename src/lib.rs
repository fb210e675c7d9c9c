//! YaYa wallet signing gateway.
//!
//! Signs wallet API requests with HMAC-SHA-256 and, while the provider's
//! canonicalization rules remain uncertain, falls back through an ordered set
//! of signing variants until one is accepted.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod signing;
pub mod transactions;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use transactions::TransactionsApi;
pub use upstream::{Dispatcher, Outcome};
