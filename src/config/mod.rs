//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (optional) → process environment
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; loaded once at process start
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Credentials are read from the environment when present

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_dotenv, ConfigError};
pub use schema::GatewayConfig;
pub use schema::{CorsConfig, ListenerConfig, ObservabilityConfig, SigningConfig, UpstreamConfig};
