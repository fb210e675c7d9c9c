//! HTTP protocol handling subsystem (the gateway router).
//!
//! # Data Flow
//! ```text
//! Browser / client
//!     → server.rs (Axum setup, CORS, security headers, timeouts)
//!     → request.rs (request ID)
//!     → handlers.rs (map routes to transaction calls)
//!     → response.rs (forward outcome or map error)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, GatewayServer};
