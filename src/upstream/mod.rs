//! Wallet API client subsystem.
//!
//! # Data Flow
//! ```text
//! (method, path, body)
//!     → dispatcher.rs (variant loop, acceptance policy)
//!     → signing (canonical string, HMAC, headers)
//!     → transport.rs (reqwest, per-attempt timeout)
//!     → wallet API
//! ```
//!
//! # Security Constraints
//! - Credentials are loaded once at startup and never mutated
//! - Errors surfaced to callers carry no secret or signature material

pub mod clock;
pub mod dispatcher;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dispatcher::{DispatchError, Dispatcher, Outcome};
pub use transport::{ReqwestTransport, Transport, TransportError, UpstreamRequest, UpstreamResponse};
