//! Request signing subsystem.
//!
//! # Data Flow
//! ```text
//! (method, path, body, timestamp)
//!     → variant.rs (pick timestamp precision and signed path form)
//!     → canonical.rs (timestamp + METHOD + endpoint + body, HMAC-SHA-256, base64)
//!     → headers.rs (YAYA-API-KEY / -TIMESTAMP / -SIGN)
//! ```
//!
//! # Security Constraints
//! - Never sign with an empty secret
//! - Secrets and signatures are never logged or displayed

pub mod canonical;
pub mod headers;
pub mod scheme;
pub mod types;
pub mod variant;

pub use canonical::{sign, Signed};
pub use headers::SignedHeaders;
pub use scheme::{FallbackScheme, FixedScheme, SigningScheme};
pub use types::{Credentials, Payload, SigningError};
pub use variant::{PathForm, SigningVariant, TimestampPrecision};
