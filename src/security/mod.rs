//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → cors.rs (allowed origins, preflight)
//!     → [handler]
//!     → headers.rs (hardening response headers)
//! ```
//!
//! # Design Decisions
//! - Origins are matched exactly; requests without Origin pass
//! - Hardening headers never overwrite ones already set

pub mod cors;
pub mod headers;
