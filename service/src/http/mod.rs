//! HTTP utilities and middleware.
//!
//! Shared HTTP functionality for hardening the service's own responses.

pub mod security;

pub use security::{build_security_headers, security_headers_middleware};
