//! Audit logging for batch operations.
//!
//! This module provides:
//! - `redact_params`: masking of sensitive request parameters
//! - `LogRecord`: the structured, redacted record for one operation
//! - `AuditLogger`: builds records and hands them to an injected sink
//!
//! Records are safe by default:
//! - Only the `Authorization` header survives; all others are dropped
//! - Sensitive parameter values are masked
//! - Response bodies are only kept for non-success responses

mod logger;
mod record;
mod redact;

pub use logger::AuditLogger;
pub use record::{LogRecord, ABSENT, AUTHORIZATION_HEADER};
pub use redact::{redact_params, MASK, SENSITIVE_PARAMS};
