//! Batched sub-request execution against an in-process request pipeline.
//!
//! A single inbound request can describe many logical sub-requests. This
//! crate turns each one into a request context indistinguishable from a real
//! inbound request, runs it through the application's handler in isolation,
//! and reports a uniform response plus a redacted audit record:
//! - **Context derivation**: every operation gets a deep copy of the base context
//! - **Synthesis**: method, path, query string, headers and params are rewritten
//! - **Fault isolation**: handler errors and panics become error responses
//! - **Audit**: one structured, redacted log record per operation
//!
//! # Core Types
//!
//! - [`Context`]: request environment owned by one operation
//! - [`OperationDescriptor`]: validated batch entry
//! - [`RequestSynthesizer`]: rewrites a context to match an operation
//! - [`Executor`]: calls the [`Handler`] and contains its faults
//! - [`Response`]: normalized outcome
//! - [`audit::AuditLogger`]: emits [`audit::LogRecord`]s to a [`LogSink`]
//! - [`BatchDispatcher`]: wires all of the above together
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use batch_dispatch::{BatchConfig, BatchDispatcher, Context, Fault, MemorySink, RawResult};
//! use serde_json::json;
//!
//! let app = |ctx: &mut Context| -> Result<RawResult, Fault> {
//!     match ctx.get_str("PATH_INFO") {
//!         Some("/me") => Ok(RawResult::json(200, json!({"name": "Ann"}))),
//!         _ => Err(Fault::with_status(404, "not found")),
//!     }
//! };
//!
//! let sink = Arc::new(MemorySink::new());
//! let dispatcher = BatchDispatcher::new(&BatchConfig::default(), app)
//!     .unwrap()
//!     .with_log_sink(sink.clone());
//!
//! let results = dispatcher.dispatch_all(
//!     &[json!({"url": "/me"}), json!({"url": "/nope"})],
//!     &Context::new(),
//! );
//!
//! assert_eq!(results[0].as_ref().unwrap().status, 200);
//! assert_eq!(results[1].as_ref().unwrap().status, 404);
//! assert_eq!(sink.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod config;
pub mod context;
mod dispatch;
mod error;
mod executor;
mod fault;
mod handler;
pub mod logging;
mod operation;
mod response;
mod sink;
mod synthesize;

pub use config::{BatchConfig, DECODE_JSON_ENV, ENDPOINT_ENV};
pub use context::Context;
pub use dispatch::BatchDispatcher;
pub use error::{Error, Result};
pub use executor::Executor;
pub use fault::{ErrorRenderer, FaultNormalizer, DEFAULT_FAULT_STATUS, MIN_FAULT_STATUS};
pub use handler::{BoxError, Fault, Handler, RawBody, RawResult};
pub use operation::{OperationDescriptor, DEFAULT_METHOD};
pub use response::{Response, SUCCESS_STATUS};
pub use sink::{LogSink, MemorySink, TracingSink, AUDIT_TARGET};
pub use synthesize::{header_key, split_url, RequestSynthesizer};
