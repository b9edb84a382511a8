//! End-to-end processing of batch operations.

use std::sync::Arc;

use serde_json::Value;

use crate::audit::AuditLogger;
use crate::config::BatchConfig;
use crate::context::Context;
use crate::error::Result;
use crate::executor::Executor;
use crate::fault::FaultNormalizer;
use crate::handler::Handler;
use crate::operation::OperationDescriptor;
use crate::response::Response;
use crate::sink::LogSink;
use crate::synthesize::RequestSynthesizer;

/// Runs batch operations through parse → synthesize → execute → normalize →
/// audit.
///
/// The dispatcher holds no per-operation state, so it is `Send + Sync` and a
/// host may share it across threads.
///
/// # Examples
///
/// ```
/// use batch_dispatch::{BatchConfig, BatchDispatcher, Context, Fault, RawResult};
/// use serde_json::json;
///
/// let app = |ctx: &mut Context| -> Result<RawResult, Fault> {
///     let path = ctx.get_str("PATH_INFO").unwrap_or_default().to_string();
///     Ok(RawResult::json(200, json!({ "path": path })))
/// };
/// let dispatcher = BatchDispatcher::new(&BatchConfig::default(), app).unwrap();
///
/// let base = Context::new();
/// let response = dispatcher
///     .dispatch(&json!({"method": "get", "url": "/users/1"}), &base)
///     .unwrap();
///
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body, json!({"path": "/users/1"}));
/// ```
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    synthesizer: RequestSynthesizer,
    executor: Executor,
    audit: AuditLogger,
    decode_json_responses: bool,
}

impl BatchDispatcher {
    /// Creates a dispatcher for `handler` with the default fault renderer
    /// and the `tracing` audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`](crate::Error::InvalidEndpoint) if
    /// the configured endpoint is not a valid pattern.
    pub fn new(config: &BatchConfig, handler: impl Handler + 'static) -> Result<Self> {
        Ok(Self {
            synthesizer: RequestSynthesizer::new(config)?,
            executor: Executor::new(Arc::new(handler)),
            audit: AuditLogger::default(),
            decode_json_responses: config.decode_json_responses,
        })
    }

    /// Replaces the fault normalizer.
    pub fn with_fault_normalizer(mut self, normalizer: impl FaultNormalizer + 'static) -> Self {
        self.executor = self.executor.with_fault_normalizer(Arc::new(normalizer));
        self
    }

    /// Replaces the audit sink.
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.audit = AuditLogger::new(sink);
        self
    }

    /// Processes one raw batch entry against `base`.
    ///
    /// Handler faults never surface here; they are part of the returned
    /// response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedOperation`](crate::Error::MalformedOperation)
    /// or [`Error::InvalidField`](crate::Error::InvalidField) if the entry
    /// cannot be parsed. Nothing is executed or logged in that case.
    pub fn dispatch(&self, raw: &Value, base: &Context) -> Result<Response> {
        let mut op = OperationDescriptor::parse(raw, base)?;
        tracing::debug!(method = %op.method(), url = %op.url(), "dispatching batch operation");

        self.synthesizer.synthesize(&mut op);
        let raw_result = self.executor.execute(&mut op);
        let response = Response::normalize(raw_result, self.decode_json_responses);

        self.audit.log(&op, &response);
        Ok(response)
    }

    /// Processes every entry strictly in order.
    ///
    /// Each entry gets its own result; a malformed or failing entry never
    /// prevents the following ones from running.
    pub fn dispatch_all(&self, operations: &[Value], base: &Context) -> Vec<Result<Response>> {
        operations
            .iter()
            .map(|raw| {
                self.dispatch(raw, base).inspect_err(|error| {
                    tracing::info!(%error, "rejected malformed batch operation");
                })
            })
            .collect()
    }
}
