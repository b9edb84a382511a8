//! Audit logging of executed batch operations.

use std::sync::Arc;

use tracing::Level;

use super::LogRecord;
use crate::operation::OperationDescriptor;
use crate::response::Response;
use crate::sink::{LogSink, TracingSink};

/// Emits one redacted [`LogRecord`] per executed operation.
///
/// The sink is injected; [`AuditLogger::default`] wires the
/// [`TracingSink`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use batch_dispatch::audit::AuditLogger;
/// use batch_dispatch::{Context, MemorySink, OperationDescriptor, RawResult, Response};
/// use serde_json::json;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = AuditLogger::new(sink.clone());
///
/// let op = OperationDescriptor::parse(&json!({"url": "/me"}), &Context::new()).unwrap();
/// logger.log(&op, &Response::from(RawResult::text(200, "{}")));
///
/// assert_eq!(sink.records()[0].url, json!("/me"));
/// ```
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}

impl AuditLogger {
    /// Creates a logger writing to `sink`.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Builds the record for `op` and `response` and emits it at `INFO`.
    pub fn log(&self, op: &OperationDescriptor, response: &Response) {
        let record = LogRecord::new(op.raw(), response);
        self.sink.emit(Level::INFO, &record);
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::redact::MASK;
    use crate::context::Context;
    use crate::handler::RawResult;
    use crate::sink::MemorySink;
    use serde_json::json;

    #[test]
    fn emits_one_info_record() {
        let sink = Arc::new(MemorySink::new());
        let logger = AuditLogger::new(sink.clone());
        let op = OperationDescriptor::parse(&json!({"method": "get", "url": "/a"}), &Context::new())
            .unwrap();

        logger.log(&op, &Response::from(RawResult::text(200, "ok")));

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, Level::INFO);
        assert_eq!(entries[0].1.status, 200);
    }

    #[test]
    fn logging_never_mutates_the_descriptor() {
        let sink = Arc::new(MemorySink::new());
        let logger = AuditLogger::new(sink.clone());
        let raw = json!({"method": "post", "url": "/login", "params": {"password": "secret"}});
        let op = OperationDescriptor::parse(&raw, &Context::new()).unwrap();

        logger.log(&op, &Response::from(RawResult::text(401, "denied")));

        assert_eq!(op.params(), &json!({"password": "secret"}));
        assert_eq!(op.raw()["params"]["password"], json!("secret"));
        assert_eq!(sink.records()[0].params, json!({"password": MASK}));
    }

    #[test]
    fn default_logger_uses_tracing() {
        let logger = AuditLogger::default();
        let op = OperationDescriptor::parse(&json!({"url": "/a"}), &Context::new()).unwrap();

        // No subscriber installed; emitting must still be a no-op rather than a panic.
        logger.log(&op, &Response::from(RawResult::text(200, "ok")));
    }
}
