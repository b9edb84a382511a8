use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::Level;

use crate::audit::LogRecord;

/// Tracing target used for audit records.
pub const AUDIT_TARGET: &str = "batch_dispatch::audit";

/// Destination for audit records.
///
/// The audit logger receives its sink at construction; nothing in this crate
/// reaches for a global logger.
pub trait LogSink: Send + Sync {
    /// Emits `record` at `level`.
    fn emit(&self, level: Level, record: &LogRecord);
}

/// Sink that forwards records to `tracing`.
///
/// Each record becomes one event with target [`AUDIT_TARGET`], carrying
/// `method`, `url` and `status` as fields and the whole record rendered as
/// JSON in `record`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! audit_event {
    ($level:expr, $record:ident) => {
        tracing::event!(
            target: AUDIT_TARGET,
            $level,
            method = %$record.method,
            url = %$record.url,
            status = $record.status,
            record = %$record.to_value(),
            "batch operation"
        )
    };
}

impl LogSink for TracingSink {
    fn emit(&self, level: Level, record: &LogRecord) {
        if level == Level::ERROR {
            audit_event!(Level::ERROR, record);
        } else if level == Level::WARN {
            audit_event!(Level::WARN, record);
        } else if level == Level::INFO {
            audit_event!(Level::INFO, record);
        } else if level == Level::DEBUG {
            audit_event!(Level::DEBUG, record);
        } else {
            audit_event!(Level::TRACE, record);
        }
    }
}

/// Sink that keeps records in memory.
///
/// Useful in tests and for hosts that want to ship records themselves.
///
/// # Examples
///
/// ```
/// use batch_dispatch::MemorySink;
///
/// let sink = MemorySink::new();
/// assert!(sink.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, LogRecord)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every emitted record with its level.
    pub fn entries(&self) -> Vec<(Level, LogRecord)> {
        self.lock().clone()
    }

    /// Returns a snapshot of every emitted record.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().map(|(_, record)| record.clone()).collect()
    }

    /// Number of emitted records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards all records.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave a half-written record.
    fn lock(&self) -> MutexGuard<'_, Vec<(Level, LogRecord)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: Level, record: &LogRecord) {
        self.lock().push((level, record.clone()));
    }
}
