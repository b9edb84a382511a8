//! Translation of handler faults into response-shaped results.

use serde_json::json;

use crate::handler::{Fault, RawResult};

/// Status used when a fault does not carry its own.
pub const DEFAULT_FAULT_STATUS: u16 = 500;

/// Lowest status a fault may be reported with.
pub const MIN_FAULT_STATUS: u16 = 400;

/// Converts a fault into a raw result carrying an error status.
///
/// Hosts with their own error-to-response translation implement this trait
/// and hand it to [`BatchDispatcher::with_fault_normalizer`](crate::BatchDispatcher::with_fault_normalizer).
pub trait FaultNormalizer: Send + Sync {
    /// Renders `fault` as a raw result.
    fn render(&self, fault: &Fault) -> RawResult;
}

/// Default fault normalizer.
///
/// Renders `{"error": {"message": ...}}` as a JSON body, using the fault's
/// own status when it is an error status (400 or above) and 500 otherwise.
/// A fault never renders as a success.
///
/// # Examples
///
/// ```
/// use batch_dispatch::{ErrorRenderer, Fault, FaultNormalizer};
///
/// let raw = ErrorRenderer.render(&Fault::with_status(401, "token expired"));
/// assert_eq!(raw.status, 401);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorRenderer;

impl FaultNormalizer for ErrorRenderer {
    fn render(&self, fault: &Fault) -> RawResult {
        let status = fault
            .status()
            .filter(|status| *status >= MIN_FAULT_STATUS)
            .unwrap_or(DEFAULT_FAULT_STATUS);
        RawResult::json(status, json!({ "error": { "message": fault.to_string() } }))
    }
}

impl<F> FaultNormalizer for F
where
    F: Fn(&Fault) -> RawResult + Send + Sync,
{
    fn render(&self, fault: &Fault) -> RawResult {
        self(fault)
    }
}
