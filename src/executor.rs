//! Fault-isolating invocation of the downstream handler.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::fault::{ErrorRenderer, FaultNormalizer};
use crate::handler::{Fault, Handler, RawResult};
use crate::operation::OperationDescriptor;

/// Runs a synthesized operation against the handler.
///
/// The executor is the single isolation point of a batch: handler errors and
/// panics are caught here and rendered by the [`FaultNormalizer`], so one
/// failing operation can never abort the others.
#[derive(Clone)]
pub struct Executor {
    handler: Arc<dyn Handler>,
    faults: Arc<dyn FaultNormalizer>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

impl Executor {
    /// Creates an executor using the default [`ErrorRenderer`].
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            faults: Arc::new(ErrorRenderer),
        }
    }

    /// Replaces the fault normalizer.
    pub fn with_fault_normalizer(mut self, faults: Arc<dyn FaultNormalizer>) -> Self {
        self.faults = faults;
        self
    }

    /// Invokes the handler with the operation's context.
    ///
    /// Never fails: a fault is rendered into a raw result instead.
    pub fn execute(&self, op: &mut OperationDescriptor) -> RawResult {
        let handler = &self.handler;
        let ctx = op.context_mut();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(ctx)))
            .unwrap_or_else(|payload| Err(Fault::Panic(panic_message(&*payload))));

        match outcome {
            Ok(result) => result,
            Err(fault) => {
                tracing::warn!(
                    method = %op.method(),
                    url = %op.url(),
                    error = %fault,
                    "batch operation raised a fault"
                );
                self.faults.render(&fault)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::handler::RawBody;
    use serde_json::json;

    fn operation(url: &str) -> OperationDescriptor {
        OperationDescriptor::parse(&json!({ "url": url }), &Context::new()).unwrap()
    }

    #[test]
    fn returns_handler_result() {
        let handler = |ctx: &mut Context| -> Result<RawResult, Fault> {
            ctx.insert("handled", true);
            Ok(RawResult::text(200, "ok"))
        };
        let executor = Executor::new(Arc::new(handler));
        let mut op = operation("/a");

        let raw = executor.execute(&mut op);

        assert_eq!(raw.status, 200);
        assert_eq!(op.context().get("handled"), Some(&json!(true)));
    }

    #[test]
    fn renders_handler_errors() {
        let handler =
            |_: &mut Context| -> Result<RawResult, Fault> { Err(Fault::new("widget store offline")) };
        let executor = Executor::new(Arc::new(handler));

        let raw = executor.execute(&mut operation("/a"));

        assert_eq!(raw.status, 500);
        assert_eq!(
            raw.body,
            RawBody::Json(json!({"error": {"message": "widget store offline"}}))
        );
    }

    #[test]
    fn contains_panics() {
        let handler = |_: &mut Context| -> Result<RawResult, Fault> { panic!("handler exploded") };
        let executor = Executor::new(Arc::new(handler));

        let raw = executor.execute(&mut operation("/a"));

        assert_eq!(raw.status, 500);
        assert_eq!(
            raw.body,
            RawBody::Json(json!({"error": {"message": "handler panicked: handler exploded"}}))
        );
    }

    #[test]
    fn formatted_panic_messages_are_kept() {
        let handler = |_: &mut Context| -> Result<RawResult, Fault> {
            let id = 7;
            panic!("widget {id} missing")
        };
        let executor = Executor::new(Arc::new(handler));

        let raw = executor.execute(&mut operation("/a"));

        assert_eq!(
            raw.body,
            RawBody::Json(json!({"error": {"message": "handler panicked: widget 7 missing"}}))
        );
    }

    #[test]
    fn custom_fault_normalizer() {
        let handler = |_: &mut Context| -> Result<RawResult, Fault> { Err(Fault::new("nope")) };
        let normalizer = |fault: &Fault| RawResult::text(418, fault.to_string());
        let executor =
            Executor::new(Arc::new(handler)).with_fault_normalizer(Arc::new(normalizer));

        let raw = executor.execute(&mut operation("/a"));

        assert_eq!(raw.status, 418);
        assert_eq!(raw.body, RawBody::Chunks(vec!["nope".to_string()]));
    }

    #[test]
    fn executor_survives_a_fault() {
        let handler = |ctx: &mut Context| -> Result<RawResult, Fault> {
            match ctx.get_str("PATH_INFO") {
                Some("/boom") => Err(Fault::new("boom")),
                _ => Ok(RawResult::text(200, "fine")),
            }
        };
        let executor = Executor::new(Arc::new(handler));

        let mut failing = operation("/boom");
        failing.context_mut().insert("PATH_INFO", "/boom");
        assert_eq!(executor.execute(&mut failing).status, 500);

        let mut next = operation("/ok");
        next.context_mut().insert("PATH_INFO", "/ok");
        assert_eq!(executor.execute(&mut next).status, 200);
    }
}
