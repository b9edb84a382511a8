//! Boundary to the downstream request pipeline.

use std::error::Error as StdError;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::context::Context;

/// Boxed error type handlers may raise.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The in-process request pipeline each batch operation is executed against.
///
/// Implemented for any `Fn(&mut Context) -> Result<RawResult, Fault>`, so a
/// closure can stand in for a full application in tests.
///
/// # Examples
///
/// ```
/// use batch_dispatch::{Context, Fault, Handler, RawResult};
///
/// let app = |ctx: &mut Context| -> Result<RawResult, Fault> {
///     let path = ctx.get_str("PATH_INFO").unwrap_or("/").to_string();
///     Ok(RawResult::text(200, path))
/// };
///
/// let mut ctx = Context::new();
/// ctx.insert("PATH_INFO", "/users");
/// let result = app.handle(&mut ctx).unwrap();
/// assert_eq!(result.status, 200);
/// ```
pub trait Handler: Send + Sync {
    /// Handles one request described by `ctx`.
    ///
    /// # Errors
    ///
    /// Any [`Fault`] returned here is contained by the
    /// [`Executor`](crate::Executor) and rendered into an error response.
    fn handle(&self, ctx: &mut Context) -> Result<RawResult, Fault>;
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> Result<RawResult, Fault> + Send + Sync,
{
    fn handle(&self, ctx: &mut Context) -> Result<RawResult, Fault> {
        self(ctx)
    }
}

/// Body of a raw handler result.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// Body produced as a sequence of string chunks.
    Chunks(Vec<String>),
    /// Body produced as an already structured value.
    Json(Value),
}

impl Default for RawBody {
    fn default() -> Self {
        RawBody::Chunks(Vec::new())
    }
}

/// Status, headers and body exactly as a handler (or fault normalizer)
/// produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResult {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Map<String, Value>,
    /// Response body
    pub body: RawBody,
}

impl RawResult {
    /// Creates a result with a chunked body.
    pub fn new(status: u16, headers: Map<String, Value>, chunks: Vec<String>) -> Self {
        Self {
            status,
            headers,
            body: RawBody::Chunks(chunks),
        }
    }

    /// Creates a result with a single text chunk and no headers.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Map::new(), vec![body.into()])
    }

    /// Creates a result with a structured JSON body and a JSON content type.
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = Map::new();
        headers.insert("Content-Type".to_string(), Value::from("application/json"));
        Self {
            status,
            headers,
            body: RawBody::Json(body),
        }
    }

    /// Adds a header, replacing any previous value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl From<(u16, Map<String, Value>, Vec<String>)> for RawResult {
    fn from((status, headers, chunks): (u16, Map<String, Value>, Vec<String>)) -> Self {
        Self::new(status, headers, chunks)
    }
}

/// A fault raised while a handler was running.
#[derive(Debug, Error)]
pub enum Fault {
    /// An error that already knows which HTTP status it maps to.
    #[error("{message}")]
    Status {
        /// HTTP status to report
        status: u16,
        /// Error message
        message: String,
    },

    /// Any other handler error.
    #[error("{0}")]
    Handler(#[source] BoxError),

    /// The handler panicked; holds the panic message when one was available.
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl Fault {
    /// Wraps an arbitrary handler error.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Fault::Handler(error.into())
    }

    /// Creates a fault with an explicit HTTP status.
    ///
    /// The default renderer only honors error statuses; anything below 400
    /// is reported as 500.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Fault::Status {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status carried by the fault, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Fault::Status { status, .. } => Some(*status),
            Fault::Handler(_) | Fault::Panic(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn closures_are_handlers() {
        let handler = |ctx: &mut Context| -> Result<RawResult, Fault> {
            ctx.insert("visited", true);
            Ok(RawResult::text(204, ""))
        };

        let mut ctx = Context::new();
        let result = handler.handle(&mut ctx).unwrap();

        assert_eq!(result.status, 204);
        assert_eq!(ctx.get("visited"), Some(&json!(true)));
    }

    #[test]
    fn json_result_sets_content_type() {
        let result = RawResult::json(201, json!({"id": 1}));

        assert_eq!(result.headers.get("Content-Type"), Some(&json!("application/json")));
        assert_eq!(result.body, RawBody::Json(json!({"id": 1})));
    }

    #[test]
    fn tuple_conversion() {
        let mut headers = Map::new();
        headers.insert("X-Count".to_string(), json!("2"));
        let result = RawResult::from((200, headers, vec!["a".to_string(), "b".to_string()]));

        assert_eq!(result.status, 200);
        assert_eq!(
            result.body,
            RawBody::Chunks(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn with_header_overrides() {
        let result = RawResult::text(200, "ok")
            .with_header("ETag", "a")
            .with_header("ETag", "b");
        assert_eq!(result.headers.get("ETag"), Some(&json!("b")));
    }

    #[test]
    fn fault_status() {
        assert_eq!(Fault::with_status(404, "missing").status(), Some(404));
        assert_eq!(Fault::new("boom").status(), None);
        assert_eq!(Fault::Panic("oops".to_string()).status(), None);
    }

    #[test]
    fn fault_display() {
        assert_eq!(Fault::new("boom").to_string(), "boom");
        assert_eq!(Fault::with_status(401, "no token").to_string(), "no token");
        assert_eq!(
            Fault::Panic("index out of bounds".to_string()).to_string(),
            "handler panicked: index out of bounds"
        );
    }
}
