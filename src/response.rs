//! Uniform response shape for batch operations.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::handler::{RawBody, RawResult};

/// Status treated as a plain success.
pub const SUCCESS_STATUS: u16 = 200;

/// Normalized outcome of one batch operation.
///
/// Serializes as `{"status": .., "body": .., "headers": ..}` so a batch
/// controller can aggregate responses directly.
///
/// # Examples
///
/// ```
/// use batch_dispatch::{RawResult, Response};
///
/// let response = Response::normalize(RawResult::text(200, "hello"), false);
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body, either a string or a structured value
    pub body: Value,
    /// Response headers
    pub headers: Map<String, Value>,
}

impl Response {
    /// Wraps a raw result, regardless of whether it came from the handler or
    /// from the fault normalizer.
    ///
    /// Chunked bodies are concatenated. With `decode_json` set, a string
    /// body whose `Content-Type` mentions `json` is parsed; if parsing fails
    /// the string is kept as is.
    pub fn normalize(raw: RawResult, decode_json: bool) -> Self {
        let body = match raw.body {
            RawBody::Json(value) => value,
            RawBody::Chunks(chunks) => {
                let text = chunks.concat();
                if decode_json && is_json(&raw.headers) {
                    serde_json::from_str(&text).unwrap_or(Value::String(text))
                } else {
                    Value::String(text)
                }
            }
        };

        Self {
            status: raw.status,
            body,
            headers: raw.headers,
        }
    }

    /// Returns `true` for the plain success status.
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Looks up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&Value> {
        header_value(&self.headers, name)
    }
}

impl From<RawResult> for Response {
    fn from(raw: RawResult) -> Self {
        Self::normalize(raw, false)
    }
}

pub(crate) fn header_value<'a>(headers: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
}

fn is_json(headers: &Map<String, Value>) -> bool {
    header_value(headers, "Content-Type")
        .and_then(Value::as_str)
        .is_some_and(|content_type| content_type.to_ascii_lowercase().contains("json"))
}
