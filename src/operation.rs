//! Parsing of a single batch entry into an operation descriptor.

use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{Error, Result};

/// Method used when a batch entry does not name one.
pub const DEFAULT_METHOD: &str = "get";

/// Validated, normalized representation of one batch entry.
///
/// A descriptor owns a context derived from the batch request's base
/// context; the [`RequestSynthesizer`](crate::RequestSynthesizer) rewrites
/// that context in place before execution.
///
/// # Examples
///
/// ```
/// use batch_dispatch::{Context, OperationDescriptor};
/// use serde_json::json;
///
/// let base = Context::new();
/// let op = OperationDescriptor::parse(&json!({"url": "/widgets"}), &base).unwrap();
///
/// assert_eq!(op.method(), "get");
/// assert_eq!(op.url(), "/widgets");
/// assert!(op.params().as_object().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct OperationDescriptor {
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) params: Value,
    pub(crate) headers: Map<String, Value>,
    raw: Value,
    pub(crate) context: Context,
}

impl OperationDescriptor {
    /// Builds a descriptor from a raw batch entry.
    ///
    /// Applies defaults (`method` → `"get"`, `params`/`headers` → `{}`) and
    /// attaches a context derived from `base`.
    ///
    /// # Errors
    ///
    /// * [`Error::MalformedOperation`] if `method` or `url` is absent, not a
    ///   string, or empty after defaulting.
    /// * [`Error::InvalidField`] if `params` or `headers` is not a mapping.
    pub fn parse(raw: &Value, base: &Context) -> Result<Self> {
        let method = match present(raw, "method") {
            None => Value::String(DEFAULT_METHOD.to_string()),
            Some(value) => value.clone(),
        };
        let url = present(raw, "url").cloned().unwrap_or(Value::Null);

        let (method, url) = match (non_empty_str(&method), non_empty_str(&url)) {
            (Some(method), Some(url)) => (method.to_string(), url.to_string()),
            _ => {
                return Err(Error::MalformedOperation {
                    method: method.to_string(),
                    url: url.to_string(),
                })
            }
        };

        let params = match present(raw, "params") {
            None => Value::Object(Map::new()),
            Some(value) if value.is_object() => value.clone(),
            Some(other) => return Err(invalid_field("params", other)),
        };
        let headers = match present(raw, "headers") {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => return Err(invalid_field("headers", other)),
        };

        Ok(Self {
            method,
            url,
            params,
            headers,
            raw: raw.clone(),
            context: base.derive(),
        })
    }

    /// HTTP method as given (lower-case by convention).
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Target url, including any query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request parameters (always a mapping).
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Request headers as supplied by the client.
    pub fn headers(&self) -> &Map<String, Value> {
        &self.headers
    }

    /// The batch entry exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The operation's private context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable access to the operation's private context.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Returns `true` if this is a GET operation.
    ///
    /// The comparison ignores ASCII case, so `"GET"` and `"Get"` count as
    /// GET too. This differs from an exact match against `"get"`, under which
    /// an upper-case method would get a `null` query hash.
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case(DEFAULT_METHOD)
    }
}

/// Looks up `key`, treating JSON `null` the same as a missing key.
fn present<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn invalid_field(field: &'static str, received: &Value) -> Error {
    Error::InvalidField {
        field,
        expected: "a mapping",
        received: received.to_string(),
    }
}
