//! Structured log record for one executed batch operation.

use serde::Serialize;
use serde_json::Value;

use super::redact::redact_params;
use crate::response::{header_value, Response};

/// Marker recorded for fields that were not supplied.
pub const ABSENT: &str = "-";

/// Header whose value is the only one kept in the log.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Redacted summary of an operation and its outcome.
///
/// Built from the batch entry exactly as the client sent it, not from the
/// defaulted descriptor, so a missing method shows up as `"-"` rather than
/// `"get"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Method as sent, or `"-"`
    pub method: Value,
    /// Url as sent, or `"-"`
    pub url: Value,
    /// Redacted params, or `"-"`
    pub params: Value,
    /// Authorization header value, or `"-"`
    pub headers: Value,
    /// Response status
    pub status: u16,
    /// Response body; only kept for non-success responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl LogRecord {
    /// Builds a record from a raw batch entry and the operation's response.
    pub fn new(raw: &Value, response: &Response) -> Self {
        let field = |key: &str| present(raw, key).cloned().unwrap_or_else(absent);

        let headers = present(raw, "headers")
            .and_then(Value::as_object)
            .and_then(|headers| header_value(headers, AUTHORIZATION_HEADER))
            .filter(|value| !value.is_null())
            .cloned()
            .unwrap_or_else(absent);

        let params = present(raw, "params")
            .map(redact_params)
            .unwrap_or_else(absent);

        Self {
            method: field("method"),
            url: field("url"),
            params,
            headers,
            status: response.status,
            body: (!response.is_success()).then(|| response.body.clone()),
        }
    }

    /// Renders the record as a JSON object.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn present<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

fn absent() -> Value {
    Value::String(ABSENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::redact::MASK;
    use crate::handler::RawResult;
    use serde_json::json;

    fn ok() -> Response {
        Response::from(RawResult::text(200, "a very large payload"))
    }

    #[test]
    fn copies_method_and_url() {
        let record = LogRecord::new(&json!({"method": "put", "url": "/a"}), &ok());

        assert_eq!(record.method, json!("put"));
        assert_eq!(record.url, json!("/a"));
    }

    #[test]
    fn absent_fields_use_marker() {
        let record = LogRecord::new(&json!({"url": "/a", "params": null}), &ok());

        assert_eq!(record.method, json!(ABSENT));
        assert_eq!(record.params, json!(ABSENT));
        assert_eq!(record.headers, json!(ABSENT));
    }

    #[test]
    fn keeps_only_authorization_header() {
        let raw = json!({
            "url": "/a",
            "headers": {"Authorization": "Bearer X", "X-Trace": "123"}
        });
        let record = LogRecord::new(&raw, &ok());

        assert_eq!(record.headers, json!("Bearer X"));
        assert!(!record.to_value().to_string().contains("123"));
    }

    #[test]
    fn authorization_lookup_ignores_case() {
        let raw = json!({"url": "/a", "headers": {"authorization": "Token abc"}});
        let record = LogRecord::new(&raw, &ok());

        assert_eq!(record.headers, json!("Token abc"));
    }

    #[test]
    fn headers_without_authorization_use_marker() {
        let raw = json!({"url": "/a", "headers": {"Accept": "text/html"}});
        let record = LogRecord::new(&raw, &ok());

        assert_eq!(record.headers, json!(ABSENT));
    }

    #[test]
    fn redacts_params_without_touching_input() {
        let raw = json!({"url": "/a", "params": {"password": "secret", "name": "Ann"}});
        let record = LogRecord::new(&raw, &ok());

        assert_eq!(record.params, json!({"password": MASK, "name": "Ann"}));
        assert_eq!(raw["params"]["password"], json!("secret"));
    }

    #[test]
    fn success_omits_body() {
        let record = LogRecord::new(&json!({"url": "/a"}), &ok());

        assert_eq!(record.status, 200);
        assert_eq!(record.body, None);
        assert!(record.to_value().get("body").is_none());
    }

    #[test]
    fn failure_keeps_body() {
        let response = Response::from(RawResult::json(
            401,
            json!({"errors": ["No user with that authentication token exists"]}),
        ));
        let record = LogRecord::new(&json!({"method": "get", "url": "/a"}), &response);

        assert_eq!(record.status, 401);
        assert_eq!(
            record.to_value()["body"],
            json!({"errors": ["No user with that authentication token exists"]})
        );
    }

    #[test]
    fn other_success_codes_keep_body() {
        let response = Response::from(RawResult::text(201, "created"));
        let record = LogRecord::new(&json!({"url": "/a"}), &response);

        assert_eq!(record.body, Some(json!("created")));
    }
}
