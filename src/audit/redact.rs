//! Masking of sensitive request parameters.

use serde_json::Value;

/// Parameter names whose values never reach a log sink.
pub const SENSITIVE_PARAMS: [&str; 6] = [
    "password",
    "password_confirmation",
    "password_digest",
    "encrypted_password",
    "reset_password_token",
    "uuid",
];

/// Replacement written in place of a sensitive value.
pub const MASK: &str = "********";

/// Returns a copy of `params` with every sensitive value masked.
///
/// Nested mappings and sequences are walked as well, so
/// `{"user": {"password": "x"}}` is masked too. Sensitive keys that are not
/// present are not added. The input is never modified.
///
/// # Examples
///
/// ```
/// use batch_dispatch::audit::redact_params;
/// use serde_json::json;
///
/// let params = json!({"password": "secret", "name": "Ann"});
/// let redacted = redact_params(&params);
///
/// assert_eq!(redacted, json!({"password": "********", "name": "Ann"}));
/// assert_eq!(params["password"], "secret");
/// ```
pub fn redact_params(params: &Value) -> Value {
    match params {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if is_sensitive(key) {
                        Value::String(MASK.to_string())
                    } else {
                        redact_params(value)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_params).collect()),
        scalar => scalar.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_PARAMS.contains(&key)
}
