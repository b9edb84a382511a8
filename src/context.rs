//! Request context owned by a single batch operation.

use serde::Serialize;
use serde_json::{Map, Value};

/// Well-known context keys written by the request synthesizer.
///
/// The names follow the CGI/rack environment conventions downstream
/// handlers already understand.
pub mod keys {
    /// Upper-cased HTTP method.
    pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
    /// Full original request URI, when the host server provides one.
    pub const REQUEST_URI: &str = "REQUEST_URI";
    /// Request path without the query string.
    pub const REQUEST_PATH: &str = "REQUEST_PATH";
    /// Path as seen by the routed application.
    pub const PATH_INFO: &str = "PATH_INFO";
    /// Full path of the request.
    pub const ORIGINAL_FULLPATH: &str = "ORIGINAL_FULLPATH";
    /// Raw query string, or `null` when the url has none.
    pub const QUERY_STRING: &str = "QUERY_STRING";
    /// Query string the parsed query parameters were derived from.
    pub const REQUEST_QUERY_STRING: &str = "request.query_string";
    /// Parsed body parameters.
    pub const REQUEST_FORM_HASH: &str = "request.form_hash";
    /// Parsed query parameters, or `null` for non-GET operations.
    pub const REQUEST_QUERY_HASH: &str = "request.query_hash";
    /// Prefix applied to every header-derived key.
    pub const HEADER_PREFIX: &str = "HTTP_";
}

/// Key/value state handed to the downstream handler.
///
/// A `Context` plays the role of a request environment. Values are arbitrary
/// JSON-like structures so transport metadata of any shape can ride along.
///
/// `Context` intentionally does not implement `Clone`: the only way to copy
/// one is [`derive`](Self::derive), which guarantees the copy shares no
/// container with its source.
///
/// # Examples
///
/// ```
/// use batch_dispatch::Context;
/// use serde_json::json;
///
/// let mut base = Context::new();
/// base.insert("rack.session", json!({"user_id": 7}));
///
/// let mut derived = base.derive();
/// derived.insert("rack.session", json!({"user_id": 8}));
///
/// assert_eq!(base.get("rack.session"), Some(&json!({"user_id": 7})));
/// ```
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    entries: Map<String, Value>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces a structurally independent deep copy of this context.
    ///
    /// Every object and array is rebuilt, so mutations of the result can
    /// never be observed through `self` or through any other derived copy.
    pub fn derive(&self) -> Context {
        Context {
            entries: deep_copy_map(&self.entries),
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Returns the string stored under `key`, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Returns `true` if `key` is present, even when its value is `null`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the context has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Consumes the context and returns the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }
}

impl From<Map<String, Value>> for Context {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn deep_copy_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), deep_copy(value)))
        .collect()
}

fn deep_copy(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(deep_copy_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(deep_copy).collect()),
        scalar => scalar.clone(),
    }
}
