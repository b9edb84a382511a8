//! Rewrites an operation's context so it looks like a real inbound request.

use regex::{NoExpand, Regex};
use serde_json::Value;

use crate::config::BatchConfig;
use crate::context::{keys, Context};
use crate::error::Result;
use crate::operation::OperationDescriptor;

/// Fabricates the request environment for a batch operation.
///
/// The synthesizer is stateless apart from the compiled endpoint pattern,
/// so one instance can serve every operation of every batch.
///
/// # Examples
///
/// ```
/// use batch_dispatch::{BatchConfig, Context, OperationDescriptor, RequestSynthesizer};
/// use batch_dispatch::context::keys;
/// use serde_json::json;
///
/// let synthesizer = RequestSynthesizer::new(&BatchConfig::default()).unwrap();
/// let raw = json!({"method": "get", "url": "api/v1/widgets?color=red"});
/// let mut op = OperationDescriptor::parse(&raw, &Context::new()).unwrap();
///
/// let ctx = synthesizer.synthesize(&mut op);
/// assert_eq!(ctx.get_str(keys::REQUEST_METHOD), Some("GET"));
/// assert_eq!(ctx.get_str(keys::PATH_INFO), Some("api/v1/widgets"));
/// assert_eq!(ctx.get_str(keys::QUERY_STRING), Some("color=red"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSynthesizer {
    endpoint: Regex,
}

impl RequestSynthesizer {
    /// Creates a synthesizer for the configured batch endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`](crate::Error::InvalidEndpoint) if
    /// the endpoint is not a valid pattern.
    pub fn new(config: &BatchConfig) -> Result<Self> {
        Ok(Self {
            endpoint: config.endpoint_pattern()?,
        })
    }

    /// Rewrites the descriptor's context in place and returns it.
    ///
    /// Entries the operation does not describe are preserved, so transport
    /// metadata from the batch request stays visible to the handler.
    pub fn synthesize<'a>(&self, op: &'a mut OperationDescriptor) -> &'a mut Context {
        let (path, query) = split_url(&op.url);
        let query = query.map_or(Value::Null, |qs| Value::String(qs.to_string()));
        let query_params = if op.is_get() {
            op.params.clone()
        } else {
            Value::Null
        };
        let ctx = &mut op.context;

        for (name, value) in &op.headers {
            ctx.insert(header_key(name), value.clone());
        }

        ctx.insert(keys::REQUEST_METHOD, op.method.to_uppercase());

        // Some servers never populate REQUEST_URI; leave it absent for them.
        if let Some(uri) = ctx.get_str(keys::REQUEST_URI) {
            let rewritten = self
                .endpoint
                .replace_all(uri, NoExpand(&op.url))
                .into_owned();
            ctx.insert(keys::REQUEST_URI, rewritten);
        }

        for key in [keys::REQUEST_PATH, keys::PATH_INFO, keys::ORIGINAL_FULLPATH] {
            ctx.insert(key, path);
        }

        ctx.insert(keys::REQUEST_QUERY_STRING, query.clone());
        ctx.insert(keys::QUERY_STRING, query);

        ctx.insert(keys::REQUEST_FORM_HASH, op.params.clone());
        ctx.insert(keys::REQUEST_QUERY_HASH, query_params);

        tracing::trace!(method = %op.method, url = %op.url, "synthesized sub-request context");
        ctx
    }
}

/// Splits a url into its path and optional query string at the first `?`.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Converts a header name into its environment key, e.g.
/// `Content-Type` → `HTTP_CONTENT_TYPE`.
pub fn header_key(name: &str) -> String {
    format!("{}{}", keys::HEADER_PREFIX, name.replace('-', "_").to_uppercase())
}
