use thiserror::Error;

/// Errors that can occur while preparing a batch operation.
///
/// Faults raised by the downstream handler are *not* represented here; they
/// are contained by the [`Executor`](crate::Executor) and turned into a
/// [`Response`](crate::Response). Only problems with the operation input or
/// with the dispatcher configuration surface as `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation is missing a usable method or url after defaulting.
    ///
    /// `method` and `url` hold the received values rendered as JSON so the
    /// message shows exactly what the client sent (`null` when absent).
    #[error("batch operation must include method (received {method}) and url (received {url})")]
    MalformedOperation {
        /// Received method, rendered as JSON
        method: String,
        /// Received url, rendered as JSON
        url: String,
    },

    /// An optional operation field is present but has the wrong shape.
    #[error("batch operation field `{field}` must be {expected} (received {received})")]
    InvalidField {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable description of the accepted shape
        expected: &'static str,
        /// Received value, rendered as JSON
        received: String,
    },

    /// The configured batch endpoint is not a valid pattern.
    #[error("invalid batch endpoint pattern `{pattern}`: {source}")]
    InvalidEndpoint {
        /// The configured endpoint
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Configuration could not be deserialized.
    #[error("invalid batch configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the error was caused by client input rather than
    /// by server configuration.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedOperation { .. } | Error::InvalidField { .. }
        )
    }

    /// HTTP status a controller should report for this error.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            422
        } else {
            500
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_operation_message_includes_received_values() {
        let error = Error::MalformedOperation {
            method: "\"get\"".to_string(),
            url: "null".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("(received \"get\")"));
        assert!(message.contains("(received null)"));
    }

    #[test]
    fn client_errors_map_to_unprocessable() {
        let error = Error::InvalidField {
            field: "headers",
            expected: "a mapping",
            received: "[]".to_string(),
        };

        assert!(error.is_client_error());
        assert_eq!(error.status_code(), 422);
        assert!(error.to_string().contains("`headers`"));
    }

    #[test]
    fn endpoint_errors_are_server_errors() {
        let source = regex::Regex::new("(").unwrap_err();
        let error = Error::InvalidEndpoint {
            pattern: "(".to_string(),
            source,
        };

        assert!(!error.is_client_error());
        assert_eq!(error.status_code(), 500);
    }
}
