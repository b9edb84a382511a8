//! Process-wide `tracing` subscriber setup.
//!
//! The audit logger never touches global state; this is the one place a host
//! wires a subscriber at startup so [`TracingSink`](crate::TracingSink)
//! output goes somewhere.
//!
//! ```no_run
//! use batch_dispatch::logging::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::json());
//! ```

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,
    /// Level used when `RUST_LOG` is not set
    pub default_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            default_level: Level::INFO,
        }
    }
}

impl LoggingConfig {
    /// JSON output, for production.
    pub fn json() -> Self {
        Self {
            json_format: true,
            ..Default::default()
        }
    }

    /// Text output, for development.
    pub fn text() -> Self {
        Self::default()
    }

    /// Sets the default level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_level.to_string()))
    }
}

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed, in which case the
/// call has no effect.
pub fn init_logging(config: LoggingConfig) -> bool {
    let filter = config.filter();

    if config.json_format {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_current_span(true));
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true));
        tracing::subscriber::set_global_default(subscriber).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_constructors() {
        assert!(LoggingConfig::json().json_format);
        assert!(!LoggingConfig::text().json_format);
        assert_eq!(
            LoggingConfig::text().with_level(Level::DEBUG).default_level,
            Level::DEBUG
        );
    }

    #[test]
    fn second_init_is_a_no_op() {
        init_logging(LoggingConfig::text());
        assert!(!init_logging(LoggingConfig::json()));
    }
}
