//! Standardized logging configuration.
//!
//! Provides consistent logging format with support for:
//! - Human-readable console output (default)
//! - JSON format for log aggregation
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Standard tracing filter (e.g., `info`, `mercadobtc_utils=debug`)
//! - `LOG_FORMAT`: Output format - `pretty` (default), `compact`, or `json`
//! - `LOG_TIMESTAMPS`: Timestamp format - `local` (default), `utc`, or `none`
//! - `LOG_LEVEL`: Default log level (fallback if `RUST_LOG` is not set)
//!
//! The library itself only emits through the `tracing` facade; nothing in
//! the client code depends on a concrete subscriber.

use std::env;

use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc};
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with colors (default for terminals)
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for machine parsing
    Json,
}

impl LogFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Timestamp format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// Local time with timezone (default)
    #[default]
    Local,
    /// UTC time (ISO 8601)
    Utc,
    /// No timestamps
    None,
}

impl TimestampFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "utc" => TimestampFormat::Utc,
            "none" | "off" => TimestampFormat::None,
            _ => TimestampFormat::Local,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format (pretty, compact, json)
    pub format: LogFormat,
    /// Timestamp format
    pub timestamps: TimestampFormat,
    /// Default log level filter
    pub default_level: String,
    /// Include target (module path)
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            timestamps: TimestampFormat::Local,
            default_level: "info".to_string(),
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            format: env::var("LOG_FORMAT")
                .map(|s| LogFormat::from_str(&s))
                .unwrap_or_default(),
            timestamps: env::var("LOG_TIMESTAMPS")
                .map(|s| TimestampFormat::from_str(&s))
                .unwrap_or_default(),
            default_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            include_target: true,
        }
    }

    /// Set the default log level
    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Initialize logging with the given configuration
///
/// # Errors
///
/// Returns an error if the subscriber cannot be initialized (e.g., already set)
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Build env filter from RUST_LOG or default
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target);

    match (config.format, config.timestamps) {
        (LogFormat::Json, TimestampFormat::None) => builder.json().without_time().try_init()?,
        (LogFormat::Json, TimestampFormat::Utc) => builder
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .try_init()?,
        (LogFormat::Json, TimestampFormat::Local) => builder
            .json()
            .with_timer(ChronoLocal::rfc_3339())
            .try_init()?,
        (LogFormat::Compact, TimestampFormat::None) => builder.compact().without_time().try_init()?,
        (LogFormat::Compact, TimestampFormat::Utc) => builder
            .compact()
            .with_timer(ChronoUtc::rfc_3339())
            .try_init()?,
        (LogFormat::Compact, TimestampFormat::Local) => builder
            .compact()
            .with_timer(ChronoLocal::rfc_3339())
            .try_init()?,
        (LogFormat::Pretty, TimestampFormat::None) => builder.without_time().try_init()?,
        (LogFormat::Pretty, TimestampFormat::Utc) => {
            builder.with_timer(ChronoUtc::rfc_3339()).try_init()?
        }
        (LogFormat::Pretty, TimestampFormat::Local) => {
            builder.with_timer(ChronoLocal::rfc_3339()).try_init()?
        }
    }

    Ok(())
}
