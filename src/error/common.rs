//! Unified error type for Mercado Bitcoin API operations.
//!
//! Covers the trade API (signed POST calls), the public data API and the
//! analysis layer built on top of them. Failures are expected, recoverable
//! conditions: every operation surfaces them as a typed result and nothing
//! in this crate treats them as fatal.

use thiserror::Error;

use super::traits::{ErrorCategory, ErrorClassification};

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the Mercado Bitcoin APIs.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ApiError {
    /// Missing or invalid credentials/settings; raised before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection-level transport failure (DNS, refused, reset, timeout)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-success HTTP status from the transport; the body is not parsed
    #[error("HTTP {code}: {reason}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Status reason phrase
        reason: String,
    },

    /// The TAPI rejected the credentials, nonce or signature
    #[error("Authentication error [{code}]: {message}")]
    Authentication {
        /// Envelope status code
        code: i32,
        /// Server-supplied error message
        message: String,
    },

    /// Application-level rejection carried in the response envelope
    #[error("TAPI error [{code}]: {message}")]
    Api {
        /// Envelope status code
        code: i32,
        /// Server-supplied error message
        message: String,
    },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local file read/write failure (summary persistence)
    #[error("I/O error: {0}")]
    Io(String),

    /// Not enough data to carry out the requested computation
    #[error("Data not available: {0}")]
    DataNotAvailable(String),
}

impl ErrorClassification for ApiError {
    fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Configuration(_) => ErrorCategory::Configuration,
            ApiError::Connection(_) => ErrorCategory::Transient,
            // A bad HTTP status aborts rather than retries
            ApiError::Status { .. } => ErrorCategory::Permanent,
            ApiError::Authentication { .. } => ErrorCategory::Configuration,
            ApiError::Api { .. } => ErrorCategory::Permanent,
            ApiError::Parse(_) => ErrorCategory::Permanent,
            ApiError::Io(_) => ErrorCategory::Permanent,
            ApiError::DataNotAvailable(_) => ErrorCategory::Permanent,
        }
    }

    fn suggested_retry_delay(&self) -> Option<std::time::Duration> {
        match self {
            ApiError::Connection(_) => Some(std::time::Duration::from_millis(100)),
            _ => None,
        }
    }
}

impl ApiError {
    /// Returns true if this is a transport-level failure (connection or
    /// HTTP status), as opposed to an application-level rejection.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Connection(_) | ApiError::Status { .. })
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Authentication { .. })
    }

    /// Returns the envelope status code if this is an application failure.
    pub fn envelope_code(&self) -> Option<i32> {
        match self {
            ApiError::Authentication { code, .. } | ApiError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
