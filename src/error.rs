//! Error types for the librarius SDK.
//!
//! This module defines the error type system for everything that can go wrong
//! when talking to the librarius backend: local validation, connection
//! establishment, and mid-stream failures.

use std::error;
use std::fmt;
use std::io;
use std::str::Utf8Error;
use std::sync::Arc;

/// The main error type for the librarius SDK.
#[derive(Clone, Debug)]
pub enum Error {
    /// The API returned a non-success status code.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Human-readable error message.
        message: String,
        /// Request ID for debugging and support.
        request_id: Option<String>,
    },

    /// The caller supplied input that was rejected before any network activity.
    InvalidInput {
        /// Human-readable error message.
        message: String,
    },

    /// The exchange could not be established, or dropped before any byte arrived.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The request timed out.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// A streaming exchange ended without its completion marker.
    ///
    /// Events decoded before the cut are valid partial output; callers must
    /// not discard them.
    TruncatedStream {
        /// Human-readable error message.
        message: String,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Text decoding error (invalid UTF-8 in a response body).
    Encoding {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new API error.
    pub fn api(status_code: u16, message: impl Into<String>, request_id: Option<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
            request_id,
        }
    }

    /// Creates a new invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new truncated stream error.
    pub fn truncated_stream(message: impl Into<String>) -> Self {
        Error::TruncatedStream {
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new encoding error.
    pub fn encoding(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Encoding {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if this error is an invalid input error.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a truncated stream error.
    pub fn is_truncated_stream(&self) -> bool {
        matches!(self, Error::TruncatedStream { .. })
    }

    /// Returns true if this error came back from the API with a status code.
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Returns true if this error terminated an exchange at the transport
    /// level.
    ///
    /// These are the errors a session converts into a completed,
    /// failure-annotated assistant message rather than re-raising.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Error::Api { .. }
                | Error::Connection { .. }
                | Error::Timeout { .. }
                | Error::TruncatedStream { .. }
                | Error::Encoding { .. }
                | Error::HttpClient { .. }
        )
    }

    /// Returns true if retrying the request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500..=599)
            }
            Error::Timeout { .. } => true,
            Error::Connection { .. } => true,
            Error::TruncatedStream { .. } => true,
            _ => false,
        }
    }

    /// Returns the request ID associated with this error, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api {
                status_code,
                message,
                request_id,
            } => {
                if let Some(request_id) = request_id {
                    write!(
                        f,
                        "API error (status {status_code}): {message} (Request ID: {request_id})"
                    )
                } else {
                    write!(f, "API error (status {status_code}): {message}")
                }
            }
            Error::InvalidInput { message } => {
                write!(f, "Invalid input: {message}")
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::TruncatedStream { message } => {
                write!(f, "Truncated stream: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Encoding { message, .. } => {
                write!(f, "Encoding error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Encoding { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::encoding(format!("UTF-8 error: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for librarius operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_api_with_request_id() {
        let err = Error::api(502, "bad gateway", Some("req-123".to_string()));
        assert_eq!(
            err.to_string(),
            "API error (status 502): bad gateway (Request ID: req-123)"
        );
    }

    #[test]
    fn display_truncated_stream() {
        let err = Error::truncated_stream("stream ended without completion marker");
        assert_eq!(
            err.to_string(),
            "Truncated stream: stream ended without completion marker"
        );
    }

    #[test]
    fn transport_failure_classification() {
        assert!(Error::connection("refused", None).is_transport_failure());
        assert!(Error::timeout("deadline elapsed", Some(30.0)).is_transport_failure());
        assert!(Error::truncated_stream("cut").is_transport_failure());
        assert!(Error::api(503, "unavailable", None).is_transport_failure());
        assert!(!Error::invalid_input("empty message").is_transport_failure());
        assert!(!Error::serialization("bad json", None).is_transport_failure());
    }

    #[test]
    fn retryable_statuses() {
        assert!(Error::api(429, "slow down", None).is_retryable());
        assert!(Error::api(503, "unavailable", None).is_retryable());
        assert!(!Error::api(404, "missing", None).is_retryable());
        assert!(!Error::invalid_input("empty message").is_retryable());
    }

    #[test]
    fn status_code_only_on_api() {
        assert_eq!(Error::api(500, "boom", None).status_code(), Some(500));
        assert_eq!(Error::connection("refused", None).status_code(), None);
    }
}
