//! Error types for GraphQL transport operations.
//!
//! Errors are categorized to enable retry decisions inside the transport and
//! appropriate user feedback at the edges. Remote GraphQL errors returned in a
//! well-formed envelope are NOT transport errors; they travel inside
//! [`Response::errors`](crate::Response) for the caller to classify.

use std::fmt;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of transport errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, DNS, TLS or timeout failure (transient, retryable).
    Network,
    /// Non-success HTTP status.
    Http,
    /// The body was not a GraphQL envelope.
    Protocol,
    /// The caller cancelled or the deadline elapsed.
    Cancelled,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Http => "Remote service rejected the request",
            Self::Protocol => "Malformed response from remote service",
            Self::Cancelled => "Operation cancelled",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your connection to the endpoint and try again",
            Self::Http => "Check the endpoint URL and that the token is valid",
            Self::Protocol => "Verify the endpoint serves the GraphQL API",
            Self::Cancelled => "Increase the timeout or re-run the command",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while executing a GraphQL request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection-level failure before an HTTP status was received.
    #[error("network error: {message}")]
    Network {
        /// Error message from the HTTP client.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The response body could not be decoded as an envelope.
    #[error("invalid GraphQL response: {0}")]
    Protocol(String),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller-supplied deadline elapsed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::Http { .. } => ErrorCategory::Http,
            Error::Protocol(_) => ErrorCategory::Protocol,
            Error::Cancelled | Error::DeadlineExceeded => ErrorCategory::Cancelled,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    ///
    /// Network failures, throttling (429) and server-side failures (5xx) are
    /// retryable. Client errors and cancellation never are.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network { .. } => true,
            Error::Http { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                status: code,
                message: format!("HTTP {code}"),
            },
            ureq::Error::Json(e) => Self::Protocol(e.to_string()),
            other => Self::Network {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::Network {
                message: "reset".to_string()
            }
            .category(),
            ErrorCategory::Network
        );
        assert_eq!(Error::http(404, "missing").category(), ErrorCategory::Http);
        assert_eq!(
            Error::Protocol("eof".to_string()).category(),
            ErrorCategory::Protocol
        );
        assert_eq!(Error::Cancelled.category(), ErrorCategory::Cancelled);
        assert_eq!(Error::DeadlineExceeded.category(), ErrorCategory::Cancelled);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(Error::http(503, "unavailable").is_retryable());
        assert!(Error::http(500, "boom").is_retryable());
        assert!(Error::http(429, "slow down").is_retryable());
        assert!(!Error::http(400, "bad request").is_retryable());
        assert!(!Error::http(401, "unauthorized").is_retryable());
    }

    #[test]
    fn test_cancellation_not_retryable() {
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::DeadlineExceeded.is_retryable());
        assert!(!Error::Protocol("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_category_advice() {
        assert!(!ErrorCategory::Network.advice().is_empty());
        assert!(!ErrorCategory::Http.advice().is_empty());
        assert!(format!("{}", ErrorCategory::Protocol).contains("Malformed"));
    }

    #[test]
    fn test_from_serde_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), ErrorCategory::Protocol);
    }
}
