//! Errors raised by the SWC client.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// SWC client errors.
#[derive(Error, Debug)]
pub enum SwcError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },
    #[error("Transient failure during {operation}: {reason}")]
    Transient {
        operation: String,
        /// HTTP status when the failure came from a response.
        status: Option<u16>,
        reason: String,
    },
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("Failed to decode response from {operation}: {reason}")]
    Decode { operation: String, reason: String },
    #[error("Transfer to {} incomplete: {reason}", .path.display())]
    Transfer { path: PathBuf, reason: String },
    #[error("Refusing to overwrite existing file {}", .0.display())]
    DestinationExists(PathBuf),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Max retries exceeded after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<SwcError> },
}

impl SwcError {
    /// Whether the retry policy may reattempt the call that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SwcError::Transient { .. } | SwcError::Transfer { .. })
    }

    /// The underlying failure, looking through [`SwcError::RetriesExhausted`].
    pub fn root(&self) -> &SwcError {
        match self {
            SwcError::RetriesExhausted { last, .. } => last.root(),
            other => other,
        }
    }

    /// HTTP status carried by the underlying failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            SwcError::Transient { status, .. } => *status,
            SwcError::Status { status, .. } => Some(*status),
            SwcError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), SwcError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), SwcError::Validation(_))
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self.root(), SwcError::Transfer { .. })
    }

    /// Classify a transport error from `reqwest` for `operation`.
    pub(crate) fn from_transport(operation: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            SwcError::Transient {
                operation: operation.to_string(),
                status: None,
                reason: err.to_string(),
            }
        } else {
            SwcError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient(status: Option<u16>) -> SwcError {
        SwcError::Transient {
            operation: "GET /".to_string(),
            status,
            reason: "boom".to_string(),
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(transient(Some(503)).is_retryable());
        assert!(SwcError::Transfer {
            path: PathBuf::from("out.csv"),
            reason: "closed".to_string(),
        }
        .is_retryable());
        assert!(!SwcError::Validation("bad".to_string()).is_retryable());
        assert!(!SwcError::Status {
            operation: "GET /".to_string(),
            status: 400,
            body: String::new(),
        }
        .is_retryable());
    }

    #[test]
    fn test_root_and_status_look_through_exhaustion() {
        let err = SwcError::RetriesExhausted {
            attempts: 4,
            last: Box::new(transient(Some(502))),
        };
        assert_eq!(err.status(), Some(502));
        assert!(matches!(err.root(), SwcError::Transient { .. }));
        assert!(err.to_string().contains("after 4 attempts"));
        assert!(err.to_string().contains("boom"));
    }
}
