//! Core error types for MAYBELATER.
//!
//! Only load-time and configuration failures surface as `CoreError`.
//! Runtime misses (a maybe variable that is not real yet, an unresolved
//! paradox, a bad expression) are soft outcomes owned by the crates that
//! produce them and never become a `CoreError`.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid encoding (JSON config, AST dump)
    InvalidEncoding { reason: String },

    /// Source or config file could not be read
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// Program text could not be parsed
    ParseError { line: usize, message: String },

    /// Validation error
    Validation { field: String, reason: String },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding { reason } => write!(f, "Invalid encoding: {}", reason),
            Self::Io { path, message } => write!(f, "Cannot read {}: {}", path, message),
            Self::ParseError { line, message } => {
                write!(f, "Parse error at line {}: {}", line, message)
            }
            Self::Validation { field, reason } => {
                write!(f, "Validation failed for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidEncoding {
            reason: err.to_string(),
        }
    }
}
