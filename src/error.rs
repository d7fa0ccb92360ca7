//! Error types for the submission toolkit
//!
//! Provides structured error handling with context and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the submission toolkit
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// CSV reading or writing failed
    #[error("CSV error in {path}: {message}")]
    Csv {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<csv::Error>,
    },

    /// A file does not have the columns we need
    #[error("Schema error in {path}: {message}")]
    Schema { message: String, path: PathBuf },

    /// File system operation errors
    #[error("File system error: {operation} failed on {path}")]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Report serialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Errors raised while building predictions
    #[error("Prediction error: {message}")]
    Prediction { message: String },
}

impl SubmissionError {
    /// Create a new CSV error wrapping the underlying parser failure
    pub fn csv<P: Into<PathBuf>>(message: impl Into<String>, path: P, source: csv::Error) -> Self {
        Self::Csv {
            message: message.into(),
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a new schema error
    pub fn schema<P: Into<PathBuf>>(message: impl Into<String>, path: P) -> Self {
        Self::Schema {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a new prediction error
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_mentions_path() {
        let err = SubmissionError::schema("missing column 'uid'", "data/train.csv");
        let message = err.to_string();
        assert!(message.contains("data/train.csv"));
        assert!(message.contains("missing column 'uid'"));
    }

    #[test]
    fn test_serialization_error_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SubmissionError::serialization("metrics report", json_err);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "Serialization error: metrics report");
    }

    #[test]
    fn test_file_system_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = SubmissionError::file_system("read", "missing.csv", io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "File system error: read failed on missing.csv");
    }
}
