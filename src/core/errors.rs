//! Error types for the clrdeps library.
//!
//! Only conditions that abort a whole report are errors. Unresolvable names
//! and rollup inconsistencies are recorded as
//! [`Diagnostic`](crate::core::diagnostics::Diagnostic) values instead, so a
//! partial graph is still produced.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Main result type for clrdeps operations.
pub type Result<T> = std::result::Result<T, ClrdepsError>;

/// Error type for all clrdeps operations.
#[derive(Error, Debug)]
pub enum ClrdepsError {
    /// I/O related errors other than a missing report file
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The dependency report file does not exist
    #[error("Cannot find dependency report file: {path}")]
    ReportNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The dependency report is not a well-formed report document
    #[error("Malformed dependency report {path}: {message}")]
    MalformedReport {
        /// Report path (or a stream label when reading from memory)
        path: String,
        /// Error description
        message: String,
        /// Byte offset in the decoded stream, when known
        position: Option<u64>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },
}

impl ClrdepsError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a missing-report error
    pub fn report_not_found(path: &Path) -> Self {
        Self::ReportNotFound {
            path: path.display().to_string(),
        }
    }

    /// Create a malformed-report error
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedReport {
            path: path.into(),
            message: message.into(),
            position: None,
        }
    }

    /// Create a malformed-report error pointing at a stream offset
    pub fn malformed_at(path: impl Into<String>, message: impl Into<String>, position: u64) -> Self {
        Self::MalformedReport {
            path: path.into(),
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error with field context
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error only invalidates the report being read.
    ///
    /// The sensor layer logs these and moves on to the next module.
    pub fn is_report_failure(&self) -> bool {
        matches!(
            self,
            Self::ReportNotFound { .. } | Self::MalformedReport { .. }
        )
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Io { message, .. } | Self::Validation { message, .. } => {
                *message = format!("{}: {}", context.into(), message);
            }
            _ => {}
        }
        self
    }
}

impl From<io::Error> for ClrdepsError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for ClrdepsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for ClrdepsError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ClrdepsError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}
