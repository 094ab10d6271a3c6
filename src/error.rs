//! Error types and handling infrastructure for listsync.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types. The binary layers `anyhow` on top for context at the top level.
//!
//! ## Containment
//!
//! Every failure raised while a reconciliation cycle runs is contained within that
//! cycle: the driver logs it, releases the reconciliation guard and lets the next tick
//! repair whatever partial state was left behind. Only host-level operations
//! (initialization, configuration, terminal setup) surface errors to the caller.

use thiserror::Error;

/// The main error type for listsync operations.
#[derive(Error, Debug)]
pub enum ListError {
    /// A collaborator (item source, presentation adapter) is not available yet.
    /// The refresh driver skips the tick and tries again on the next one.
    #[error("Dependency not available yet: {name}")]
    MissingDependency { name: String },

    /// A presentation adapter call failed
    #[error("Presentation adapter failed during {operation}: {message}")]
    AdapterFailure { operation: String, message: String },

    /// `initialize` was called on a list that is already populated
    #[error("List is already initialized")]
    AlreadyInitialized,

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Terminal or file I/O errors
    #[error("I/O operation failed: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for listsync operations.
pub type Result<T> = std::result::Result<T, ListError>;

impl ListError {
    /// Create a MissingDependency error naming the absent collaborator
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingDependency { name: name.into() }
    }

    /// Create an AdapterFailure for the named adapter operation
    pub fn adapter(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AdapterFailure {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IoError from an io::Error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            message: message.into(),
            source,
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether the error means "try again next tick" rather than a real failure
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }
}

// Automatic conversion from io::Error to ListError
impl From<std::io::Error> for ListError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::IoError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::IoError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::IoError {
                message: "I/O operation failed".to_string(),
                source: err,
            },
        }
    }
}
