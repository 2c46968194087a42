//! Error types for fsgate
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API,
//! and convert to HTTP responses at the serving boundary.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serving error: {0}")]
    Serve(#[from] ServeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A request path was refused by the filesystem access policy.
///
/// This is the one error kind the serving layer handles locally: the
/// file-server collaborator raises it through [`ServeError::Denied`] and
/// the orchestration layer turns it into a 403 response. Every other
/// fault is re-raised unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("access denied for path '{path}': {reason}")]
pub struct PolicyDeniedError {
    pub path: String,
    pub reason: String,
}

impl PolicyDeniedError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn denied_by_pattern(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: format!("denied by pattern '{}'", pattern.into()),
        }
    }

    pub fn outside_allowed_roots(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: "outside the allowed roots".into(),
        }
    }
}

/// Errors raised by the file-server collaborator.
///
/// `Denied` is the only variant with a defined local recovery; callers
/// match on it and must propagate everything else.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Denied(#[from] PolicyDeniedError),

    #[error("IO error while serving: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for serving operations
pub type ServeResult<T> = std::result::Result<T, ServeError>;
