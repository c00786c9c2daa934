//! Error types for stackctl

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for stackctl
#[derive(Error, Debug)]
pub enum StackError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid or conflicting options; raised before any network call
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An `@path` value could not be read
    #[error("Cannot read content from {}: {reason}", path.display())]
    ContentResolution { path: PathBuf, reason: String },

    /// The remote service rejected the request
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A query failed for a reason worth retrying
    #[error("Transient query error: {0}")]
    TransientQuery(String),

    /// The stack reached a terminal failure status
    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    /// Nothing to change while no-ops are configured as failures
    #[error("No changes to deploy")]
    NoChanges,

    #[error("Timed out waiting for the stack to reach a terminal status")]
    TimedOut,

    #[error("Cancelled by shutdown request; a request already submitted keeps running")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StackError {
    /// Whether retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StackError::TransientQuery(_) => true,
            StackError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
