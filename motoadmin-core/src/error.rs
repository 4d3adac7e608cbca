//! src/error.rs
//! ============================================================================
//! # AppError: Unified Error Type for the Admin Console
//!
//! This module defines the application-level error enum (`AppError`) used
//! outside the service layer. The service layer has its own typed taxonomy
//! (`service::error::ServiceError`) that is never thrown past its boundary;
//! `AppError` covers everything around it (terminal, config, I/O, tasks).

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for admin console operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error (e.g., JSON).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Async task failure or join error.
    #[error("Async task failed: {0}")]
    Task(String),

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Unknown entity key requested from the service registry.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> AppError {
        AppError::Other(format!("{}: {}", ctx.into(), self))
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Other(e.to_string())
    }
}
