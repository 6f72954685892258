//! Core error types for daytick-core.
//!
//! Each layer gets its own thiserror enum; [`CoreError`] wraps them for
//! callers that just want to propagate with `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for daytick-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to the task server.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// The response body did not match the expected contract.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be joined with an API path.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl GatewayError {
    /// The single human-readable string surfaced to the user.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Status { message, .. } => message.clone(),
            GatewayError::Transport(e) => e.to_string(),
            GatewayError::Decode(e) => format!("unexpected response from server: {e}"),
            GatewayError::InvalidUrl(e) => format!("invalid server URL: {e}"),
        }
    }

    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home directory could not be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Week start outside the ISO weekday range
    #[error("Invalid start of week {0}: expected 1 (Monday) through 7 (Sunday)")]
    InvalidWeekStart(i64),

    /// Rollover time not in HH:MM form
    #[error("Invalid rollover time '{0}': expected HH:MM between 00:00 and 24:00")]
    InvalidRolloverTime(String),

    /// Session token is not a UUID
    #[error("Invalid session token: {0}")]
    InvalidSessionToken(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
