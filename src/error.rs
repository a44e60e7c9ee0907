//! Application error types.
//!
//! Only structurally invalid caller input surfaces as an error. Dangling edge
//! references, near-zero distances and empty graphs are absorbed where they
//! occur and at most logged.

use thiserror::Error;

/// Application-level errors for Landscape.
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Invalid input at {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Shorthand for an [`AppError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
