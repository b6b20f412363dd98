//! Configuration error types.

use thiserror::Error;

/// Errors raised while reading settings from the environment.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("Environment variable {0} not set")]
    MissingEnvVar(String),

    /// A variable is set but its value cannot be used.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    /// Create a missing variable error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingEnvVar(key.into())
    }

    /// Create an invalid value error.
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
