use std::io::Error as IoError;

use thiserror::Error;

/// Errors raised while loading, validating or writing a probe policy
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[source] IoError),
    #[error("failed to write config file: {0}")]
    Write(#[source] IoError),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no config directory available (set XDG_CONFIG_HOME or HOME)")]
    PathUnavailable,
    #[error("invalid probe policy: {0}")]
    Invalid(String),
}

/// Errors surfaced by the request service.
///
/// Probe failures never show up here; they are folded into each target's
/// status. Only requests that cannot be turned into probing work at all fail.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
