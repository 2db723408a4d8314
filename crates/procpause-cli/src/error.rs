//! Error types for the procpause CLI.

use thiserror::Error;

/// Errors that can occur while preparing a run.
#[derive(Debug, Error)]
pub enum CliError {
    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid process query.
    #[error("Invalid query: {0}")]
    Query(#[from] procpause::QueryError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using `CliError`.
pub type Result<T> = std::result::Result<T, CliError>;
