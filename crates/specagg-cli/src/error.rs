//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] specagg_config::ConfigError),

    #[error("{0}")]
    Runtime(#[from] specagg_runtime::RuntimeError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("General error: {0}")]
    General(String),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
