use crate::env_resolver::EnvResolverError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment error: {0}")]
    Env(#[from] EnvResolverError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{0} environment variable is required")]
    MissingCredential(String),

    #[error("At least one service must be configured")]
    NoServices,

    #[error("At least one audience must be configured")]
    NoAudiences,

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
