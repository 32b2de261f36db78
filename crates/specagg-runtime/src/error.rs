use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Config error: {0}")]
    Config(#[from] specagg_config::ConfigError),

    #[error("Core error: {0}")]
    Core(#[from] specagg_core::CoreError),

    #[error("Remote error: {0}")]
    Remote(#[from] specagg_remote::RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
