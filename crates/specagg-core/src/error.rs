use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
