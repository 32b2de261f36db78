use thiserror::Error;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("No download URL for '{0}'")]
    MissingDownloadUrl(String),

    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("Failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    pub(crate) fn parse(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        RemoteError::Parse {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
