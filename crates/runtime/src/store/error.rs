#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store request failed: {0}")]
    Transport(String),
    #[error("document store responded with {status}: {message}")]
    Service { status: u16, message: String },
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn transport(error: impl ToString) -> Self {
        StoreError::Transport(error.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
