//! Store error types

/// Errors raised by record store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend I/O failure
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Document failed to serialize or deserialize
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key is not a valid record identifier
    #[error("invalid record key: {0:?}")]
    InvalidKey(String),
}
