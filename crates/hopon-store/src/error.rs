//! Error types for the storage layer.

/// Errors raised by a [`ClientStore`](crate::ClientStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded.
    #[error("storage document malformed: {0}")]
    Encode(#[from] serde_json::Error),
}
