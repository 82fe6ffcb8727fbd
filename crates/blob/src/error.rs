use thiserror::Error;

/// Errors that can occur during blob area operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The blob name is not a valid single path segment.
    #[error("invalid blob name: {0}")]
    InvalidName(String),

    /// An underlying filesystem error.
    #[error("blob storage io error: {0}")]
    Io(#[from] std::io::Error),
}
