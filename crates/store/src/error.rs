use huddle_core::MeetingId;
use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The meeting id is not a key in the aggregate.
    #[error("meeting not found: {0}")]
    MeetingNotFound(MeetingId),

    /// The aggregate could not be read, parsed, or durably rewritten.
    ///
    /// A mutation that hits this error has not been applied: the on-disk
    /// aggregate is whatever the last successful save left behind.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// An I/O error outside the aggregate read/write path.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
