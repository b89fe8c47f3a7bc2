use thiserror::Error;

#[derive(Error, Debug)]
pub enum UgcError {
    /// The action itself is malformed (e.g. rating score out of range).
    /// Rejected before any persistence call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No data exists yet for the requested key. A normal outcome,
    /// distinct from a storage fault.
    #[error("not found: {0}")]
    NotFound(String),

    /// The persistence gateway could not complete the operation.
    /// Transient; safe to retry since all writes are idempotent or
    /// upsert-based and the rating delta is re-read on retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, UgcError>;
