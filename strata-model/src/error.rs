//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a store reports back to its caller.
///
/// None of these are fatal to a state container: it logs them and keeps
/// processing the rest of the batch.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The event or payload entry carries no usable record id.
    #[error("missing record id in {0} payload")]
    MissingRecordId(String),

    /// The event's `type` is not one this store understands.
    #[error("unsupported event type: {0}")]
    UnsupportedEvent(String),

    /// A snapshot payload had the wrong shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The store's handler refused the record.
    #[error("record {id} rejected: {reason}")]
    Rejected { id: String, reason: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
