//! Error types for the state container.

use thiserror::Error;

/// Result type for container operations.
pub type StateResult<T> = Result<T, StateError>;

/// Configuration errors. These indicate a programming mistake during setup
/// and are the only failures the container returns to its caller.
#[derive(Debug, Error)]
pub enum StateError {
    /// A store is already registered under the same normalized type name.
    #[error("a store for object type '{object_type}' is already registered")]
    DuplicateStore { object_type: String },
}
