//! Core type definitions for strata.
//!
//! This crate defines the vocabulary shared by every other strata crate:
//! - Case-insensitive entity type names ([`ObjectType`])
//! - Record identifiers ([`RecordId`])
//! - The normalized event envelope ([`Event`]) and the raw input
//!   classification used at the boundary ([`EventInput`])
//!
//! Store-specific payload shapes are opaque JSON here; only the routing
//! fields (`objectType`, `store`, `state`) are interpreted.

mod event;
mod ids;

pub use event::{Event, EventInput, RESERVED_KEYS};
pub use ids::{ObjectType, RecordId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("object type name must not be empty")]
    EmptyObjectType,
}
