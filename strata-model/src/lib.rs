//! Entity store model for strata.
//!
//! Defines the pieces every store-backed subsystem depends on:
//! - [`EntityStore`]: the contract a state container drives (events,
//!   import/export, dependencies)
//! - [`Dispatcher`]: synchronous named-event publish/subscribe
//! - [`Record`]: one domain object (id, type, JSON data)
//! - [`RecordHandler`]: optional validation/merge hook for a store
//! - [`RecordStore`]: generic upsert-by-id store implementing the contract
//!
//! Presentation layers subscribe to a store's [`Dispatcher`] through
//! [`EntityStore::listeners_mut`]; the container never relays store
//! notifications.

mod dispatcher;
mod error;
mod handler;
mod record;
mod record_store;
mod store;

pub use dispatcher::{Dispatcher, Listener, ListenerId, ANY_EVENT};
pub use error::{StoreError, StoreResult};
pub use handler::{DefaultHandler, RecordHandler};
pub use record::Record;
pub use record_store::RecordStore;
pub use store::EntityStore;
