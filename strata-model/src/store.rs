use serde_json::Value;
use std::any::Any;
use strata_types::{Event, ObjectType};

use crate::{Dispatcher, StoreResult};

/// A store that owns every record of one entity type.
///
/// This is the whole surface a state container relies on. Stores are
/// registered once, under the lowercase form of [`object_type`](Self::object_type),
/// and then receive routed events and snapshot payloads.
///
/// Re-applying a duplicate event is only safe when the store's own identity
/// semantics make it a no-op (e.g. upsert by id). The container does not
/// deduplicate.
pub trait EntityStore: Send {
    /// The entity type this store owns. Must not change after construction.
    fn object_type(&self) -> &ObjectType;

    /// Types whose snapshot data must be imported before this store's.
    fn dependencies(&self) -> Vec<ObjectType> {
        Vec::new()
    }

    /// Applies a routed mutation event.
    /// Returns true if the store's records changed.
    fn apply_event(&mut self, event: &Event) -> StoreResult<bool>;

    /// Imports this store's slice of a state snapshot.
    fn import_state(&mut self, payload: Value) -> StoreResult<()>;

    /// Serializes every record this store owns.
    fn to_json(&self) -> Value;

    /// Empties the store.
    ///
    /// Optional capability: the default does nothing and returns false,
    /// which the container treats as "not supported".
    fn clear(&mut self) -> bool {
        false
    }

    /// Store-specific lookup used by the container's `get` passthrough.
    fn get(&self, args: &[Value]) -> Option<Value> {
        let _ = args;
        None
    }

    /// Listeners notified of this store's changes.
    ///
    /// Stores that publish change notifications return their dispatcher so
    /// callers holding only a `dyn EntityStore` can subscribe. The default
    /// returns `None`.
    fn listeners_mut(&mut self) -> Option<&mut Dispatcher> {
        None
    }

    /// Enables typed access to the concrete store.
    fn as_any(&self) -> &dyn Any;

    /// Enables typed mutable access to the concrete store.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
