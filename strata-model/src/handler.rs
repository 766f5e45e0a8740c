use crate::Record;
use serde_json::Value;

/// Optional hook for stores that need validation, post-import processing,
/// or merge logic beyond the default shallow field merge.
///
/// Most stores do NOT need one; [`RecordStore`](crate::RecordStore) falls
/// back to [`DefaultHandler`].
pub trait RecordHandler: Send + Sync {
    /// Validate a record before it is stored.
    /// Return `Err(message)` to reject the write.
    fn validate(&self, record: &Record) -> Result<(), String> {
        let _ = record;
        Ok(())
    }

    /// Called on each record after it is read from a snapshot payload.
    /// Use this for computing derived/transient fields.
    fn on_after_import(&self, record: &mut Record) {
        let _ = record;
    }

    /// Merge an update into an existing record.
    /// Default: top-level fields of `incoming` overwrite those of `local`.
    fn merge(&self, local: &Record, incoming: &Record) -> Record {
        let mut merged = local.clone();
        match (&mut merged.data, &incoming.data) {
            (Value::Object(into), Value::Object(from)) => {
                for (key, value) in from {
                    into.insert(key.clone(), value.clone());
                }
            }
            (slot, data) => *slot = data.clone(),
        }
        merged
    }
}

/// Handler with every default behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandler;

impl RecordHandler for DefaultHandler {}
