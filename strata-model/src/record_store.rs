//! Generic upsert-by-id entity store.
//!
//! Understands three event types, keyed by the event's `type` field:
//! - `create`: insert or replace the record
//! - `update`: merge into the existing record (insert when absent)
//! - `delete`: remove the record
//!
//! Record fields come from the event's `data` object when present, otherwise
//! from the event itself minus the routing keys. Because every write is keyed
//! by id, re-applying the same event leaves the store unchanged.

use serde_json::{Map, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use strata_types::{Event, ObjectType, RecordId, RESERVED_KEYS};
use tracing::{debug, warn};

use crate::{
    DefaultHandler, Dispatcher, EntityStore, Record, RecordHandler, StoreError, StoreResult,
};

/// In-memory store for one entity type.
pub struct RecordStore {
    object_type: ObjectType,
    dependencies: Vec<ObjectType>,
    records: BTreeMap<RecordId, Record>,
    handler: Arc<dyn RecordHandler>,
    listeners: Dispatcher,
}

impl RecordStore {
    /// Creates an empty store with no dependencies and the default handler.
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            dependencies: Vec::new(),
            records: BTreeMap::new(),
            handler: Arc::new(DefaultHandler),
            listeners: Dispatcher::new(),
        }
    }

    /// Declares the types that must be imported before this one.
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = ObjectType>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Installs a validation/merge handler.
    pub fn with_handler(mut self, handler: Arc<dyn RecordHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up one record.
    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    /// Iterates over records in id order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    fn make_record(&self, id: RecordId, data: Value) -> Record {
        Record {
            id,
            object_type: self.object_type.declared().to_string(),
            data,
        }
    }

    fn validate(&self, record: &Record) -> StoreResult<()> {
        self.handler
            .validate(record)
            .map_err(|reason| StoreError::Rejected {
                id: record.id.to_string(),
                reason,
            })
    }

    fn apply_create(&mut self, id: RecordId, fields: Value) -> StoreResult<bool> {
        let record = self.make_record(id.clone(), fields);
        self.validate(&record)?;

        if self.records.get(&id) == Some(&record) {
            return Ok(false);
        }
        let data = record.data.clone();
        self.records.insert(id, record);
        self.listeners.dispatch("create", &data);
        Ok(true)
    }

    fn apply_update(&mut self, id: RecordId, fields: Value) -> StoreResult<bool> {
        let incoming = self.make_record(id.clone(), fields);
        let merged = match self.records.get(&id) {
            Some(local) => self.handler.merge(local, &incoming),
            None => incoming,
        };
        self.validate(&merged)?;

        if self.records.get(&id) == Some(&merged) {
            return Ok(false);
        }
        let data = merged.data.clone();
        self.records.insert(id, merged);
        self.listeners.dispatch("update", &data);
        Ok(true)
    }

    fn apply_delete(&mut self, id: &RecordId) -> bool {
        match self.records.remove(id) {
            Some(removed) => {
                self.listeners.dispatch("delete", &removed.data);
                true
            }
            None => false,
        }
    }

    fn import_entry(&mut self, id: RecordId, data: Value) {
        let mut record = self.make_record(id, data);
        self.handler.on_after_import(&mut record);
        if let Err(reason) = self.handler.validate(&record) {
            warn!(
                object_type = %self.object_type,
                id = %record.id,
                "Skipping imported record: {reason}"
            );
            return;
        }
        self.records.insert(record.id.clone(), record);
    }
}

/// Extracts the record fields an event carries.
fn record_fields(event: &Event) -> Value {
    if let Some(data) = event.field("data").filter(|data| data.is_object()) {
        return data.clone();
    }
    let fields: Map<String, Value> = event
        .payload()
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();
    Value::Object(fields)
}

impl EntityStore for RecordStore {
    fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    fn dependencies(&self) -> Vec<ObjectType> {
        self.dependencies.clone()
    }

    fn apply_event(&mut self, event: &Event) -> StoreResult<bool> {
        let kind = event
            .kind()
            .ok_or_else(|| StoreError::UnsupportedEvent("<missing type>".to_string()))?
            .to_string();
        let id = event
            .record_id()
            .ok_or_else(|| StoreError::MissingRecordId(kind.clone()))?;

        debug!(object_type = %self.object_type, %id, "Applying {kind} event");

        match kind.as_str() {
            "create" => self.apply_create(id, record_fields(event)),
            "update" => self.apply_update(id, record_fields(event)),
            "delete" => Ok(self.apply_delete(&id)),
            _ => Err(StoreError::UnsupportedEvent(kind)),
        }
    }

    fn import_state(&mut self, payload: Value) -> StoreResult<()> {
        let before = self.records.len();
        match payload {
            Value::Null => return Ok(()),
            Value::Object(entries) => {
                for (key, data) in entries {
                    let id = data
                        .get("id")
                        .and_then(RecordId::from_value)
                        .unwrap_or_else(|| RecordId::new(key));
                    self.import_entry(id, data);
                }
            }
            Value::Array(items) => {
                for data in items {
                    match data.get("id").and_then(RecordId::from_value) {
                        Some(id) => self.import_entry(id, data),
                        None => warn!(
                            object_type = %self.object_type,
                            "Skipping imported record without an id"
                        ),
                    }
                }
            }
            other => {
                return Err(StoreError::InvalidPayload(format!(
                    "expected an object or array of records, got {other}"
                )));
            }
        }

        debug!(
            object_type = %self.object_type,
            records = self.records.len(),
            added = self.records.len().saturating_sub(before),
            "Imported state"
        );
        let summary = serde_json::json!({ "count": self.records.len() });
        self.listeners.dispatch("import", &summary);
        Ok(())
    }

    fn to_json(&self) -> Value {
        let entries: Map<String, Value> = self
            .records
            .iter()
            .map(|(id, record)| (id.to_string(), record.data.clone()))
            .collect();
        Value::Object(entries)
    }

    fn clear(&mut self) -> bool {
        self.records.clear();
        self.listeners.dispatch("clear", &Value::Null);
        true
    }

    fn get(&self, args: &[Value]) -> Option<Value> {
        let id = args.first().and_then(RecordId::from_value)?;
        self.records.get(&id).map(|record| record.data.clone())
    }

    /// Notified on `create`, `update`, `delete`, `import` and `clear`.
    fn listeners_mut(&mut self) -> Option<&mut Dispatcher> {
        Some(&mut self.listeners)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("object_type", &self.object_type)
            .field("dependencies", &self.dependencies)
            .field("records", &self.records.len())
            .finish()
    }
}
