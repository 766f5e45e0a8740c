//! Shared test helpers for state container tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::any::Any;
use std::sync::{Arc, Mutex};
use strata_model::{EntityStore, RecordStore, StoreError, StoreResult};
use strata_state::{RecordingSink, StateConfig, StateContainer};
use strata_types::{Event, ObjectType};

pub type ImportLog = Arc<Mutex<Vec<String>>>;

pub fn ty(name: &str) -> ObjectType {
    ObjectType::new(name).unwrap()
}

/// Store that records the order of `import_state` calls in a shared log.
/// Does not support `clear`.
pub struct TrackingStore {
    object_type: ObjectType,
    dependencies: Vec<ObjectType>,
    log: ImportLog,
    payload: Value,
    events: Vec<Value>,
}

impl TrackingStore {
    pub fn new(name: &str, dependencies: &[&str], log: &ImportLog) -> Self {
        Self {
            object_type: ty(name),
            dependencies: dependencies.iter().map(|d| ty(d)).collect(),
            log: log.clone(),
            payload: Value::Null,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[Value] {
        &self.events
    }
}

impl EntityStore for TrackingStore {
    fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    fn dependencies(&self) -> Vec<ObjectType> {
        self.dependencies.clone()
    }

    fn apply_event(&mut self, event: &Event) -> StoreResult<bool> {
        if event.kind() == Some("explode") {
            return Err(StoreError::UnsupportedEvent("explode".to_string()));
        }
        self.events.push(event.payload().clone());
        Ok(true)
    }

    fn import_state(&mut self, payload: Value) -> StoreResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(self.object_type.as_key().to_string());
        self.payload = payload;
        Ok(())
    }

    fn to_json(&self) -> Value {
        self.payload.clone()
    }

    fn get(&self, _args: &[Value]) -> Option<Value> {
        Some(self.payload.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn new_log() -> ImportLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &ImportLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Container wired to a recording sink.
pub fn recording_container() -> (StateContainer, RecordingSink) {
    let sink = RecordingSink::new();
    let state = StateContainer::with_sink(StateConfig::default(), Arc::new(sink.clone()));
    (state, sink)
}

/// Container with "user" and "comment" (depends on "user") record stores.
pub fn user_comment_container() -> (StateContainer, RecordingSink) {
    let (mut state, sink) = recording_container();
    state
        .add_store(Box::new(RecordStore::new(ty("user"))))
        .unwrap();
    state
        .add_store(Box::new(
            RecordStore::new(ty("comment")).with_dependencies([ty("user")]),
        ))
        .unwrap();
    (state, sink)
}

pub fn user_event(kind: &str, id: u64, name: &str) -> Value {
    json!({"store": "user", "type": kind, "id": id, "name": name})
}
