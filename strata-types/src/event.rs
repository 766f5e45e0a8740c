//! Event envelope and boundary classification.
//!
//! Incoming events are heterogeneous JSON records. Before routing, each one
//! is normalized into an [`Event`]: an optional target store, an optional
//! embedded state snapshot, and the untouched payload. The store that owns
//! the event interprets the payload; nothing here assumes its shape beyond
//! the routing fields.

use crate::{ObjectType, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload keys consumed by routing rather than by the owning store.
pub const RESERVED_KEYS: [&str; 4] = ["objectType", "store", "type", "state"];

/// A normalized mutation event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    target: Option<ObjectType>,
    embedded_state: Option<Value>,
    payload: Value,
}

impl Event {
    /// Normalizes a raw JSON event.
    ///
    /// The target comes from `objectType`, falling back to `store`; empty or
    /// non-string values count as absent. `state` is kept only when it is an
    /// object or an array of snapshots.
    #[must_use]
    pub fn from_value(payload: Value) -> Self {
        let target = ["objectType", "store"]
            .iter()
            .find_map(|key| {
                payload
                    .get(*key)
                    .and_then(Value::as_str)
                    .and_then(|name| ObjectType::new(name).ok())
            });

        let embedded_state = payload
            .get("state")
            .filter(|state| state.is_object() || state.is_array())
            .cloned();

        Self {
            target,
            embedded_state,
            payload,
        }
    }

    /// Parses and normalizes an event from JSON text.
    pub fn parse(json: &str) -> crate::Result<Self> {
        Ok(Self::from_value(serde_json::from_str(json)?))
    }

    /// Builds an event addressed to `object_type`.
    ///
    /// `payload` should be a JSON object; its `objectType` field is
    /// overwritten with the target name.
    #[must_use]
    pub fn for_store(object_type: &ObjectType, payload: Value) -> Self {
        let mut fields = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.insert(
            "objectType".to_string(),
            Value::String(object_type.declared().to_string()),
        );
        Self::from_value(Value::Object(fields))
    }

    /// The store this event is addressed to, if any.
    #[must_use]
    pub fn target(&self) -> Option<&ObjectType> {
        self.target.as_ref()
    }

    /// A snapshot to import before the event is routed.
    #[must_use]
    pub fn embedded_state(&self) -> Option<&Value> {
        self.embedded_state.as_ref()
    }

    /// The full raw event.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Consumes the event and returns the raw payload.
    #[must_use]
    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// The event's `type` discriminator (e.g. "create", "update").
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.payload.get("type").and_then(Value::as_str)
    }

    /// The record this event is about: `id`, or `data.id` when absent.
    #[must_use]
    pub fn record_id(&self) -> Option<RecordId> {
        self.payload
            .get("id")
            .and_then(RecordId::from_value)
            .or_else(|| {
                self.payload
                    .pointer("/data/id")
                    .and_then(RecordId::from_value)
            })
    }

    /// Reads a top-level payload field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// True if the event neither names a store nor carries state.
    #[must_use]
    pub fn is_unroutable(&self) -> bool {
        self.target.is_none() && self.embedded_state.is_none()
    }
}

impl From<Value> for Event {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl Serialize for Event {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Classification of raw input handed to the event entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum EventInput {
    /// `null` or a JSON scalar; nothing to apply.
    Nothing,
    /// A single event object.
    Single(Event),
    /// An ordered batch, applied strictly in sequence.
    Sequence(Vec<Value>),
}

impl EventInput {
    /// Classifies a raw JSON value.
    #[must_use]
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(_) => Self::Single(Event::from_value(value)),
            Value::Array(items) => Self::Sequence(items),
            _ => Self::Nothing,
        }
    }
}

impl From<Value> for EventInput {
    fn from(value: Value) -> Self {
        Self::classify(value)
    }
}
