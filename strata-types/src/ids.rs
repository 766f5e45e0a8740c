//! Identifier types used throughout strata.
//!
//! Entity type names are case-insensitive: they are compared, hashed and
//! ordered by their lowercase key, while the spelling a store declared is
//! kept for serialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::Error;

/// Name of an entity category (e.g. "user", "comment").
#[derive(Debug, Clone)]
pub struct ObjectType {
    key: String,
    declared: String,
}

impl ObjectType {
    /// Creates an object type, normalizing the lookup key to lowercase.
    ///
    /// Only the empty string is rejected. Whitespace is part of the name, so
    /// `" "` is a valid (if unlikely) type that no store will normally own.
    pub fn new(name: impl Into<String>) -> crate::Result<Self> {
        let declared = name.into();
        if declared.is_empty() {
            return Err(Error::EmptyObjectType);
        }
        Ok(Self {
            key: declared.to_lowercase(),
            declared,
        })
    }

    /// Returns the normalized (lowercase) registry key.
    #[must_use]
    pub fn as_key(&self) -> &str {
        &self.key
    }

    /// Returns the name exactly as it was declared.
    #[must_use]
    pub fn declared(&self) -> &str {
        &self.declared
    }

    /// Returns true if `name` normalizes to this type.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.key == name.to_lowercase()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ObjectType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

// Hash/Eq/Ord all use `key`, so map lookups by `&str` key are consistent.
impl Borrow<str> for ObjectType {
    fn borrow(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.declared)
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ObjectType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.declared)
    }
}

impl<'de> Deserialize<'de> for ObjectType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::new(name).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a record inside one store.
///
/// JSON numbers and strings map onto the same id space, so `5` and `"5"`
/// address the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads an ID from a JSON string or number. Other shapes yield `None`.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            serde_json::Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}
