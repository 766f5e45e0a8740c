use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_types::RecordId;

/// One domain object held by a [`RecordStore`](crate::RecordStore).
///
/// `data` is application-defined JSON and always carries the record's `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub object_type: String,
    pub data: Value,
}

impl Record {
    /// The value at a JSON pointer into `data`, e.g. `"/author/name"`.
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.data.pointer(pointer)
    }

    /// String field at `pointer`.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.field(pointer)?.as_str()
    }

    /// Numeric field at `pointer`, widened to `f64`.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.field(pointer)?.as_f64()
    }
}
