use serde::{Deserialize, Serialize};

/// Configuration for a state container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Label attached to every diagnostic this container emits.
    pub name: String,
    /// Report dependency cycles found during import.
    pub report_cycles: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            name: "GlobalState".to_string(),
            report_cycles: true,
        }
    }
}
