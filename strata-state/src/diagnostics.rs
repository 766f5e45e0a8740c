//! Non-fatal anomalies reported by the container.
//!
//! The container never fails a batch for a routing miss or a rejected
//! payload. It hands a [`Diagnostic`] to its [`DiagnosticSink`] instead, so
//! embedders can route anomalies into their own observability stack.

use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

/// Something the container absorbed instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An event named a store that is not registered. The event was dropped.
    MissingStoreForEvent { object_type: String, event: Value },
    /// `get` named a store that is not registered.
    MissingStoreForGet { object_type: String },
    /// A snapshot carried data for a store that is not registered.
    MissingStoreForImport { object_type: String },
    /// Import found `from` depending on `to` while `to` was still pending.
    DependencyCycle { from: String, to: String },
    /// A store returned an error while applying an event.
    EventRejected { object_type: String, reason: String },
    /// A store returned an error while importing its payload.
    ImportRejected { object_type: String, reason: String },
}

impl Diagnostic {
    /// The store type the diagnostic is about.
    pub fn object_type(&self) -> &str {
        match self {
            Self::MissingStoreForEvent { object_type, .. }
            | Self::MissingStoreForGet { object_type }
            | Self::MissingStoreForImport { object_type }
            | Self::EventRejected { object_type, .. }
            | Self::ImportRejected { object_type, .. } => object_type,
            Self::DependencyCycle { from, .. } => from,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStoreForEvent { object_type, event } => {
                write!(f, "missing store '{object_type}' for event {event}")
            }
            Self::MissingStoreForGet { object_type } => {
                write!(f, "can't find store '{object_type}'")
            }
            Self::MissingStoreForImport { object_type } => {
                write!(f, "failed to import state, can't find store '{object_type}'")
            }
            Self::DependencyCycle { from, to } => {
                write!(f, "dependency cycle: '{from}' depends on '{to}' which is still importing")
            }
            Self::EventRejected { object_type, reason } => {
                write!(f, "store '{object_type}' rejected event: {reason}")
            }
            Self::ImportRejected { object_type, reason } => {
                write!(f, "store '{object_type}' rejected state: {reason}")
            }
        }
    }
}

/// Receives diagnostics from a container.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per anomaly. `source` is the container's configured name.
    fn report(&self, source: &str, diagnostic: &Diagnostic);
}

/// Default sink: emits each diagnostic as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, source: &str, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::DependencyCycle { .. } => {
                warn!(state = source, object_type = diagnostic.object_type(), "{diagnostic}");
            }
            _ => {
                error!(state = source, object_type = diagnostic.object_type(), "{diagnostic}");
            }
        }
    }
}

/// Sink that keeps every diagnostic in memory.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// the other to the container.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drains the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(
            &mut *self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, source: &str, diagnostic: &Diagnostic) {
        TracingSink.report(source, diagnostic);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic.clone());
    }
}
