//! The state container: store registry, event routing, snapshot import/export.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use strata_model::{Dispatcher, EntityStore, ListenerId};
use strata_types::{Event, EventInput, ObjectType};
use tracing::{debug, warn};

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::plan::ImportPlan;
use crate::{StateConfig, StateError, StateResult};

/// What happened to one event passed to [`StateContainer::apply_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The owning store applied the event.
    Applied {
        object_type: ObjectType,
        modified: bool,
    },
    /// The event carried a state snapshot but no resolvable store.
    ImportedOnly,
    /// The event named no store and carried no state.
    Ignored,
    /// The named store is not registered; the event was dropped.
    MissingStore { object_type: ObjectType },
    /// The owning store returned an error.
    Rejected { object_type: ObjectType },
}

/// Owns one [`EntityStore`] per entity type.
///
/// Create one per session and hand it to whatever produces events or
/// consumes snapshots. Stores are registered up front and never removed.
///
/// The container publishes `import` after each snapshot, with the imported
/// type names in dependency order, and `clear` after [`clear`](Self::clear).
/// Per-record changes are published by the stores themselves; reach them
/// through [`get_store_mut`](Self::get_store_mut) and
/// [`EntityStore::listeners_mut`].
pub struct StateContainer {
    config: StateConfig,
    stores: BTreeMap<ObjectType, Box<dyn EntityStore>>,
    sink: Arc<dyn DiagnosticSink>,
    listeners: Dispatcher,
}

impl StateContainer {
    /// Creates an empty container that reports through `tracing`.
    pub fn new(config: StateConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Creates an empty container that reports to `sink`.
    pub fn with_sink(config: StateConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            config,
            stores: BTreeMap::new(),
            sink,
            listeners: Dispatcher::new(),
        }
    }

    /// The container's configuration.
    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// True if no store is registered.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Registered types, in key order.
    pub fn object_types(&self) -> impl Iterator<Item = &ObjectType> {
        self.stores.keys()
    }

    /// Container-level listeners.
    pub fn listeners_mut(&mut self) -> &mut Dispatcher {
        &mut self.listeners
    }

    /// Subscribes to a container notification (`import`, `clear`, or `*`).
    pub fn add_listener<F>(&mut self, name: &str, listener: F) -> ListenerId
    where
        F: FnMut(&str, &Value) + Send + 'static,
    {
        self.listeners.add_listener(name, listener)
    }

    fn report(&self, diagnostic: Diagnostic) {
        self.sink.report(&self.config.name, &diagnostic);
    }

    // ── Registry ─────────────────────────────────────────────────────

    /// Registers a store under the lowercase form of its object type.
    ///
    /// Fails with [`StateError::DuplicateStore`] if another store already
    /// owns that type in any casing.
    pub fn add_store(&mut self, store: Box<dyn EntityStore>) -> StateResult<()> {
        let object_type = store.object_type().clone();
        if self.stores.contains_key(&object_type) {
            return Err(StateError::DuplicateStore {
                object_type: object_type.declared().to_string(),
            });
        }
        debug!(
            state = %self.config.name,
            object_type = %object_type,
            dependencies = ?store.dependencies(),
            "Registered store"
        );
        self.stores.insert(object_type, store);
        Ok(())
    }

    /// Case-insensitive store lookup.
    pub fn get_store(&self, object_type: &str) -> Option<&dyn EntityStore> {
        self.stores
            .get(object_type.to_lowercase().as_str())
            .map(|store| &**store)
    }

    /// Case-insensitive mutable store lookup.
    pub fn get_store_mut(
        &mut self,
        object_type: &str,
    ) -> Option<&mut (dyn EntityStore + 'static)> {
        self.stores
            .get_mut(object_type.to_lowercase().as_str())
            .map(|store| &mut **store)
    }

    /// Looks up a store and downcasts it to its concrete type.
    pub fn store_as<T: EntityStore + 'static>(&self, object_type: &str) -> Option<&T> {
        self.get_store(object_type)?.as_any().downcast_ref::<T>()
    }

    /// Mutable variant of [`store_as`](Self::store_as).
    pub fn store_as_mut<T: EntityStore + 'static>(
        &mut self,
        object_type: &str,
    ) -> Option<&mut T> {
        self.get_store_mut(object_type)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// The store an event is addressed to, if it is registered.
    pub fn get_store_for_event(&self, event: &Event) -> Option<&dyn EntityStore> {
        let target = event.target()?;
        self.stores.get(target).map(|store| &**store)
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Applies raw JSON input: `null` is ignored, an object is one event,
    /// an array is applied element by element, strictly in order.
    pub fn apply_value(&mut self, input: Value) -> Vec<ApplyOutcome> {
        match EventInput::classify(input) {
            EventInput::Nothing => Vec::new(),
            EventInput::Single(event) => vec![self.apply_event(&event)],
            EventInput::Sequence(items) => {
                let mut outcomes = Vec::with_capacity(items.len());
                for item in items {
                    outcomes.extend(self.apply_value(item));
                }
                outcomes
            }
        }
    }

    /// Applies already-normalized events in order.
    pub fn apply_events(
        &mut self,
        events: impl IntoIterator<Item = Event>,
    ) -> Vec<ApplyOutcome> {
        events
            .into_iter()
            .map(|event| self.apply_event(&event))
            .collect()
    }

    /// Applies one event.
    ///
    /// An embedded `state` snapshot is imported first. The event is then
    /// handed to its owning store, if it names one. Events that carried
    /// state are allowed to resolve to no store without a diagnostic.
    pub fn apply_event(&mut self, event: &Event) -> ApplyOutcome {
        let carried_state = match event.embedded_state() {
            Some(state) => {
                self.import_state(state.clone());
                true
            }
            None => false,
        };

        let Some(target) = event.target() else {
            return if carried_state {
                ApplyOutcome::ImportedOnly
            } else {
                ApplyOutcome::Ignored
            };
        };

        let result = match self.stores.get_mut(target) {
            Some(store) => store.apply_event(event),
            None if carried_state => return ApplyOutcome::ImportedOnly,
            None => {
                self.report(Diagnostic::MissingStoreForEvent {
                    object_type: target.declared().to_string(),
                    event: event.payload().clone(),
                });
                return ApplyOutcome::MissingStore {
                    object_type: target.clone(),
                };
            }
        };

        match result {
            Ok(modified) => ApplyOutcome::Applied {
                object_type: target.clone(),
                modified,
            },
            Err(err) => {
                self.report(Diagnostic::EventRejected {
                    object_type: target.declared().to_string(),
                    reason: err.to_string(),
                });
                ApplyOutcome::Rejected {
                    object_type: target.clone(),
                }
            }
        }
    }

    /// Passes `args` to the named store's `get`.
    /// Reports and returns `None` if the store is not registered.
    pub fn get(&self, object_type: &str, args: &[Value]) -> Option<Value> {
        match self.get_store(object_type) {
            Some(store) => store.get(args),
            None => {
                self.report(Diagnostic::MissingStoreForGet {
                    object_type: object_type.to_string(),
                });
                None
            }
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// Imports a snapshot, or an array of snapshots one after another.
    ///
    /// Within one snapshot, every present dependency of a store is imported
    /// before that store. `null` and scalars are ignored.
    pub fn import_state(&mut self, state: Value) {
        match state {
            Value::Array(snapshots) => {
                for snapshot in snapshots {
                    self.import_state(snapshot);
                }
            }
            Value::Object(snapshot) => self.import_snapshot(snapshot),
            _ => {}
        }
    }

    fn import_snapshot(&mut self, snapshot: Map<String, Value>) {
        // Keys that normalize equal: the later one in iteration order wins.
        let mut working: BTreeMap<ObjectType, Value> = BTreeMap::new();
        for (name, payload) in snapshot {
            let Ok(object_type) = ObjectType::new(name.as_str()) else {
                warn!(
                    state = %self.config.name,
                    "Skipping snapshot entry with an empty type name"
                );
                continue;
            };
            working.remove(&object_type);
            if !payload.is_null() {
                working.insert(object_type, payload);
            }
        }

        let plan = ImportPlan::build(working.keys().cloned(), |object_type| {
            self.stores
                .get(object_type)
                .map(|store| store.dependencies())
        });
        debug!(state = %self.config.name, order = ?plan.order, "Importing state");

        for object_type in &plan.missing_stores {
            self.report(Diagnostic::MissingStoreForImport {
                object_type: object_type.declared().to_string(),
            });
        }
        if self.config.report_cycles {
            for cycle in &plan.cycles {
                self.report(Diagnostic::DependencyCycle {
                    from: cycle.from.declared().to_string(),
                    to: cycle.to.declared().to_string(),
                });
            }
        }

        let mut imported = Vec::with_capacity(plan.order.len());
        for object_type in plan.order {
            let (Some(payload), Some(store)) =
                (working.remove(&object_type), self.stores.get_mut(&object_type))
            else {
                continue;
            };
            match store.import_state(payload) {
                Ok(()) => imported.push(Value::String(object_type.declared().to_string())),
                Err(err) => self.report(Diagnostic::ImportRejected {
                    object_type: object_type.declared().to_string(),
                    reason: err.to_string(),
                }),
            }
        }
        self.listeners.dispatch("import", &Value::Array(imported));
    }

    /// Empties every store that supports clearing. Registrations are kept.
    pub fn clear(&mut self) {
        for (object_type, store) in &mut self.stores {
            if !store.clear() {
                debug!(state = %self.config.name, %object_type, "Store does not support clear");
            }
        }
        self.listeners.dispatch("clear", &Value::Null);
    }

    /// Exports every store under its declared type name.
    pub fn to_json(&self) -> Value {
        let state: Map<String, Value> = self
            .stores
            .values()
            .map(|store| (store.object_type().declared().to_string(), store.to_json()))
            .collect();
        Value::Object(state)
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new(StateConfig::default())
    }
}

impl Serialize for StateContainer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContainer")
            .field("name", &self.config.name)
            .field("stores", &self.stores.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners)
            .finish()
    }
}
