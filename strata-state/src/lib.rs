//! Multi-store state container for strata.
//!
//! A [`StateContainer`] owns one [`EntityStore`](strata_model::EntityStore)
//! per entity type and provides:
//! - Routing of mutation events to the owning store
//! - Dependency-ordered bulk import of state snapshots
//! - Export of every store back into a single snapshot
//!
//! # Import ordering
//!
//! Stores declare the types they depend on. When a snapshot is imported,
//! every dependency present in that snapshot is imported before the store
//! that depends on it. Independent types are imported in key order, which
//! callers must not rely on. Cycles are broken at the first revisited type
//! and reported through the [`DiagnosticSink`]; ordering inside a cycle is
//! not guaranteed.
//!
//! # Failure policy
//!
//! Only duplicate registration is returned as an error. Routing misses,
//! unknown snapshot types and store-level rejections are reported to the
//! sink and the rest of the batch carries on.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use strata_model::RecordStore;
//! use strata_state::{StateConfig, StateContainer};
//! use strata_types::ObjectType;
//!
//! let user = ObjectType::new("user").unwrap();
//! let comment = ObjectType::new("comment").unwrap();
//!
//! let mut state = StateContainer::new(StateConfig::default());
//! state.add_store(Box::new(RecordStore::new(user.clone()))).unwrap();
//! state
//!     .add_store(Box::new(RecordStore::new(comment).with_dependencies([user])))
//!     .unwrap();
//!
//! state.import_state(json!({
//!     "comment": {"1": {"id": 1, "userId": 5}},
//!     "user": {"5": {"id": 5, "name": "A"}},
//! }));
//! assert_eq!(state.get("User", &[json!(5)]), Some(json!({"id": 5, "name": "A"})));
//! ```

mod config;
mod container;
mod diagnostics;
mod error;
pub mod plan;

pub use config::StateConfig;
pub use container::{ApplyOutcome, StateContainer};
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use error::{StateError, StateResult};
pub use plan::{DependencyCycle, ImportPlan};
