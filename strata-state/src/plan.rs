//! Dependency-ordered import planning.
//!
//! Given the type names present in one snapshot and each registered store's
//! declared dependencies, [`ImportPlan::build`] produces the order in which
//! stores import their payloads: a depth-first post-order, so every present
//! dependency comes before the store that depends on it.
//!
//! Rules:
//! - A dependency missing from the snapshot is skipped silently.
//! - A present type with no registered store is reported in
//!   `missing_stores`; its dependencies are not followed.
//! - An edge back to a type that is still being visited is a cycle. It is
//!   recorded and not followed, so the type reached first in the cycle
//!   imports after the other members. Ordering inside a cycle is undefined.

use std::collections::{BTreeMap, BTreeSet};
use strata_types::ObjectType;

/// An edge `from -> to` that closed a dependency cycle during planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycle {
    pub from: ObjectType,
    pub to: ObjectType,
}

/// The result of planning one snapshot's import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Registered types to import, dependencies first.
    pub order: Vec<ObjectType>,
    /// Present types that have no registered store.
    pub missing_stores: Vec<ObjectType>,
    /// Back edges found while planning.
    pub cycles: Vec<DependencyCycle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

struct Planner<'a, F> {
    present: &'a BTreeSet<ObjectType>,
    dependencies_of: F,
    state: BTreeMap<ObjectType, VisitState>,
    plan: ImportPlan,
}

impl<F> Planner<'_, F>
where
    F: Fn(&ObjectType) -> Option<Vec<ObjectType>>,
{
    fn visit(&mut self, node: &ObjectType) {
        self.state.insert(node.clone(), VisitState::Visiting);

        let Some(dependencies) = (self.dependencies_of)(node) else {
            self.plan.missing_stores.push(node.clone());
            self.state.insert(node.clone(), VisitState::Visited);
            return;
        };

        for dependency in dependencies {
            match self.state.get(&dependency).copied() {
                Some(VisitState::Visiting) => {
                    self.plan.cycles.push(DependencyCycle {
                        from: node.clone(),
                        to: dependency,
                    });
                }
                Some(VisitState::Visited) => {}
                None if self.present.contains(&dependency) => self.visit(&dependency),
                None => {}
            }
        }

        self.plan.order.push(node.clone());
        self.state.insert(node.clone(), VisitState::Visited);
    }
}

impl ImportPlan {
    /// Plans the import of `present` types.
    ///
    /// `dependencies_of` returns a registered store's dependencies, or `None`
    /// if no store is registered for the type. Roots are visited in the
    /// order of `present` after deduplication by normalized key.
    pub fn build<F>(present: impl IntoIterator<Item = ObjectType>, dependencies_of: F) -> Self
    where
        F: Fn(&ObjectType) -> Option<Vec<ObjectType>>,
    {
        let mut roots = Vec::new();
        let mut seen = BTreeSet::new();
        for object_type in present {
            if seen.insert(object_type.clone()) {
                roots.push(object_type);
            }
        }

        let mut planner = Planner {
            present: &seen,
            dependencies_of,
            state: BTreeMap::new(),
            plan: ImportPlan::default(),
        };
        for root in &roots {
            if !planner.state.contains_key(root) {
                planner.visit(root);
            }
        }
        planner.plan
    }

    /// Position of `object_type` in the import order.
    pub fn position(&self, object_type: &ObjectType) -> Option<usize> {
        self.order.iter().position(|t| t == object_type)
    }
}
