// Copyright 2025 Cowboy AI, LLC.

//! Trait dependency graph
//!
//! Nodes are traits keyed by name, edges run from a trait to the traits it
//! declares in `depends_on`. The graph rejects unresolved and circular
//! dependencies and produces a deterministic topological order: whenever
//! more than one trait is ready, the one registered first goes first.

use std::collections::{BTreeSet, HashSet};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::TraitDefinition;
use crate::errors::{ComposeResult, CompositionError, DependencyError};

/// A registered trait and its outgoing dependency edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitNode {
    /// Trait name
    pub id: String,
    /// Declared dependency names, first declaration order
    pub dependencies: IndexSet<String>,
}

/// Outcome of [`DependencyGraph::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphValidation {
    /// True when no errors were found
    pub success: bool,
    /// Missing and circular dependencies, missing ones first
    pub errors: Vec<DependencyError>,
}

impl GraphValidation {
    /// Turn a failed validation into a composition error
    pub fn into_result(self) -> ComposeResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(CompositionError::DependencyError {
                errors: self.errors,
            })
        }
    }
}

/// Dependency graph over the traits of one composition
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, TraitNode>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from traits in input order
    pub fn from_traits<'a, I>(traits: I) -> Self
    where
        I: IntoIterator<Item = &'a TraitDefinition>,
    {
        let mut graph = Self::new();
        for definition in traits {
            graph.add_trait(definition);
        }
        graph
    }

    /// Register a trait.
    ///
    /// Registering the same name again keeps its original position and adds
    /// any new dependency edges.
    pub fn add_trait(&mut self, definition: &TraitDefinition) {
        let node = self
            .nodes
            .entry(definition.name.clone())
            .or_insert_with(|| TraitNode {
                id: definition.name.clone(),
                dependencies: IndexSet::new(),
            });
        node.dependencies
            .extend(definition.depends_on.iter().cloned());

        debug!(
            trait_id = %definition.name,
            dependencies = ?definition.depends_on,
            "Registered trait in dependency graph"
        );
    }

    /// Number of registered traits
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no trait is registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a trait name is registered
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a registered trait
    pub fn node(&self, id: &str) -> Option<&TraitNode> {
        self.nodes.get(id)
    }

    /// Registered trait names in insertion order
    pub fn trait_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Check every edge resolves and no dependency chain loops.
    ///
    /// A trait depending on itself is a one-node cycle, never a missing
    /// dependency.
    pub fn validate(&self) -> GraphValidation {
        let mut errors = Vec::new();

        for node in self.nodes.values() {
            for dep in &node.dependencies {
                if !self.nodes.contains_key(dep) {
                    errors.push(DependencyError::missing(&node.id, dep));
                }
            }
        }

        errors.extend(self.find_cycles().into_iter().map(DependencyError::circular));

        GraphValidation {
            success: errors.is_empty(),
            errors,
        }
    }

    /// Trait names ordered so every trait follows its dependencies.
    ///
    /// Ties are broken by registration order, so traits without
    /// inter-dependencies keep their input order.
    pub fn topological_order(&self) -> ComposeResult<Vec<String>> {
        self.validate().into_result()?;

        let index_of = |id: &str| self.nodes.get_index_of(id);

        // dependency index -> dependent indices
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut in_degree: Vec<usize> = vec![0; self.nodes.len()];

        for (idx, node) in self.nodes.values().enumerate() {
            for dep in &node.dependencies {
                if let Some(dep_idx) = index_of(dep) {
                    dependents[dep_idx].push(idx);
                    in_degree[idx] += 1;
                }
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(idx, _)| idx)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(idx) = ready.pop_first() {
            if let Some((id, _)) = self.nodes.get_index(idx) {
                order.push(id.clone());
            }
            for &dependent in &dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        debug_assert_eq!(order.len(), self.nodes.len());

        debug!(order = ?order, "Computed trait order");
        Ok(order)
    }

    fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut visiting = HashSet::new();
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        let mut cycles = Vec::new();

        for id in self.nodes.keys() {
            if !visited.contains(id.as_str()) {
                self.visit(id, &mut visiting, &mut visited, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn visit<'a>(
        &'a self,
        id: &'a str,
        visiting: &mut HashSet<&'a str>,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visiting.insert(id);
        path.push(id);

        if let Some(node) = self.nodes.get(id) {
            for dep in &node.dependencies {
                let dep = dep.as_str();
                if !self.nodes.contains_key(dep) {
                    continue;
                }

                if visiting.contains(dep) {
                    let start = path.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(dep.to_string());
                    cycles.push(cycle);
                } else if !visited.contains(dep) {
                    self.visit(dep, visiting, visited, path, cycles);
                }
            }
        }

        path.pop();
        visiting.remove(id);
        visited.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DependencyErrorKind;

    fn t(name: &str, deps: &[&str]) -> TraitDefinition {
        deps.iter()
            .fold(TraitDefinition::new(name, "1.0.0"), |def, dep| def.depends_on(*dep))
    }

    #[test]
    fn independent_traits_keep_input_order() {
        let traits = vec![t("Stateful", &[]), t("Colorized", &[]), t("Billable", &[])];
        let graph = DependencyGraph::from_traits(&traits);

        assert!(graph.validate().success);
        assert_eq!(
            graph.topological_order().unwrap(),
            vec!["Stateful", "Colorized", "Billable"]
        );
    }

    #[test]
    fn dependencies_come_first() {
        let traits = vec![
            t("Billable", &["Addressable"]),
            t("Colorized", &["Stateful"]),
            t("Stateful", &[]),
            t("Addressable", &[]),
        ];
        let graph = DependencyGraph::from_traits(&traits);

        assert_eq!(
            graph.topological_order().unwrap(),
            vec!["Stateful", "Colorized", "Addressable", "Billable"]
        );
    }

    #[test]
    fn missing_dependency_is_reported() {
        let traits = vec![t("Billable", &["Addressable"])];
        let result = DependencyGraph::from_traits(&traits).validate();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, DependencyErrorKind::MissingDependency);
        assert_eq!(result.errors[0].dependency.as_deref(), Some("Addressable"));
    }

    #[test]
    fn two_node_cycle_names_both() {
        let traits = vec![t("A", &["B"]), t("B", &["A"])];
        let graph = DependencyGraph::from_traits(&traits);
        let result = graph.validate();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.kind, DependencyErrorKind::CircularDependency);
        assert_eq!(err.cycle, vec!["A", "B", "A"]);
        assert!(err.message.contains("A -> B -> A"));

        assert!(graph.topological_order().is_err());
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let traits = vec![t("Loop", &["Loop"])];
        let result = DependencyGraph::from_traits(&traits).validate();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, DependencyErrorKind::CircularDependency);
        assert_eq!(result.errors[0].cycle, vec!["Loop", "Loop"]);
    }

    #[test]
    fn longer_cycle_lists_full_chain() {
        let traits = vec![t("A", &["B"]), t("B", &["C"]), t("C", &["A"]), t("D", &[])];
        let result = DependencyGraph::from_traits(&traits).validate();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].cycle, vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn re_registration_accumulates_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_trait(&t("Billable", &["Addressable"]));
        graph.add_trait(&t("Addressable", &[]));
        graph.add_trait(&t("Billable", &["Stateful"]));
        graph.add_trait(&t("Stateful", &[]));

        assert_eq!(graph.len(), 3);
        let deps: Vec<_> = graph
            .node("Billable")
            .unwrap()
            .dependencies
            .iter()
            .cloned()
            .collect();
        assert_eq!(deps, vec!["Addressable", "Stateful"]);
        assert_eq!(
            graph.topological_order().unwrap(),
            vec!["Addressable", "Stateful", "Billable"]
        );
    }

    #[test]
    fn ordering_rejects_cycles_through_validation() {
        let traits = vec![t("Root", &[]), t("A", &["Root", "B"]), t("B", &["A"])];
        let graph = DependencyGraph::from_traits(&traits);

        let err = graph.topological_order().unwrap_err();
        let expected = graph.validate().errors;
        assert_eq!(err.dependency_errors(), expected.as_slice());
        assert!(err.is_circular());
    }

    #[test]
    fn diamond_orders_every_trait_once() {
        let traits = vec![
            t("Top", &["Left", "Right"]),
            t("Left", &["Bottom"]),
            t("Right", &["Bottom"]),
            t("Bottom", &[]),
        ];
        let order = DependencyGraph::from_traits(&traits).topological_order().unwrap();
        assert_eq!(order, vec!["Bottom", "Left", "Right", "Top"]);
    }

    #[test]
    fn missing_and_circular_reported_together() {
        let traits = vec![t("A", &["B", "Ghost"]), t("B", &["A"])];
        let result = DependencyGraph::from_traits(&traits).validate();

        let kinds: Vec<_> = result.errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DependencyErrorKind::MissingDependency,
                DependencyErrorKind::CircularDependency
            ]
        );
    }
}
