// Copyright 2025 Cowboy AI, LLC.

//! # Trait compositor
//!
//! Orchestrates one composition:
//!
//! 1. build a fresh [`DependencyGraph`] from the traits
//! 2. validate it, failing before any merge work
//! 3. order the traits topologically
//! 4. seed each merge strategy with the base object's own artifacts
//! 5. fold the ordered trait layers through the five strategies
//! 6. assemble the [`ComposedObject`] with provenance and collisions
//!
//! Composition is a pure function of its inputs; nothing is shared between
//! calls, so independent compositions may run on different threads.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::composed::{ComposedObject, CompositionMetadata, PerformanceMetrics};
use crate::definition::{BaseObjectDefinition, TraitDefinition};
use crate::dependency_graph::DependencyGraph;
use crate::errors::ComposeResult;
use crate::merge::{self, ArtifactKind, Layer};
use crate::provenance::ProvenanceTracker;

/// Knobs for a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposeOptions {
    /// Record field provenance in the metadata
    pub track_provenance: bool,
    /// Record composition wall time in the metadata
    pub track_performance: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            track_provenance: true,
            track_performance: false,
        }
    }
}

impl ComposeOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch provenance tracking
    pub fn with_provenance(mut self, enabled: bool) -> Self {
        self.track_provenance = enabled;
        self
    }

    /// Switch performance tracking
    pub fn with_performance(mut self, enabled: bool) -> Self {
        self.track_performance = enabled;
        self
    }
}

/// Composes traits onto base objects
#[derive(Debug, Clone, Default)]
pub struct TraitCompositor {
    options: ComposeOptions,
}

impl TraitCompositor {
    /// Create a compositor with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compositor with explicit options
    pub fn with_options(options: ComposeOptions) -> Self {
        Self { options }
    }

    /// Options used for every composition
    pub fn options(&self) -> ComposeOptions {
        self.options
    }

    /// Compose `traits` onto `base`.
    ///
    /// Fails only when the dependency graph is invalid, in which case no
    /// merging is performed.
    pub fn compose(
        &self,
        traits: &[TraitDefinition],
        base: &BaseObjectDefinition,
    ) -> ComposeResult<ComposedObject> {
        compose(traits, base, self.options)
    }
}

/// Compose `traits` onto `base` with the given options
pub fn compose(
    traits: &[TraitDefinition],
    base: &BaseObjectDefinition,
    options: ComposeOptions,
) -> ComposeResult<ComposedObject> {
    let started = Instant::now();

    let graph = DependencyGraph::from_traits(traits);
    let validation = graph.validate();
    if !validation.success {
        warn!(
            object = %base.id,
            errors = validation.errors.len(),
            "Trait dependency graph rejected, composition aborted"
        );
        validation.into_result()?;
    }

    let order = graph.topological_order()?;
    let ordered: Vec<&TraitDefinition> = order
        .iter()
        .flat_map(|id| traits.iter().filter(move |t| &t.name == id))
        .collect();

    debug!(object = %base.id, order = ?order, "Composing traits");

    let schema = merge::merge_schema(
        Layer::new(&base.id, &base.schema),
        &layers(&ordered, |t| t.schema.as_ref()),
    );
    let semantics = merge::merge_semantics(
        Layer::new(&base.id, &base.semantics),
        &layers(&ordered, |t| t.semantics.as_ref()),
    );
    let tokens = merge::merge_tokens(
        Layer::new(&base.id, &base.tokens),
        &layers(&ordered, |t| t.tokens.as_ref()),
    );
    let view_extensions = merge::merge_view_extensions(
        Layer::new(&base.id, &base.view_extensions),
        &layers(&ordered, |t| t.view_extensions.as_ref()),
    );
    let actions = merge::merge_actions(
        Layer::new(&base.id, &base.actions),
        &layers(&ordered, |t| t.actions.as_ref()),
    );

    let provenance = options.track_provenance.then(|| {
        let mut tracker = ProvenanceTracker::new();
        tracker.record_all(base.schema.keys(), &base.id, ArtifactKind::Schema, 0);
        tracker.record_all(base.semantics.keys(), &base.id, ArtifactKind::Semantics, 0);
        for (idx, definition) in ordered.iter().enumerate() {
            let step = idx + 1;
            if let Some(fragment) = &definition.schema {
                tracker.record_all(fragment.keys(), &definition.name, ArtifactKind::Schema, step);
            }
            if let Some(fragment) = &definition.semantics {
                tracker.record_all(fragment.keys(), &definition.name, ArtifactKind::Semantics, step);
            }
        }
        tracker.finish()
    });

    let collisions: Vec<_> = schema
        .collisions
        .into_iter()
        .chain(semantics.collisions)
        .chain(tokens.collisions)
        .chain(view_extensions.collisions)
        .chain(actions.collisions)
        .collect();
    let warnings: Vec<_> = schema
        .warnings
        .into_iter()
        .chain(semantics.warnings)
        .chain(tokens.warnings)
        .chain(view_extensions.warnings)
        .chain(actions.warnings)
        .collect();

    let performance = options.track_performance.then(|| PerformanceMetrics {
        duration_ms: started.elapsed().as_secs_f64() * 1000.0,
    });

    let composed = ComposedObject {
        id: base.id.clone(),
        name: base.name.clone(),
        version: base.version.clone(),
        traits: order.clone(),
        schema: schema.result,
        semantics: semantics.result,
        tokens: tokens.result,
        view_extensions: view_extensions.result,
        actions: actions.result,
        metadata: CompositionMetadata {
            provenance,
            collisions,
            warnings,
            trait_count: ordered.len(),
            trait_order: order,
            action_owners: actions.owners,
            performance,
        },
    };

    info!(
        object = %composed.id,
        traits = composed.metadata.trait_count,
        fields = composed.schema.len(),
        collisions = composed.metadata.collisions.len(),
        "Composed object"
    );

    Ok(composed)
}

fn layers<'a, T, F>(ordered: &[&'a TraitDefinition], fragment: F) -> Vec<Layer<'a, T>>
where
    F: Fn(&'a TraitDefinition) -> Option<&'a T>,
{
    ordered
        .iter()
        .filter_map(|&definition| fragment(definition).map(|f| Layer::new(&definition.name, f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{FieldSpec, SemanticMapping, StateMachineSpec, ViewExtension};
    use crate::merge::Resolution;
    use serde_json::json;

    fn base() -> BaseObjectDefinition {
        BaseObjectDefinition::new("object:User", "User", "1.0.0")
            .with_field("id", FieldSpec::new("uuid").required())
    }

    fn stateful() -> TraitDefinition {
        TraitDefinition::new("Stateful", "1.0.0").with_field(
            "status",
            FieldSpec::new("enum").with_state_machine(
                StateMachineSpec::new(["draft", "active"]).with_initial_state("draft"),
            ),
        )
    }

    fn colorized() -> TraitDefinition {
        TraitDefinition::new("Colorized", "1.0.0")
            .with_token("color.neutral", json!("#888888"))
            .with_semantic(
                "status",
                SemanticMapping::new("lifecycle.status").with_token("color.neutral"),
            )
    }

    #[test]
    fn composes_in_input_order_without_dependencies() {
        let composed = compose(&[stateful(), colorized()], &base(), ComposeOptions::default())
            .unwrap();

        assert_eq!(composed.id, "object:User");
        assert_eq!(composed.traits, vec!["Stateful", "Colorized"]);
        assert_eq!(composed.metadata.trait_order, vec!["Stateful", "Colorized"]);
        assert_eq!(composed.metadata.trait_count, 2);
        let fields: Vec<_> = composed.schema.keys().cloned().collect();
        assert_eq!(fields, vec!["id", "status"]);
        assert!(composed.metadata.collisions.is_empty());
        assert!(composed.metadata.performance.is_none());
    }

    #[test]
    fn dependencies_reorder_traits() {
        let dependent = TraitDefinition::new("Colorized", "1.0.0").depends_on("Stateful");
        let composed = compose(&[dependent, stateful()], &base(), ComposeOptions::default())
            .unwrap();
        assert_eq!(composed.traits, vec!["Stateful", "Colorized"]);
    }

    #[test]
    fn provenance_tracks_base_and_traits() {
        let composed = compose(&[stateful(), colorized()], &base(), ComposeOptions::default())
            .unwrap();
        let provenance = composed.metadata.provenance.as_ref().unwrap();

        assert_eq!(provenance["id"].source, "object:User");
        assert_eq!(provenance["id"].history[0].step, 0);
        assert_eq!(provenance["status"].source, "Stateful");
        assert_eq!(provenance["status"].contributors(), vec!["Stateful", "Colorized"]);
    }

    #[test]
    fn provenance_can_be_switched_off() {
        let options = ComposeOptions::default()
            .with_provenance(false)
            .with_performance(true);
        let composed = compose(&[stateful()], &base(), options).unwrap();

        assert!(composed.metadata.provenance.is_none());
        assert!(composed.metadata.performance.unwrap().duration_ms >= 0.0);
    }

    #[test]
    fn cycle_aborts_before_merging() {
        let a = TraitDefinition::new("A", "1.0.0").depends_on("B");
        let b = TraitDefinition::new("B", "1.0.0").depends_on("A");

        let err = compose(&[a, b], &base(), ComposeOptions::default()).unwrap_err();
        assert_eq!(err.error_type(), "dependency_error");
        assert!(err.is_circular());
    }

    #[test]
    fn base_is_not_a_dependency_target() {
        let dependent = TraitDefinition::new("Billable", "1.0.0").depends_on("object:User");
        let err = compose(&[dependent], &base(), ComposeOptions::default()).unwrap_err();
        assert!(err.is_missing_dependency());
    }

    #[test]
    fn collisions_from_all_strategies_are_collected() {
        let a = TraitDefinition::new("A", "1.0.0")
            .with_field("x", FieldSpec::new("string"))
            .with_extension("main", ViewExtension::new("x-view", "X"));
        let b = TraitDefinition::new("B", "1.0.0")
            .with_field("x", FieldSpec::new("number").overriding());

        let composed = compose(&[a, b], &base(), ComposeOptions::default()).unwrap();
        assert_eq!(composed.schema["x"].field_type, "number");
        assert_eq!(composed.metadata.collisions.len(), 1);
        assert_eq!(composed.metadata.collisions[0].resolution, Resolution::Manual);
    }

    #[test]
    fn compositor_uses_its_options() {
        let compositor =
            TraitCompositor::with_options(ComposeOptions::default().with_provenance(false));
        let composed = compositor.compose(&[stateful()], &base()).unwrap();
        assert!(composed.metadata.provenance.is_none());
        assert!(!compositor.options().track_provenance);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ComposeOptions =
            serde_json::from_value(json!({ "trackPerformance": true })).unwrap();
        assert!(options.track_provenance);
        assert!(options.track_performance);
    }
}
