//! # CIM Trait Compositor
//!
//! Composes reusable traits onto a base design object and checks the result.
//!
//! A trait is a named, versioned bundle of optional contributions: schema
//! fields, semantic mappings, design tokens, view extensions and actions.
//! Traits may depend on one another. Composition happens in four stages:
//!
//! 1. **Dependency graph**: traits are registered, missing dependencies and
//!    cycles are rejected, and a deterministic topological order is derived
//! 2. **Merge strategies**: one left fold per artifact kind, seeded by the
//!    base object, applied in that order
//! 3. **Compositor**: assembles the [`ComposedObject`] with provenance,
//!    collisions and ordering metadata
//! 4. **Validation**: six independent rules inspect the composed object and
//!    report structured [`ValidationIssue`]s
//!
//! ```
//! use cim_trait_compositor::{
//!     validate_composition, BaseObjectDefinition, FieldSpec, StateMachineSpec,
//!     TraitCompositor, TraitDefinition,
//! };
//!
//! let base = BaseObjectDefinition::new("object:User", "User", "1.0.0");
//! let stateful = TraitDefinition::new("Stateful", "1.0.0").with_field(
//!     "status",
//!     FieldSpec::new("enum").with_state_machine(
//!         StateMachineSpec::new(["draft", "active"]).with_initial_state("draft"),
//!     ),
//! );
//!
//! let composed = TraitCompositor::new().compose(&[stateful], &base)?;
//! assert_eq!(composed.metadata.trait_order, vec!["Stateful"]);
//! assert!(validate_composition(&composed).valid);
//! # Ok::<(), cim_trait_compositor::CompositionError>(())
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure**: composing and validating perform no I/O and share no state
//! 2. **Deterministic**: identical inputs give identical output, in order
//! 3. **Fail fast on structure**: dependency problems stop composition
//! 4. **Report everything else**: validation never stops at the first issue

#![warn(missing_docs)]

mod cache;
mod composed;
mod compositor;
mod definition;
mod dependency_graph;
mod errors;
pub mod merge;
mod provenance;
mod schema_export;
pub mod validation;

pub use cache::{CacheConfig, CacheStats, CompositionCache};
pub use composed::{ComposedObject, CompositionMetadata, PerformanceMetrics};
pub use compositor::{compose, ComposeOptions, TraitCompositor};
pub use definition::{
    ActionDescriptor, Actions, BaseObjectDefinition, FieldSpec, Schema, SemanticMapping,
    Semantics, StateMachineSpec, TokenMapping, Tokens, TraitDefinition, ViewExtension,
    ViewExtensions, DEFAULT_EXTENSION_PRIORITY,
};
pub use dependency_graph::{DependencyGraph, GraphValidation, TraitNode};
pub use errors::{ComposeResult, CompositionError, DependencyError, DependencyErrorKind};
pub use merge::{ArtifactKind, Collision, Layer, MergeOutcome, MergeWarning, Resolution};
pub use provenance::{Contribution, FieldProvenance, Provenance, ProvenanceTracker};
pub use schema_export::{
    base_object_schema, composed_object_schema, trait_definition_schema,
    validation_result_schema,
};
pub use validation::{
    codes, validate_composition, validate_composition_with, Severity, ValidationIssue,
    ValidationOptions, ValidationResult, ValidationSummary,
};
