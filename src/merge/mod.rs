// Copyright 2025 Cowboy AI, LLC.

//! Merge strategies for the five trait artifacts
//!
//! Every strategy is a left fold: the base layer seeds the accumulator and
//! each overlay is applied in composition order. Later layers win unless the
//! strategy says otherwise, so `merge_multiple_*([a, b, c])` always equals
//! merging `a` with `b` and then the result with `c`.
//!
//! | Artifact        | Conflict rule                                   |
//! |-----------------|-------------------------------------------------|
//! | schema          | later wins, differing specs recorded as collision |
//! | semantics       | type/token later wins, `ui_hints` deep-merged   |
//! | tokens          | later wins, silently                            |
//! | view extensions | concatenated, sorted by priority, deduped by id |
//! | actions         | later wins, last owner tracked                  |

pub mod actions;
pub mod schema;
pub mod semantics;
pub mod tokens;
pub mod view_extensions;

use std::fmt;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use actions::{merge_actions, merge_multiple_actions};
pub use schema::{merge_multiple_schema, merge_schema};
pub use semantics::{merge_multiple_semantics, merge_semantics};
pub use tokens::{merge_multiple_tokens, merge_tokens};
pub use view_extensions::{merge_multiple_view_extensions, merge_view_extensions};

/// One artifact fragment together with the trait (or base) it came from
#[derive(Debug)]
pub struct Layer<'a, T> {
    /// Contributing trait id, or the base object id
    pub source: &'a str,
    /// The contributed fragment
    pub fragment: &'a T,
}

impl<T> Clone for Layer<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Layer<'_, T> {}

impl<'a, T> Layer<'a, T> {
    /// Pair a fragment with its source
    pub fn new(source: &'a str, fragment: &'a T) -> Self {
        Self { source, fragment }
    }
}

/// Artifact a collision was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Schema fields
    Schema,
    /// Semantic mappings
    Semantics,
    /// Design tokens
    Tokens,
    /// View extensions
    ViewExtensions,
    /// Actions
    Actions,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Schema => "schema",
            ArtifactKind::Semantics => "semantics",
            ArtifactKind::Tokens => "tokens",
            ArtifactKind::ViewExtensions => "view_extensions",
            ArtifactKind::Actions => "actions",
        };
        f.write_str(name)
    }
}

/// How a collision was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Later trait won by ordering alone
    Auto,
    /// Winning contribution explicitly declared the override
    Manual,
}

/// Two or more sources contributed differing values for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Collision {
    /// Artifact the key belongs to
    pub artifact: ArtifactKind,
    /// Field or action id
    pub field: String,
    /// Every distinct source that contributed the key, in order
    pub conflicting_traits: Vec<String>,
    /// How the value was settled
    pub resolution: Resolution,
}

/// A non-fatal observation made while merging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MergeWarning {
    /// Stable warning code
    pub code: String,
    /// Artifact the warning concerns
    pub artifact: ArtifactKind,
    /// Key the warning concerns
    pub field: String,
    /// Human readable description
    pub message: String,
    /// Sources involved, earlier first
    pub sources: Vec<String>,
}

/// Result of folding layers of one artifact
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergeOutcome<T> {
    /// The merged artifact
    pub result: T,
    /// Collisions, one per key
    pub collisions: Vec<Collision>,
    /// Non-fatal warnings in the order they arose
    pub warnings: Vec<MergeWarning>,
    /// Key → source that last wrote it
    pub owners: IndexMap<String, String>,
}

/// Accumulator behind one merge strategy
pub(crate) trait Fold<T>: Default {
    /// Apply one layer on top of everything applied so far
    fn apply(&mut self, layer: Layer<'_, T>);

    /// Finish the fold
    fn finish(self) -> MergeOutcome<T>;
}

pub(crate) fn fold<T, F: Fold<T>>(base: Layer<'_, T>, overlays: &[Layer<'_, T>]) -> MergeOutcome<T> {
    let mut acc = F::default();
    acc.apply(base);
    for overlay in overlays {
        acc.apply(*overlay);
    }
    acc.finish()
}

pub(crate) fn fold_all<T: Default, F: Fold<T>>(layers: &[Layer<'_, T>]) -> MergeOutcome<T> {
    match layers.split_first() {
        Some((base, overlays)) => fold::<T, F>(*base, overlays),
        None => MergeOutcome::default(),
    }
}

/// Collision bookkeeping shared by the keyed strategies
#[derive(Debug, Default)]
pub(crate) struct CollisionLedger {
    contributors: IndexMap<String, Vec<String>>,
    collisions: IndexMap<String, Collision>,
}

impl CollisionLedger {
    /// Note that `source` contributed `key`
    pub(crate) fn contribute(&mut self, key: &str, source: &str) {
        let sources = self.contributors.entry(key.to_string()).or_default();
        if !sources.iter().any(|s| s == source) {
            sources.push(source.to_string());
        }
        if let Some(collision) = self.collisions.get_mut(key) {
            if !collision.conflicting_traits.iter().any(|s| s == source) {
                collision.conflicting_traits.push(source.to_string());
            }
        }
    }

    /// Record that the latest contribution to `key` differs from the current value
    pub(crate) fn conflict(&mut self, artifact: ArtifactKind, key: &str, resolution: Resolution) {
        let sources = self.contributors.get(key).cloned().unwrap_or_default();
        if sources.len() < 2 {
            return;
        }
        self.collisions
            .entry(key.to_string())
            .and_modify(|c| {
                c.conflicting_traits = sources.clone();
                c.resolution = resolution;
            })
            .or_insert_with(|| Collision {
                artifact,
                field: key.to_string(),
                conflicting_traits: sources,
                resolution,
            });
    }

    pub(crate) fn into_collisions(self) -> Vec<Collision> {
        self.collisions.into_values().collect()
    }
}
