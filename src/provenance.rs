// Copyright 2025 Cowboy AI, LLC.

//! Field provenance
//!
//! For every field the compositor records each contribution in composition
//! order and which source finally owns the field. Schema contributions
//! decide ownership; a field that only ever received semantics is owned by
//! its last semantics contributor.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::merge::ArtifactKind;

/// One contribution to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    /// Contributing trait id, or the base object id
    pub source: String,
    /// Artifact the contribution came through
    pub artifact: ArtifactKind,
    /// Position in composition order, the base object is step 0
    pub step: usize,
}

/// Where a field came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldProvenance {
    /// Source that finally owns the field
    pub source: String,
    /// Every contribution, oldest first
    pub history: Vec<Contribution>,
}

impl FieldProvenance {
    /// Distinct sources in contribution order
    pub fn contributors(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for c in &self.history {
            if !seen.contains(&c.source.as_str()) {
                seen.push(&c.source);
            }
        }
        seen
    }

    fn has_schema_contribution(&self) -> bool {
        self.history.iter().any(|c| c.artifact == ArtifactKind::Schema)
    }
}

/// Field name → provenance
pub type Provenance = IndexMap<String, FieldProvenance>;

/// Builds provenance one merge step at a time
#[derive(Debug, Default)]
pub struct ProvenanceTracker {
    fields: Provenance,
}

impl ProvenanceTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` contributed `field` through `artifact` at `step`
    pub fn record(&mut self, field: &str, source: &str, artifact: ArtifactKind, step: usize) {
        let entry = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| FieldProvenance {
                source: source.to_string(),
                history: Vec::new(),
            });

        let takes_ownership = artifact == ArtifactKind::Schema || !entry.has_schema_contribution();
        entry.history.push(Contribution {
            source: source.to_string(),
            artifact,
            step,
        });
        if takes_ownership {
            entry.source = source.to_string();
        }
    }

    /// Record every key of a fragment
    pub fn record_all<'a, I>(&mut self, fields: I, source: &str, artifact: ArtifactKind, step: usize)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for field in fields {
            self.record(field, source, artifact, step);
        }
    }

    /// Finish tracking
    pub fn finish(self) -> Provenance {
        self.fields
    }
}
