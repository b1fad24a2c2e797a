// Copyright 2025 Cowboy AI, LLC.

//! The composed object: a base object with an ordered trait set applied

use std::collections::HashSet;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::definition::{Actions, FieldSpec, Schema, Semantics, Tokens, ViewExtensions};
use crate::merge::{Collision, MergeWarning};
use crate::provenance::Provenance;

/// Wall time spent composing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Total composition time in milliseconds
    pub duration_ms: f64,
}

/// Bookkeeping that accompanies a composed object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompositionMetadata {
    /// Field provenance, absent when tracking was switched off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,

    /// Collisions from every merge strategy
    #[serde(default)]
    pub collisions: Vec<Collision>,

    /// Non-fatal merge warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<MergeWarning>,

    /// Trait ids in composition order, base excluded
    pub trait_order: Vec<String>,

    /// Number of traits applied
    pub trait_count: usize,

    /// Action id → trait that last touched it
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub action_owners: IndexMap<String, String>,

    /// Composition timing, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

/// A base object with every trait artifact merged in
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ComposedObject {
    /// Base object id
    pub id: String,
    /// Base object name
    pub name: String,
    /// Base object version
    pub version: String,
    /// Applied trait ids, in composition order
    pub traits: Vec<String>,
    /// Merged schema
    pub schema: Schema,
    /// Merged semantics
    pub semantics: Semantics,
    /// Merged tokens
    pub tokens: Tokens,
    /// Merged view extensions
    pub view_extensions: ViewExtensions,
    /// Merged actions
    pub actions: Actions,
    /// Provenance, collisions and ordering
    pub metadata: CompositionMetadata,
}

impl ComposedObject {
    /// Final owner of a field, if provenance was tracked
    pub fn field_owner(&self, field: &str) -> Option<&str> {
        self.metadata
            .provenance
            .as_ref()
            .and_then(|p| p.get(field))
            .map(|p| p.source.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Schema fields that govern a lifecycle contract
    pub fn state_machine_fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.schema
            .iter()
            .filter(|(_, spec)| spec.governs_state_machine())
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// Whether a trait id (or the base id) took part in this composition
    pub fn is_participant(&self, id: &str) -> bool {
        id == self.id || self.metadata.trait_order.iter().any(|t| t == id)
    }

    /// Every id that can be referenced from inside the object: the object
    /// itself, its traits, fields, actions, regions and view extensions
    pub fn known_ids(&self) -> HashSet<&str> {
        let mut ids: HashSet<&str> = HashSet::new();
        ids.insert(&self.id);
        ids.extend(self.traits.iter().map(String::as_str));
        ids.extend(self.schema.keys().map(String::as_str));
        ids.extend(self.actions.keys().map(String::as_str));
        for (region, extensions) in &self.view_extensions {
            ids.insert(region);
            ids.extend(extensions.iter().map(|e| e.id.as_str()));
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ActionDescriptor, StateMachineSpec, ViewExtension};
    use crate::provenance::FieldProvenance;
    use serde_json::json;

    fn sample() -> ComposedObject {
        let mut object = ComposedObject {
            id: "object:User".into(),
            name: "User".into(),
            version: "1.0.0".into(),
            traits: vec!["Stateful".into()],
            ..Default::default()
        };
        object.schema.insert(
            "status".into(),
            FieldSpec::new("enum").with_state_machine(StateMachineSpec::new(["draft", "active"])),
        );
        object.schema.insert("email".into(), FieldSpec::new("string"));
        object
            .actions
            .insert("activate".into(), ActionDescriptor::new("Activate"));
        object
            .view_extensions
            .insert("main".into(), vec![ViewExtension::new("status-badge", "Badge")]);
        object.metadata.trait_order = vec!["Stateful".into()];
        object.metadata.trait_count = 1;
        object
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let mut object = sample();
        object.metadata.performance = Some(PerformanceMetrics { duration_ms: 1.5 });

        let value = serde_json::to_value(&object).unwrap();
        assert_eq!(value["metadata"]["traitOrder"], json!(["Stateful"]));
        assert_eq!(value["metadata"]["traitCount"], json!(1));
        assert_eq!(value["metadata"]["performance"]["durationMs"], json!(1.5));
        assert!(value["metadata"].get("provenance").is_none());
    }

    #[test]
    fn state_machine_fields_are_found() {
        let object = sample();
        let fields: Vec<_> = object.state_machine_fields().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["status"]);
    }

    #[test]
    fn field_owner_reads_provenance() {
        let mut object = sample();
        assert_eq!(object.field_owner("status"), None);

        object.metadata.provenance = Some(Provenance::from([(
            "status".to_string(),
            FieldProvenance {
                source: "Stateful".into(),
                history: Vec::new(),
            },
        )]));
        assert_eq!(object.field_owner("status"), Some("Stateful"));
    }

    #[test]
    fn known_ids_cover_every_namespace() {
        let object = sample();
        let ids = object.known_ids();
        for id in ["object:User", "Stateful", "status", "email", "activate", "main", "status-badge"] {
            assert!(ids.contains(id), "missing {id}");
        }
        assert!(object.is_participant("object:User"));
        assert!(!object.is_participant("Billable"));
    }
}
