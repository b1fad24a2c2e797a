// Copyright 2025 Cowboy AI, LLC.

//! Semantics merging
//!
//! `semantic_type` and `token_mapping` are taken from the later layer when it
//! sets them. `ui_hints` are merged key by key, recursively through nested
//! objects. A change of `semantic_type` is allowed but produces a warning.

use indexmap::IndexMap;
use serde_json::Value;

use super::{fold, fold_all, ArtifactKind, Fold, Layer, MergeOutcome, MergeWarning};
use crate::definition::{SemanticMapping, Semantics};

/// Warning code emitted when a field's semantic type is replaced
pub const SEMANTIC_TYPE_CHANGED: &str = "SEMANTIC_TYPE_CHANGED";

#[derive(Debug, Default)]
struct SemanticsFold {
    result: Semantics,
    warnings: Vec<MergeWarning>,
    owners: IndexMap<String, String>,
}

impl Fold<Semantics> for SemanticsFold {
    fn apply(&mut self, layer: Layer<'_, Semantics>) {
        for (field, overlay) in layer.fragment {
            match self.result.get_mut(field) {
                Some(current) => {
                    let previous_owner = self.owners.get(field).cloned().unwrap_or_default();
                    if let Some(warning) =
                        merge_mapping(current, overlay, field, &previous_owner, layer.source)
                    {
                        self.warnings.push(warning);
                    }
                }
                None => {
                    self.result.insert(field.clone(), overlay.clone());
                }
            }
            self.owners.insert(field.clone(), layer.source.to_string());
        }
    }

    fn finish(self) -> MergeOutcome<Semantics> {
        MergeOutcome {
            result: self.result,
            collisions: Vec::new(),
            warnings: self.warnings,
            owners: self.owners,
        }
    }
}

fn merge_mapping(
    current: &mut SemanticMapping,
    overlay: &SemanticMapping,
    field: &str,
    previous_owner: &str,
    source: &str,
) -> Option<MergeWarning> {
    let mut warning = None;

    if !overlay.semantic_type.is_empty() {
        if !current.semantic_type.is_empty() && current.semantic_type != overlay.semantic_type {
            warning = Some(MergeWarning {
                code: SEMANTIC_TYPE_CHANGED.to_string(),
                artifact: ArtifactKind::Semantics,
                field: field.to_string(),
                message: format!(
                    "Semantic type of '{field}' changed from '{}' ({previous_owner}) to '{}' ({source})",
                    current.semantic_type, overlay.semantic_type
                ),
                sources: vec![previous_owner.to_string(), source.to_string()],
            });
        }
        current.semantic_type = overlay.semantic_type.clone();
    }

    if overlay.token_mapping.is_some() {
        current.token_mapping = overlay.token_mapping.clone();
    }

    deep_merge_map(&mut current.ui_hints, &overlay.ui_hints);
    warning
}

/// Merge `overlay` into `base`: overlay keys win, nested objects merge recursively
pub fn deep_merge_map(base: &mut IndexMap<String, Value>, overlay: &IndexMap<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(key) {
            Some(existing) => deep_merge_value(existing, value),
            None => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn deep_merge_value(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge_value(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Merge semantics overlays onto a base, in order
pub fn merge_semantics(
    base: Layer<'_, Semantics>,
    overlays: &[Layer<'_, Semantics>],
) -> MergeOutcome<Semantics> {
    fold::<Semantics, SemanticsFold>(base, overlays)
}

/// Merge an ordered list of semantics layers; the first one is the base
pub fn merge_multiple_semantics(layers: &[Layer<'_, Semantics>]) -> MergeOutcome<Semantics> {
    fold_all::<Semantics, SemanticsFold>(layers)
}
