// Copyright 2025 Cowboy AI, LLC.

//! Schema merging: later trait wins, differing specs are collisions

use indexmap::IndexMap;

use super::{fold, fold_all, ArtifactKind, CollisionLedger, Fold, Layer, MergeOutcome, Resolution};
use crate::definition::Schema;

#[derive(Debug, Default)]
struct SchemaFold {
    result: Schema,
    ledger: CollisionLedger,
    owners: IndexMap<String, String>,
}

impl Fold<Schema> for SchemaFold {
    fn apply(&mut self, layer: Layer<'_, Schema>) {
        for (field, spec) in layer.fragment {
            self.ledger.contribute(field, layer.source);

            if let Some(current) = self.result.get(field) {
                if !current.same_shape(spec) {
                    let resolution = if spec.overrides {
                        Resolution::Manual
                    } else {
                        Resolution::Auto
                    };
                    self.ledger.conflict(ArtifactKind::Schema, field, resolution);
                }
            }

            self.result.insert(field.clone(), spec.clone());
            self.owners.insert(field.clone(), layer.source.to_string());
        }
    }

    fn finish(self) -> MergeOutcome<Schema> {
        MergeOutcome {
            result: self.result,
            collisions: self.ledger.into_collisions(),
            warnings: Vec::new(),
            owners: self.owners,
        }
    }
}

/// Merge schema overlays onto a base, in order
pub fn merge_schema(base: Layer<'_, Schema>, overlays: &[Layer<'_, Schema>]) -> MergeOutcome<Schema> {
    fold::<Schema, SchemaFold>(base, overlays)
}

/// Merge an ordered list of schema layers; the first one is the base
pub fn merge_multiple_schema(layers: &[Layer<'_, Schema>]) -> MergeOutcome<Schema> {
    fold_all::<Schema, SchemaFold>(layers)
}
