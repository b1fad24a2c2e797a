// Copyright 2025 Cowboy AI, LLC.

//! Action merging: later trait wins; the last trait to touch each action id
//! is reported as its owner.

use indexmap::IndexMap;

use super::{fold, fold_all, ArtifactKind, CollisionLedger, Fold, Layer, MergeOutcome, Resolution};
use crate::definition::Actions;

#[derive(Debug, Default)]
struct ActionsFold {
    result: Actions,
    ledger: CollisionLedger,
    owners: IndexMap<String, String>,
}

impl Fold<Actions> for ActionsFold {
    fn apply(&mut self, layer: Layer<'_, Actions>) {
        for (id, descriptor) in layer.fragment {
            self.ledger.contribute(id, layer.source);
            if matches!(self.result.get(id), Some(current) if current != descriptor) {
                self.ledger.conflict(ArtifactKind::Actions, id, Resolution::Auto);
            }
            self.result.insert(id.clone(), descriptor.clone());
            self.owners.insert(id.clone(), layer.source.to_string());
        }
    }

    fn finish(self) -> MergeOutcome<Actions> {
        MergeOutcome {
            result: self.result,
            collisions: self.ledger.into_collisions(),
            warnings: Vec::new(),
            owners: self.owners,
        }
    }
}

/// Merge action overlays onto a base, in order
pub fn merge_actions(base: Layer<'_, Actions>, overlays: &[Layer<'_, Actions>]) -> MergeOutcome<Actions> {
    fold::<Actions, ActionsFold>(base, overlays)
}

/// Merge an ordered list of action layers; the first one is the base
pub fn merge_multiple_actions(layers: &[Layer<'_, Actions>]) -> MergeOutcome<Actions> {
    fold_all::<Actions, ActionsFold>(layers)
}
