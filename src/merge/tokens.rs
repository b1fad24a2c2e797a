// Copyright 2025 Cowboy AI, LLC.

//! Token merging: later trait wins. Overriding a token is ordinary theming,
//! so nothing is reported.

use indexmap::IndexMap;

use super::{fold, fold_all, Fold, Layer, MergeOutcome};
use crate::definition::Tokens;

#[derive(Debug, Default)]
struct TokensFold {
    result: Tokens,
    owners: IndexMap<String, String>,
}

impl Fold<Tokens> for TokensFold {
    fn apply(&mut self, layer: Layer<'_, Tokens>) {
        for (name, value) in layer.fragment {
            self.result.insert(name.clone(), value.clone());
            self.owners.insert(name.clone(), layer.source.to_string());
        }
    }

    fn finish(self) -> MergeOutcome<Tokens> {
        MergeOutcome {
            result: self.result,
            collisions: Vec::new(),
            warnings: Vec::new(),
            owners: self.owners,
        }
    }
}

/// Merge token overlays onto a base, in order
pub fn merge_tokens(base: Layer<'_, Tokens>, overlays: &[Layer<'_, Tokens>]) -> MergeOutcome<Tokens> {
    fold::<Tokens, TokensFold>(base, overlays)
}

/// Merge an ordered list of token layers; the first one is the base
pub fn merge_multiple_tokens(layers: &[Layer<'_, Tokens>]) -> MergeOutcome<Tokens> {
    fold_all::<Tokens, TokensFold>(layers)
}
