// Copyright 2025 Cowboy AI, LLC.

//! Narrates every recorded merge collision

use super::{codes, Severity, ValidationIssue, ValidationOptions};
use crate::composed::ComposedObject;
use crate::merge::{ArtifactKind, Resolution};

/// One issue per collision: `warning` when ordering alone settled it,
/// `info` when the winner declared the override
pub fn check_collisions(composed: &ComposedObject, _options: &ValidationOptions) -> Vec<ValidationIssue> {
    composed
        .metadata
        .collisions
        .iter()
        .map(|collision| {
            let (code, noun) = match collision.artifact {
                ArtifactKind::Actions => (codes::ACTION_COLLISION, "Action"),
                _ => (codes::PROPERTY_COLLISION, "Field"),
            };
            let (severity, hint) = match collision.resolution {
                Resolution::Auto => (
                    Severity::Warning,
                    "Align the contributions or mark the winning one as an explicit override",
                ),
                Resolution::Manual => (
                    Severity::Info,
                    "Override was declared explicitly; no action needed",
                ),
            };
            let winner = collision
                .conflicting_traits
                .last()
                .map(String::as_str)
                .unwrap_or_default();

            ValidationIssue::new(
                code,
                format!(
                    "{noun} '{}' is contributed differently by {}; '{winner}' wins",
                    collision.field,
                    collision.conflicting_traits.join(", ")
                ),
                severity,
                [collision.artifact.to_string(), collision.field.clone()],
            )
            .with_hint(hint)
            .with_related(collision.conflicting_traits.iter().cloned())
        })
        .collect()
}
