// Copyright 2025 Cowboy AI, LLC.

//! View extension targets must resolve

use super::{codes, Severity, ValidationIssue, ValidationOptions};
use crate::composed::ComposedObject;

/// An extension's `targetId`, when present, must name a known id
pub fn check_view_extensions(composed: &ComposedObject, _options: &ValidationOptions) -> Vec<ValidationIssue> {
    let known = composed.known_ids();

    composed
        .view_extensions
        .iter()
        .flat_map(|(region, extensions)| extensions.iter().map(move |e| (region, e)))
        .filter_map(|(region, extension)| {
            let target = extension.target_id.as_deref()?;
            if known.contains(target) {
                return None;
            }
            Some(
                ValidationIssue::new(
                    codes::DANGLING_VIEW_TARGET,
                    format!(
                        "View extension '{}' in region '{region}' targets unknown id '{target}'",
                        extension.id
                    ),
                    Severity::Warning,
                    ["view_extensions", region.as_str(), extension.id.as_str(), "targetId"],
                )
                .with_hint("Point the extension at a field, action, region or extension of this object")
                .with_related([extension.id.as_str(), target]),
            )
        })
        .collect()
}
