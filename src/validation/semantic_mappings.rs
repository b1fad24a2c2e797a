// Copyright 2025 Cowboy AI, LLC.

//! Semantics and schema must describe the same fields

use super::{codes, Severity, ValidationIssue, ValidationOptions};
use crate::composed::ComposedObject;
use crate::merge::semantics::SEMANTIC_TYPE_CHANGED;

/// Reports orphan mappings, and under the strict policy unmapped fields.
/// Semantic type changes recorded while merging are narrated as info.
pub fn check_semantic_mappings(
    composed: &ComposedObject,
    options: &ValidationOptions,
) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = composed
        .semantics
        .iter()
        .filter(|(field, _)| !composed.schema.contains_key(*field))
        .map(|(field, mapping)| {
            ValidationIssue::new(
                codes::ORPHAN_SEMANTIC_MAPPING,
                format!(
                    "Semantic mapping '{}' targets field '{field}', which no schema declares",
                    mapping.semantic_type
                ),
                Severity::Error,
                ["semantics", field.as_str()],
            )
            .with_hint("Add the field to a trait schema or drop the mapping")
            .with_related(owner(composed, field))
        })
        .collect();

    if options.require_semantics {
        issues.extend(
            composed
                .schema
                .keys()
                .filter(|field| !composed.semantics.contains_key(*field))
                .map(|field| {
                    ValidationIssue::new(
                        codes::MISSING_SEMANTIC_MAPPING,
                        format!("Field '{field}' has no semantic mapping"),
                        Severity::Error,
                        ["schema", field.as_str()],
                    )
                    .with_hint("Contribute a semantic mapping for the field")
                    .with_related(owner(composed, field))
                }),
        );
    }

    issues.extend(
        composed
            .metadata
            .warnings
            .iter()
            .filter(|w| w.code == SEMANTIC_TYPE_CHANGED)
            .map(|w| {
                ValidationIssue::new(
                    codes::SEMANTIC_TYPE_OVERRIDDEN,
                    w.message.clone(),
                    Severity::Info,
                    ["semantics", w.field.as_str(), "semantic_type"],
                )
                .with_related(w.sources.iter().cloned())
            }),
    );

    issues
}

fn owner(composed: &ComposedObject, field: &str) -> Vec<String> {
    composed.field_owner(field).map(str::to_string).into_iter().collect()
}
