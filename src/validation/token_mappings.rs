// Copyright 2025 Cowboy AI, LLC.

//! Token references from semantic mappings must resolve

use super::{codes, Severity, ValidationIssue, ValidationOptions};
use crate::composed::ComposedObject;

/// Every token a semantic mapping refers to must exist in the merged tokens
pub fn check_token_mappings(composed: &ComposedObject, _options: &ValidationOptions) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (field, mapping) in &composed.semantics {
        let Some(token_mapping) = &mapping.token_mapping else {
            continue;
        };
        for (key, token) in token_mapping.references() {
            if composed.tokens.contains_key(token) {
                continue;
            }
            let mut path = vec!["semantics", field.as_str(), "token_mapping"];
            path.extend(key);

            let mut related = vec![token.to_string()];
            related.extend(composed.field_owner(field).map(str::to_string));

            issues.push(
                ValidationIssue::new(
                    codes::DANGLING_TOKEN_REFERENCE,
                    format!("Semantic mapping for '{field}' references undefined token '{token}'"),
                    Severity::Error,
                    path,
                )
                .with_hint("Define the token in a trait or the base object, or fix the reference")
                .with_related(related),
            );
        }
    }

    issues
}
