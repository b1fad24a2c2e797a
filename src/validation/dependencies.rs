// Copyright 2025 Cowboy AI, LLC.

//! Re-checks that provenance only names traits that took part in the
//! composition. The graph already enforced this before merging; a mismatch
//! here means the composed object was altered or assembled by hand.

use indexmap::IndexSet;

use super::{codes, Severity, ValidationIssue, ValidationOptions};
use crate::composed::ComposedObject;

/// Every provenance and action owner must be the base or an ordered trait
pub fn check_dependencies(composed: &ComposedObject, _options: &ValidationOptions) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if composed.traits != composed.metadata.trait_order {
        issues.push(
            ValidationIssue::new(
                codes::TRAIT_ORDER_MISMATCH,
                format!(
                    "Applied traits [{}] differ from recorded order [{}]",
                    composed.traits.join(", "),
                    composed.metadata.trait_order.join(", ")
                ),
                Severity::Error,
                ["metadata", "traitOrder"],
            )
            .with_hint("Recompose the object instead of editing its trait list"),
        );
    }

    if let Some(provenance) = &composed.metadata.provenance {
        for (field, entry) in provenance {
            let unknown: IndexSet<&str> = std::iter::once(entry.source.as_str())
                .chain(entry.history.iter().map(|c| c.source.as_str()))
                .filter(|source| !composed.is_participant(source))
                .collect();
            for source in unknown {
                issues.push(unknown_source(source, ["metadata", "provenance", field.as_str()]));
            }
        }
    }

    for (action, owner) in &composed.metadata.action_owners {
        if !composed.is_participant(owner) {
            issues.push(unknown_source(owner, ["metadata", "actionOwners", action.as_str()]));
        }
    }

    issues
}

fn unknown_source(source: &str, path: [&str; 3]) -> ValidationIssue {
    ValidationIssue::new(
        codes::UNKNOWN_PROVENANCE_SOURCE,
        format!("'{source}' is recorded as a contributor but is not part of the trait order"),
        Severity::Error,
        path,
    )
    .with_hint("Add the trait to the composition or recompose from the original inputs")
    .with_related([source])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ArtifactKind;
    use crate::provenance::{Contribution, FieldProvenance, Provenance};

    fn composed() -> ComposedObject {
        let mut object = ComposedObject {
            id: "object:User".into(),
            traits: vec!["Stateful".into()],
            ..Default::default()
        };
        object.metadata.trait_order = vec!["Stateful".into()];
        object
    }

    fn owned_by(source: &str, history: &[&str]) -> FieldProvenance {
        FieldProvenance {
            source: source.into(),
            history: history
                .iter()
                .enumerate()
                .map(|(step, s)| Contribution {
                    source: s.to_string(),
                    artifact: ArtifactKind::Schema,
                    step,
                })
                .collect(),
        }
    }

    #[test]
    fn base_and_ordered_traits_are_accepted() {
        let mut object = composed();
        object.metadata.provenance = Some(Provenance::from([
            ("id".to_string(), owned_by("object:User", &["object:User"])),
            ("status".to_string(), owned_by("Stateful", &["Stateful"])),
        ]));
        assert!(check_dependencies(&object, &ValidationOptions::default()).is_empty());
    }

    #[test]
    fn unknown_contributors_are_errors() {
        let mut object = composed();
        object.metadata.provenance = Some(Provenance::from([(
            "status".to_string(),
            owned_by("Ghost", &["Stateful", "Ghost", "Ghost"]),
        )]));
        object
            .metadata
            .action_owners
            .insert("haunt".into(), "Ghost".into());

        let issues = check_dependencies(&object, &ValidationOptions::default());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.code == codes::UNKNOWN_PROVENANCE_SOURCE));
        assert_eq!(issues[0].path, vec!["metadata", "provenance", "status"]);
        assert_eq!(issues[1].path, vec!["metadata", "actionOwners", "haunt"]);
    }

    #[test]
    fn missing_provenance_is_not_checked() {
        let object = composed();
        assert!(check_dependencies(&object, &ValidationOptions::default()).is_empty());
    }

    #[test]
    fn edited_trait_list_is_reported() {
        let mut object = composed();
        object.traits.push("Colorized".into());
        let issues = check_dependencies(&object, &ValidationOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::TRAIT_ORDER_MISMATCH);
    }
}
