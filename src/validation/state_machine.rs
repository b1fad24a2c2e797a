// Copyright 2025 Cowboy AI, LLC.

//! Lifecycle contracts
//!
//! A field that governs a state machine must end the composition with a
//! single owner. Several traits may have contributed to it along the way;
//! any value conflict between them is narrated by the collisions rule.

use super::{codes, Severity, ValidationIssue, ValidationOptions};
use crate::composed::ComposedObject;
use crate::definition::StateMachineSpec;

/// Ownership and internal consistency of every state machine field, plus
/// action transitions into undeclared states
pub fn check_state_machine_ownership(
    composed: &ComposedObject,
    _options: &ValidationOptions,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let tracked = composed.metadata.provenance.is_some();

    for (field, spec) in composed.state_machine_fields() {
        let Some(machine) = spec.state_machine.as_ref() else {
            continue;
        };

        if tracked && composed.field_owner(field).is_none() {
            issues.push(
                ValidationIssue::new(
                    codes::UNOWNED_STATE_MACHINE,
                    format!("State machine field '{field}' has no owning trait"),
                    Severity::Error,
                    ["schema", field],
                )
                .with_hint("Contribute the field from exactly one trait"),
            );
        }

        if let Some(initial) = &machine.initial_state {
            if !machine.has_state(initial) {
                issues.push(
                    ValidationIssue::new(
                        codes::INVALID_INITIAL_STATE,
                        format!(
                            "Initial state '{initial}' of '{field}' is not one of [{}]",
                            machine.states.join(", ")
                        ),
                        Severity::Error,
                        ["schema", field, "stateMachine", "initialState"],
                    )
                    .with_hint("Declare the state or pick a declared initial state"),
                );
            }
        }

        for (from, targets) in &machine.transitions {
            for state in std::iter::once(from).chain(targets) {
                if !machine.has_state(state) {
                    issues.push(
                        ValidationIssue::new(
                            codes::UNKNOWN_TRANSITION_TARGET,
                            format!("Transition {from} -> [{}] of '{field}' names undeclared state '{state}'", targets.join(", ")),
                            Severity::Warning,
                            ["schema", field, "stateMachine", "transitions", from.as_str()],
                        )
                        .with_related([state.as_str()]),
                    );
                }
            }
        }
    }

    for (id, action) in &composed.actions {
        let Some(target) = action.transition_to.as_deref() else {
            continue;
        };
        let machine = action
            .target_field
            .as_deref()
            .and_then(|field| composed.schema.get(field))
            .and_then(|spec| spec.state_machine.as_ref());

        let declared = match machine {
            Some(machine) => machine.has_state(target),
            None => composed
                .state_machine_fields()
                .filter_map(|(_, spec)| spec.state_machine.as_ref())
                .any(|m: &StateMachineSpec| m.has_state(target)),
        };

        if !declared {
            let mut related = vec![id.clone()];
            related.extend(action.target_field.clone());
            issues.push(
                ValidationIssue::new(
                    codes::UNKNOWN_TRANSITION_TARGET,
                    format!("Action '{id}' transitions to '{target}', which no state machine declares"),
                    Severity::Warning,
                    ["actions", id.as_str(), "transitionTo"],
                )
                .with_hint("Declare the state on the governed field or fix the action")
                .with_related(related),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ActionDescriptor, FieldSpec};
    use crate::merge::ArtifactKind;
    use crate::provenance::ProvenanceTracker;

    fn composed(machine: StateMachineSpec) -> ComposedObject {
        let mut object = ComposedObject::default();
        object
            .schema
            .insert("status".into(), FieldSpec::new("enum").with_state_machine(machine));
        let mut tracker = ProvenanceTracker::new();
        tracker.record("status", "Stateful", ArtifactKind::Schema, 1);
        object.metadata.provenance = Some(tracker.finish());
        object
    }

    fn lifecycle() -> StateMachineSpec {
        StateMachineSpec::new(["draft", "active"])
            .with_initial_state("draft")
            .with_transition("draft", "active")
    }

    #[test]
    fn owned_consistent_machine_passes() {
        let object = composed(lifecycle());
        assert!(check_state_machine_ownership(&object, &ValidationOptions::default()).is_empty());
    }

    #[test]
    fn missing_owner_is_an_error() {
        let mut object = composed(lifecycle());
        object.metadata.provenance = Some(Default::default());

        let issues = check_state_machine_ownership(&object, &ValidationOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::UNOWNED_STATE_MACHINE);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn untracked_provenance_skips_ownership() {
        let mut object = composed(lifecycle());
        object.metadata.provenance = None;
        assert!(check_state_machine_ownership(&object, &ValidationOptions::default()).is_empty());
    }

    #[test]
    fn undeclared_initial_state() {
        let object = composed(StateMachineSpec::new(["draft"]).with_initial_state("archived"));
        let issues = check_state_machine_ownership(&object, &ValidationOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::INVALID_INITIAL_STATE);
        assert_eq!(issues[0].path, vec!["schema", "status", "stateMachine", "initialState"]);
    }

    #[test]
    fn transition_into_undeclared_state() {
        let object = composed(lifecycle().with_transition("active", "archived"));
        let issues = check_state_machine_ownership(&object, &ValidationOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::UNKNOWN_TRANSITION_TARGET);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].related, vec!["archived"]);
    }

    #[test]
    fn action_targets_are_checked() {
        let mut object = composed(lifecycle());
        object.actions.insert(
            "activate".into(),
            ActionDescriptor::new("Activate").transitions("status", "active"),
        );
        object.actions.insert(
            "archive".into(),
            ActionDescriptor::new("Archive").transitions("status", "archived"),
        );

        let issues = check_state_machine_ownership(&object, &ValidationOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec!["actions", "archive", "transitionTo"]);
        assert_eq!(issues[0].related, vec!["archive", "status"]);
    }
}
