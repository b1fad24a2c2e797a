// Copyright 2025 Cowboy AI, LLC.

//! Error types for trait composition

use std::fmt;

use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{Severity, ValidationIssue};

/// The kind of problem found in the trait dependency graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DependencyErrorKind {
    /// A declared dependency has no registered trait
    MissingDependency,
    /// Dependencies loop back onto themselves
    CircularDependency,
}

impl DependencyErrorKind {
    /// Stable diagnostic code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            DependencyErrorKind::MissingDependency => "MISSING_DEPENDENCY",
            DependencyErrorKind::CircularDependency => "CIRCULAR_DEPENDENCY",
        }
    }
}

impl fmt::Display for DependencyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyErrorKind::MissingDependency => write!(f, "missing_dependency"),
            DependencyErrorKind::CircularDependency => write!(f, "circular_dependency"),
        }
    }
}

/// A single dependency graph violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DependencyError {
    /// What went wrong
    pub kind: DependencyErrorKind,
    /// Trait that declared the offending dependency
    pub trait_id: String,
    /// Unresolved dependency name (missing dependencies only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
    /// Full cycle chain, first node repeated at the end (cycles only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycle: Vec<String>,
    /// Human readable description
    pub message: String,
}

impl DependencyError {
    /// A trait names a dependency that was never registered
    pub fn missing(trait_id: impl Into<String>, dependency: impl Into<String>) -> Self {
        let trait_id = trait_id.into();
        let dependency = dependency.into();
        let message = format!(
            "Trait '{trait_id}' depends on '{dependency}', which is not part of the composition"
        );
        Self {
            kind: DependencyErrorKind::MissingDependency,
            trait_id,
            dependency: Some(dependency),
            cycle: Vec::new(),
            message,
        }
    }

    /// A dependency chain that returns to its start, e.g. `A -> B -> A`
    pub fn circular(cycle: Vec<String>) -> Self {
        let trait_id = cycle.first().cloned().unwrap_or_default();
        let message = format!("Circular dependency detected: {}", cycle.join(" -> "));
        Self {
            kind: DependencyErrorKind::CircularDependency,
            trait_id,
            dependency: None,
            cycle,
            message,
        }
    }

    /// Project this error into the shared diagnostics shape
    pub fn to_issue(&self) -> ValidationIssue {
        let mut path = vec!["traits".to_string(), self.trait_id.clone()];
        let mut related = vec![self.trait_id.clone()];
        let hint = match self.kind {
            DependencyErrorKind::MissingDependency => {
                if let Some(dep) = &self.dependency {
                    path.push("dependencies".to_string());
                    path.push(dep.clone());
                    related.push(dep.clone());
                }
                "Add the missing trait to the composition or remove the dependency"
            }
            DependencyErrorKind::CircularDependency => {
                path.push("dependencies".to_string());
                related = self.cycle.iter().cloned().collect::<IndexSet<_>>().into_iter().collect();
                "Break the cycle by removing one of the dependencies in the chain"
            }
        };

        ValidationIssue::new(self.kind.code(), self.message.clone(), Severity::Error, path)
            .with_hint(hint)
            .with_related(related)
    }
}

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Errors that can occur while composing traits onto a base object
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompositionError {
    /// The trait dependency graph failed validation; nothing was merged
    #[error("Dependency error: {}", summarize(.errors))]
    DependencyError {
        /// Every problem found in the graph
        errors: Vec<DependencyError>,
    },
}

fn summarize(errors: &[DependencyError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for composition operations
pub type ComposeResult<T> = Result<T, CompositionError>;

impl CompositionError {
    /// Stable type tag of the failure
    pub fn error_type(&self) -> &'static str {
        match self {
            CompositionError::DependencyError { .. } => "dependency_error",
        }
    }

    /// Dependency errors carried by this failure
    pub fn dependency_errors(&self) -> &[DependencyError] {
        match self {
            CompositionError::DependencyError { errors } => errors,
        }
    }

    /// Check if any carried error is a dependency cycle
    pub fn is_circular(&self) -> bool {
        self.dependency_errors()
            .iter()
            .any(|e| e.kind == DependencyErrorKind::CircularDependency)
    }

    /// Check if any carried error is an unresolved dependency
    pub fn is_missing_dependency(&self) -> bool {
        self.dependency_errors()
            .iter()
            .any(|e| e.kind == DependencyErrorKind::MissingDependency)
    }

    /// Render the failure as diagnostics with stable codes
    pub fn issues(&self) -> Vec<ValidationIssue> {
        self.dependency_errors()
            .iter()
            .map(DependencyError::to_issue)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = DependencyError::missing("Billable", "Addressable");
        assert_eq!(
            err.to_string(),
            "missing_dependency: Trait 'Billable' depends on 'Addressable', which is not part of the composition"
        );

        let err = DependencyError::circular(vec!["A".into(), "B".into(), "A".into()]);
        assert_eq!(
            err.to_string(),
            "circular_dependency: Circular dependency detected: A -> B -> A"
        );
        assert_eq!(err.trait_id, "A");

        let err = CompositionError::DependencyError {
            errors: vec![
                DependencyError::missing("A", "X"),
                DependencyError::circular(vec!["B".into(), "B".into()]),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Dependency error: Trait 'A' depends on 'X', which is not part of the composition; Circular dependency detected: B -> B"
        );
    }

    #[test]
    fn test_error_classification() {
        let err = CompositionError::DependencyError {
            errors: vec![DependencyError::circular(vec!["A".into(), "B".into(), "A".into()])],
        };
        assert_eq!(err.error_type(), "dependency_error");
        assert!(err.is_circular());
        assert!(!err.is_missing_dependency());
    }

    #[test]
    fn test_issue_projection() {
        let err = CompositionError::DependencyError {
            errors: vec![
                DependencyError::missing("Billable", "object:User"),
                DependencyError::circular(vec!["A".into(), "B".into(), "A".into()]),
            ],
        };
        let issues = err.issues();
        assert_eq!(issues.len(), 2);

        assert_eq!(issues[0].code, "MISSING_DEPENDENCY");
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(
            issues[0].path,
            vec!["traits", "Billable", "dependencies", "object:User"]
        );
        assert_eq!(issues[0].related, vec!["Billable", "object:User"]);

        assert_eq!(issues[1].code, "CIRCULAR_DEPENDENCY");
        assert_eq!(issues[1].related, vec!["A", "B"]);
        assert!(issues[1].hint.is_some());
    }
}
