// Copyright 2025 Cowboy AI, LLC.

//! # Composition validation
//!
//! A composed object is inspected by six independent rules. Every rule is a
//! plain function with the same signature; the pipeline runs all of them,
//! never stopping at the first failure, and collects every issue into a
//! single [`ValidationResult`]. Only errors make a result invalid.

mod collisions;
mod dependencies;
mod semantic_mappings;
mod state_machine;
mod token_mappings;
mod view_extensions;

use std::fmt;
use std::time::Instant;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::composed::ComposedObject;

pub use collisions::check_collisions;
pub use dependencies::check_dependencies;
pub use semantic_mappings::check_semantic_mappings;
pub use state_machine::check_state_machine_ownership;
pub use token_mappings::check_token_mappings;
pub use view_extensions::check_view_extensions;

/// Stable issue codes
pub mod codes {
    /// Two traits contributed differing schema fields
    pub const PROPERTY_COLLISION: &str = "PROPERTY_COLLISION";
    /// Two traits contributed differing actions
    pub const ACTION_COLLISION: &str = "ACTION_COLLISION";
    /// Provenance names a trait outside the composition
    pub const UNKNOWN_PROVENANCE_SOURCE: &str = "UNKNOWN_PROVENANCE_SOURCE";
    /// Applied trait list and recorded order disagree
    pub const TRAIT_ORDER_MISMATCH: &str = "TRAIT_ORDER_MISMATCH";
    /// Semantic mapping for a field the schema lacks
    pub const ORPHAN_SEMANTIC_MAPPING: &str = "ORPHAN_SEMANTIC_MAPPING";
    /// Schema field without a semantic mapping (strict policy only)
    pub const MISSING_SEMANTIC_MAPPING: &str = "MISSING_SEMANTIC_MAPPING";
    /// A later trait changed a field's semantic type
    pub const SEMANTIC_TYPE_OVERRIDDEN: &str = "SEMANTIC_TYPE_OVERRIDDEN";
    /// State machine field without a final owner
    pub const UNOWNED_STATE_MACHINE: &str = "UNOWNED_STATE_MACHINE";
    /// Initial state is not one of the declared states
    pub const INVALID_INITIAL_STATE: &str = "INVALID_INITIAL_STATE";
    /// Transition or action names an undeclared state
    pub const UNKNOWN_TRANSITION_TARGET: &str = "UNKNOWN_TRANSITION_TARGET";
    /// Token mapping points at a token that does not exist
    pub const DANGLING_TOKEN_REFERENCE: &str = "DANGLING_TOKEN_REFERENCE";
    /// View extension targets an unknown id
    pub const DANGLING_VIEW_TARGET: &str = "DANGLING_VIEW_TARGET";
    /// Composition plus validation took longer than the advisory budget
    pub const PERFORMANCE_BUDGET_EXCEEDED: &str = "PERFORMANCE_BUDGET_EXCEEDED";
}

/// Severity of a validation issue
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Should be looked at, does not invalidate the composition
    Warning,
    /// Invalidates the composition
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A structured diagnostic about a composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationIssue {
    /// Stable code, e.g. `PROPERTY_COLLISION`
    pub code: String,
    /// Human readable message
    pub message: String,
    /// How serious the issue is
    pub severity: Severity,
    /// Path segments locating the issue, e.g. `["schema", "status"]`
    pub path: Vec<String>,
    /// Suggested remediation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Related trait or field ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
    /// Rule that produced the issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl ValidationIssue {
    /// Create an issue
    pub fn new<P, S>(code: &str, message: impl Into<String>, severity: Severity, path: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity,
            path: path.into_iter().map(Into::into).collect(),
            hint: None,
            related: Vec::new(),
            rule: None,
        }
    }

    /// Attach a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach related ids
    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related = related.into_iter().map(Into::into).collect();
        self
    }

    /// Path rendered with dots
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code)?;
        if !self.path.is_empty() {
            write!(f, " {}", self.path_string())?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Issue counts by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ValidationSummary {
    /// Number of errors
    pub errors: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Number of informational issues
    pub infos: usize,
}

impl ValidationSummary {
    /// Tally issues
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut summary, issue| {
            match issue.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
            summary
        })
    }

    /// Total number of issues
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

/// Outcome of validating a composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    /// True when there are no errors
    pub valid: bool,
    /// Every issue, in rule order
    pub issues: Vec<ValidationIssue>,
    /// Counts by severity
    pub summary: ValidationSummary,
}

impl ValidationResult {
    /// Build a result from collected issues
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let summary = ValidationSummary::from_issues(&issues);
        Self {
            valid: summary.errors == 0,
            issues,
            summary,
        }
    }

    /// Error issues
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Warning issues
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// Issues at or above a severity
    pub fn issues_at_least(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity >= severity)
    }

    /// Whether any issue carries the code
    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Issues carrying the code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}

/// Policy knobs for validation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Advisory time budget; exceeding it adds an info issue
    pub performance_target_ms: Option<f64>,
    /// Every schema field must carry a semantic mapping
    pub require_semantics: bool,
}

impl ValidationOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advisory time budget
    pub fn with_performance_target_ms(mut self, target: f64) -> Self {
        self.performance_target_ms = Some(target);
        self
    }

    /// Require a semantic mapping for every schema field
    pub fn with_required_semantics(mut self, required: bool) -> Self {
        self.require_semantics = required;
        self
    }
}

/// Signature shared by every validation rule
pub type Rule = fn(&ComposedObject, &ValidationOptions) -> Vec<ValidationIssue>;

/// Every rule, in the order the pipeline runs them
pub const RULES: [(&str, Rule); 6] = [
    ("collisions", check_collisions),
    ("dependencies", check_dependencies),
    ("semantic_mappings", check_semantic_mappings),
    ("state_machine_ownership", check_state_machine_ownership),
    ("token_mappings", check_token_mappings),
    ("view_extensions", check_view_extensions),
];

/// Validate a composition with default options
pub fn validate_composition(composed: &ComposedObject) -> ValidationResult {
    validate_composition_with(composed, &ValidationOptions::default())
}

/// Validate a composition, running every rule
pub fn validate_composition_with(
    composed: &ComposedObject,
    options: &ValidationOptions,
) -> ValidationResult {
    let started = Instant::now();
    let mut issues = Vec::new();

    for (name, rule) in RULES {
        let found = rule(composed, options);
        debug!(object = %composed.id, rule = name, issues = found.len(), "Ran validation rule");
        issues.extend(found.into_iter().map(|mut issue| {
            issue.rule.get_or_insert_with(|| name.to_string());
            issue
        }));
    }

    if let Some(target) = options.performance_target_ms {
        let composition_ms = composed
            .metadata
            .performance
            .map(|p| p.duration_ms)
            .unwrap_or_default();
        let elapsed = composition_ms + started.elapsed().as_secs_f64() * 1000.0;
        if elapsed > target {
            issues.push(
                ValidationIssue::new(
                    codes::PERFORMANCE_BUDGET_EXCEEDED,
                    format!("Composition and validation took {elapsed:.2}ms, budget is {target:.2}ms"),
                    Severity::Info,
                    ["metadata", "performance"],
                )
                .with_hint("Reduce the trait set or raise the advisory budget")
                .with_related([composed.id.clone()]),
            );
        }
    }

    let result = ValidationResult::from_issues(issues);
    info!(
        object = %composed.id,
        valid = result.valid,
        errors = result.summary.errors,
        warnings = result.summary.warnings,
        infos = result.summary.infos,
        "Validated composition"
    );
    result
}
