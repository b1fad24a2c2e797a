// Copyright 2025 Cowboy AI, LLC.

//! Show how dependency problems stop a composition
//!
//! Two failures are produced: a trait depending on one that is not part of
//! the composition, and a pair of traits depending on each other. Both are
//! rendered through the same diagnostics shape validation uses.

use anyhow::Result;
use cim_trait_compositor::{
    compose, BaseObjectDefinition, ComposeOptions, DependencyGraph, TraitDefinition,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let base = BaseObjectDefinition::new("object:Invoice", "Invoice", "1.0.0");

    println!("=== Missing dependency ===");
    let traits = vec![TraitDefinition::new("Billable", "1.0.0").depends_on("Addressable")];
    match compose(&traits, &base, ComposeOptions::default()) {
        Ok(composed) => println!("unexpected success: {:?}", composed.traits),
        Err(error) => {
            println!("{error}");
            for issue in error.issues() {
                println!("  {issue}");
                if let Some(hint) = &issue.hint {
                    println!("    hint: {hint}");
                }
            }
        }
    }

    println!("\n=== Circular dependency ===");
    let traits = vec![
        TraitDefinition::new("Approvable", "1.0.0").depends_on("Reviewable"),
        TraitDefinition::new("Reviewable", "1.0.0").depends_on("Approvable"),
        TraitDefinition::new("Printable", "1.0.0"),
    ];

    let graph = DependencyGraph::from_traits(&traits);
    let validation = graph.validate();
    println!("graph valid: {}", validation.success);
    for error in &validation.errors {
        println!("  {error}");
    }

    let error = compose(&traits, &base, ComposeOptions::default())
        .err()
        .ok_or_else(|| anyhow::anyhow!("cycle was not detected"))?;
    println!("compose failed with {}: {}", error.error_type(), error);
    println!("{}", serde_json::to_string_pretty(&error.issues())?);

    Ok(())
}
