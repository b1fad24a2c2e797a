// Copyright 2025 Cowboy AI, LLC.

//! Compose a User object from three traits and validate it
//!
//! This example demonstrates:
//! - Declaring traits with schema, semantics, tokens, views and actions
//! - Dependency-driven ordering (Colorized builds on Stateful)
//! - Reading provenance and collisions from the composed metadata
//! - Running the validation pipeline with a strict semantics policy

use anyhow::Result;
use cim_trait_compositor::{
    validate_composition_with, ActionDescriptor, BaseObjectDefinition, ComposeOptions, FieldSpec,
    SemanticMapping, StateMachineSpec, TraitCompositor, TraitDefinition, ValidationOptions,
    ViewExtension,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn user() -> BaseObjectDefinition {
    BaseObjectDefinition::new("object:User", "User", "1.0.0")
        .with_field("id", FieldSpec::new("uuid").required())
        .with_field("email", FieldSpec::new("string").with_extra("format", json!("email")))
        .with_semantic("id", SemanticMapping::new("identity.id"))
        .with_semantic("email", SemanticMapping::new("contact.email"))
}

fn stateful() -> TraitDefinition {
    TraitDefinition::new("Stateful", "1.0.0")
        .with_field(
            "status",
            FieldSpec::new("enum").with_enum(["draft", "active", "archived"]).with_state_machine(
                StateMachineSpec::new(["draft", "active", "archived"])
                    .with_initial_state("draft")
                    .with_transition("draft", "active")
                    .with_transition("active", "archived"),
            ),
        )
        .with_semantic("status", SemanticMapping::new("lifecycle.status"))
        .with_action(
            "activate",
            ActionDescriptor::new("Activate").with_intent("primary").transitions("status", "active"),
        )
        .with_action(
            "archive",
            ActionDescriptor::new("Archive")
                .with_intent("destructive")
                .transitions("status", "archived"),
        )
}

fn colorized() -> TraitDefinition {
    TraitDefinition::new("Colorized", "1.0.0")
        .depends_on("Stateful")
        .with_token("color.neutral", json!("#6b7280"))
        .with_token("color.success", json!("#16a34a"))
        .with_token("color.muted", json!("#9ca3af"))
        .with_semantic(
            "status",
            SemanticMapping::new("lifecycle.status")
                .with_keyed_tokens([
                    ("draft", "color.neutral"),
                    ("active", "color.success"),
                    ("archived", "color.muted"),
                ])
                .with_hint("badge", json!({ "variant": "pill" })),
        )
        .with_extension(
            "main",
            ViewExtension::new("status-badge", "StatusBadge")
                .with_priority(10)
                .targeting("status"),
        )
}

fn auditable() -> TraitDefinition {
    TraitDefinition::new("Auditable", "1.0.0")
        .with_field("updatedAt", FieldSpec::new("datetime"))
        .with_semantic("updatedAt", SemanticMapping::new("audit.timestamp"))
        .with_extension("sidebar", ViewExtension::new("audit-log", "AuditLog"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Trait Composition: User ===\n");

    // Colorized is listed first but depends on Stateful
    let traits = vec![colorized(), stateful(), auditable()];
    let compositor = TraitCompositor::with_options(ComposeOptions::new().with_performance(true));
    let composed = compositor.compose(&traits, &user())?;

    println!("Trait order: {}", composed.metadata.trait_order.join(" -> "));
    println!("Fields:");
    for (name, spec) in &composed.schema {
        let owner = composed.field_owner(name).unwrap_or("?");
        println!("  {name:<10} {:<9} owned by {owner}", spec.field_type);
    }

    println!("\nView regions:");
    for (region, extensions) in &composed.view_extensions {
        let ids: Vec<_> = extensions.iter().map(|e| e.id.as_str()).collect();
        println!("  {region}: {}", ids.join(", "));
    }

    println!("\nAction owners:");
    for (action, owner) in &composed.metadata.action_owners {
        println!("  {action} <- {owner}");
    }

    if let Some(performance) = composed.metadata.performance {
        println!("\nComposed in {:.3}ms", performance.duration_ms);
    }

    let options = ValidationOptions::new()
        .with_required_semantics(true)
        .with_performance_target_ms(50.0);
    let result = validate_composition_with(&composed, &options);

    println!(
        "\nValidation: valid={} errors={} warnings={} infos={}",
        result.valid, result.summary.errors, result.summary.warnings, result.summary.infos
    );
    for issue in &result.issues {
        println!("  {issue}");
    }

    println!("\n{}", serde_json::to_string_pretty(&composed.metadata)?);
    Ok(())
}
