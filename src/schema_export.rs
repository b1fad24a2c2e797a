// Copyright 2025 Cowboy AI, LLC.

//! JSON Schemas for the public input and output records, for downstream
//! generators that validate payloads outside of Rust

use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::composed::ComposedObject;
use crate::definition::{BaseObjectDefinition, TraitDefinition};
use crate::validation::ValidationResult;

/// Schema of a serialized [`ComposedObject`]
pub fn composed_object_schema() -> RootSchema {
    schema_for!(ComposedObject)
}

/// Schema of a serialized [`ValidationResult`]
pub fn validation_result_schema() -> RootSchema {
    schema_for!(ValidationResult)
}

/// Schema of a [`TraitDefinition`] as the loader hands it over
pub fn trait_definition_schema() -> RootSchema {
    schema_for!(TraitDefinition)
}

/// Schema of a [`BaseObjectDefinition`]
pub fn base_object_schema() -> RootSchema {
    schema_for!(BaseObjectDefinition)
}
