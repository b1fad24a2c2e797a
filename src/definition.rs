// Copyright 2025 Cowboy AI, LLC.

//! # Trait and base object definitions
//!
//! A trait is a plain data record: every artifact it may contribute is an
//! independently optional field. Composition works record-by-record, there is
//! no inheritance between traits.
//!
//! These records arrive already shape-checked by the loader; this crate only
//! reasons about how they compose.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Priority given to a view extension that does not declare one
pub const DEFAULT_EXTENSION_PRIORITY: i32 = 50;

/// Field name → field specification
pub type Schema = IndexMap<String, FieldSpec>;

/// Field name → semantic mapping
pub type Semantics = IndexMap<String, SemanticMapping>;

/// Token name → token value
pub type Tokens = IndexMap<String, Value>;

/// Region name → ordered extension descriptors
pub type ViewExtensions = IndexMap<String, Vec<ViewExtension>>;

/// Action id → action descriptor
pub type Actions = IndexMap<String, ActionDescriptor>;

/// Lifecycle contract governed by a single field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineSpec {
    /// Allowed states, in declaration order
    pub states: Vec<String>,
    /// State a fresh object starts in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
    /// Allowed transitions, from-state → to-states
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub transitions: IndexMap<String, Vec<String>>,
}

impl StateMachineSpec {
    /// Create a state machine over the given states
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
            initial_state: None,
            transitions: IndexMap::new(),
        }
    }

    /// Set the initial state
    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    /// Allow a transition between two states
    pub fn with_transition(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.transitions.entry(from.into()).or_default().push(to.into());
        self
    }

    /// Check whether a state is declared
    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }
}

/// Specification of one schema field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Field type name (`string`, `number`, `enum`, ...)
    #[serde(rename = "type")]
    pub field_type: String,

    /// Whether the field must be present
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Human description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Allowed values for enumerations
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// Lifecycle contract this field governs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_machine: Option<StateMachineSpec>,

    /// Contribution knowingly replaces earlier ones
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub overrides: bool,

    /// Anything else the loader kept
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl FieldSpec {
    /// Create a field of the given type
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Restrict to enumerated values
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a lifecycle contract
    pub fn with_state_machine(mut self, machine: StateMachineSpec) -> Self {
        self.state_machine = Some(machine);
        self
    }

    /// Declare that this contribution intentionally replaces earlier ones
    pub fn overriding(mut self) -> Self {
        self.overrides = true;
        self
    }

    /// Add a free-form property
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Whether this field governs a lifecycle contract
    pub fn governs_state_machine(&self) -> bool {
        self.state_machine.is_some()
    }

    /// Structural equality, ignoring the `overrides` acknowledgement
    pub fn same_shape(&self, other: &FieldSpec) -> bool {
        self.field_type == other.field_type
            && self.required == other.required
            && self.description == other.description
            && self.default == other.default
            && self.enum_values == other.enum_values
            && self.state_machine == other.state_machine
            && self.extra == other.extra
    }
}

/// Reference from a semantic mapping into the design tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TokenMapping {
    /// A single token
    Single(String),
    /// Tokens keyed by value, e.g. lifecycle state → color token
    Keyed(IndexMap<String, String>),
}

impl TokenMapping {
    /// Every token name this mapping refers to, with its key when keyed
    pub fn references(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            TokenMapping::Single(token) => vec![(None, token.as_str())],
            TokenMapping::Keyed(map) => map
                .iter()
                .map(|(key, token)| (Some(key.as_str()), token.as_str()))
                .collect(),
        }
    }
}

/// Semantic meaning attached to a field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SemanticMapping {
    /// Semantic type, e.g. `lifecycle.status` or `contact.email`
    pub semantic_type: String,

    /// Design token(s) used to present the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_mapping: Option<TokenMapping>,

    /// Rendering hints, deep-merged across traits
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub ui_hints: IndexMap<String, Value>,
}

impl SemanticMapping {
    /// Create a mapping of the given semantic type
    pub fn new(semantic_type: impl Into<String>) -> Self {
        Self {
            semantic_type: semantic_type.into(),
            ..Default::default()
        }
    }

    /// Map onto a single token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token_mapping = Some(TokenMapping::Single(token.into()));
        self
    }

    /// Map keyed values onto tokens
    pub fn with_keyed_tokens<I, K, V>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.token_mapping = Some(TokenMapping::Keyed(
            tokens
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    /// Add a UI hint
    pub fn with_hint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.ui_hints.insert(key.into(), value);
        self
    }
}

/// A UI component slotted into a view region
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewExtension {
    /// Unique id within the composed object
    pub id: String,

    /// Component to render
    pub component: String,

    /// Sort priority, lower renders first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Id of the field, action or extension this one decorates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,

    /// Component properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub props: IndexMap<String, Value>,
}

impl ViewExtension {
    /// Create an extension rendering a component
    pub fn new(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            ..Default::default()
        }
    }

    /// Set the sort priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Point the extension at another id
    pub fn targeting(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    /// Add a component property
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// Priority used for ordering
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_EXTENSION_PRIORITY)
    }
}

/// An operation a composed object exposes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    /// Display label
    pub label: String,

    /// Intent, e.g. `primary` or `destructive`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    /// Field the action operates on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,

    /// State the action moves the object into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_to: Option<String>,

    /// Extra properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub props: IndexMap<String, Value>,
}

impl ActionDescriptor {
    /// Create an action with a label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the intent
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Declare a lifecycle transition performed on a field
    pub fn transitions(mut self, field: impl Into<String>, to: impl Into<String>) -> Self {
        self.target_field = Some(field.into());
        self.transition_to = Some(to.into());
        self
    }
}

/// A named, versioned bundle of artifact contributions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TraitDefinition {
    /// Trait name, unique within a composition
    pub name: String,

    /// Semantic version
    #[serde(default)]
    pub version: String,

    /// Names of traits this one builds on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Schema fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    /// Semantics fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<Semantics>,

    /// View extension fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_extensions: Option<ViewExtensions>,

    /// Token fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Tokens>,

    /// Action fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Actions>,
}

impl TraitDefinition {
    /// Create an empty trait
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Trait id used in ordering and provenance
    pub fn id(&self) -> &str {
        &self.name
    }

    /// Declare a dependency
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// Contribute a schema field
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.schema
            .get_or_insert_with(Schema::new)
            .insert(name.into(), spec);
        self
    }

    /// Contribute a semantic mapping
    pub fn with_semantic(mut self, field: impl Into<String>, mapping: SemanticMapping) -> Self {
        self.semantics
            .get_or_insert_with(Semantics::new)
            .insert(field.into(), mapping);
        self
    }

    /// Contribute a design token
    pub fn with_token(mut self, name: impl Into<String>, value: Value) -> Self {
        self.tokens
            .get_or_insert_with(Tokens::new)
            .insert(name.into(), value);
        self
    }

    /// Contribute a view extension to a region
    pub fn with_extension(mut self, region: impl Into<String>, extension: ViewExtension) -> Self {
        self.view_extensions
            .get_or_insert_with(ViewExtensions::new)
            .entry(region.into())
            .or_default()
            .push(extension);
        self
    }

    /// Contribute an action
    pub fn with_action(mut self, id: impl Into<String>, action: ActionDescriptor) -> Self {
        self.actions
            .get_or_insert_with(Actions::new)
            .insert(id.into(), action);
        self
    }
}

/// The object traits are composed onto; always first in composition order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseObjectDefinition {
    /// Object id, e.g. `object:User`
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Semantic version
    #[serde(default)]
    pub version: String,

    /// Own schema
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schema: Schema,

    /// Own semantics
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub semantics: Semantics,

    /// Own tokens
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tokens: Tokens,

    /// Own view extensions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub view_extensions: ViewExtensions,

    /// Own actions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub actions: Actions,
}

impl BaseObjectDefinition {
    /// Create a base object
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Seed a schema field
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.schema.insert(name.into(), spec);
        self
    }

    /// Seed a semantic mapping
    pub fn with_semantic(mut self, field: impl Into<String>, mapping: SemanticMapping) -> Self {
        self.semantics.insert(field.into(), mapping);
        self
    }

    /// Seed a design token
    pub fn with_token(mut self, name: impl Into<String>, value: Value) -> Self {
        self.tokens.insert(name.into(), value);
        self
    }

    /// Seed a view extension
    pub fn with_extension(mut self, region: impl Into<String>, extension: ViewExtension) -> Self {
        self.view_extensions
            .entry(region.into())
            .or_default()
            .push(extension);
        self
    }

    /// Seed an action
    pub fn with_action(mut self, id: impl Into<String>, action: ActionDescriptor) -> Self {
        self.actions.insert(id.into(), action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trait_definition_deserializes_with_optional_fragments() {
        let raw = json!({
            "name": "Stateful",
            "version": "1.0.0",
            "schema": {
                "status": {
                    "type": "enum",
                    "enum": ["draft", "active"],
                    "stateMachine": { "states": ["draft", "active"], "initialState": "draft" }
                }
            }
        });

        let def: TraitDefinition = serde_json::from_value(raw).unwrap();
        assert_eq!(def.id(), "Stateful");
        assert!(def.depends_on.is_empty());
        assert!(def.semantics.is_none());
        assert!(def.tokens.is_none());

        let status = &def.schema.as_ref().unwrap()["status"];
        assert!(status.governs_state_machine());
        assert_eq!(
            status.state_machine.as_ref().unwrap().initial_state.as_deref(),
            Some("draft")
        );
    }

    #[test]
    fn field_spec_extra_properties_are_kept() {
        let raw = json!({ "type": "string", "format": "email", "maxLength": 120 });
        let spec: FieldSpec = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(spec.field_type, "string");
        assert_eq!(spec.extra.get("format"), Some(&json!("email")));
        assert_eq!(serde_json::to_value(&spec).unwrap(), raw);
    }

    #[test]
    fn same_shape_ignores_override_flag() {
        let a = FieldSpec::new("string").required();
        let b = FieldSpec::new("string").required().overriding();
        let c = FieldSpec::new("number").required();
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
        assert_ne!(a, b);
    }

    #[test]
    fn token_mapping_accepts_single_or_keyed() {
        let single: TokenMapping = serde_json::from_value(json!("color.neutral")).unwrap();
        assert_eq!(single.references(), vec![(None, "color.neutral")]);

        let keyed: TokenMapping =
            serde_json::from_value(json!({ "draft": "color.muted", "active": "color.success" }))
                .unwrap();
        assert_eq!(
            keyed.references(),
            vec![
                (Some("draft"), "color.muted"),
                (Some("active"), "color.success")
            ]
        );
    }

    #[test]
    fn extension_priority_defaults() {
        let ext = ViewExtension::new("badge", "StatusBadge");
        assert_eq!(ext.effective_priority(), DEFAULT_EXTENSION_PRIORITY);
        assert_eq!(ext.with_priority(10).effective_priority(), 10);
    }
}
