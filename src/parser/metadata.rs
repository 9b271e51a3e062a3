//! Structured metadata recovered from a node definition file.

use serde::{Deserialize, Serialize};

/// How a node routes its behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStyle {
    /// Behavior driven by a declarative routing table in the descriptor.
    Declarative,
    /// Behavior implemented in imperative code.
    Programmatic,
}

/// One declared configuration field of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Human-facing label.
    pub display_name: Option<String>,

    /// Machine name of the field.
    pub name: Option<String>,

    /// Declared field type, e.g. `string`, `options`, `collection`.
    #[serde(rename = "type")]
    pub type_name: Option<String>,

    /// Whether the field is marked required.
    pub required: bool,
}

/// A credential requirement referenced by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequirement {
    /// Credential type name, e.g. `slackOAuth2Api`.
    pub name: String,

    /// Whether the credential is mandatory.
    pub required: bool,
}

/// The structured result of parsing one node definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Routing style of the node.
    pub style: NodeStyle,

    /// Stable identifier combining package and derived file name.
    pub node_type: String,

    /// Human-facing node name.
    pub display_name: Option<String>,

    /// Short description from the descriptor.
    pub description: Option<String>,

    /// Category, from the first element of the descriptor's `group` array.
    pub category: Option<String>,

    /// Declared configuration fields, in source order.
    pub properties: Vec<PropertyDescriptor>,

    /// Referenced credential requirements.
    pub credentials: Vec<CredentialRequirement>,

    /// Whether the node is marked usable as an AI tool.
    pub is_ai_tool: bool,

    /// Whether the node is a trigger (polling or trigger group).
    pub is_trigger: bool,

    /// Whether the node declares webhooks.
    pub is_webhook: bool,

    /// Whether the node declares resource/operation selection fields.
    pub has_operations: bool,

    /// Supported version(s), rendered as a string ("1" or "1, 2").
    pub version: Option<String>,

    /// Whether the descriptor declares multiple versions.
    pub is_versioned: bool,

    /// Logical package the node ships in.
    pub package: String,

    /// Documentation link, when the descriptor carries one.
    pub documentation: Option<String>,
}
