//! Descriptor extraction from TypeScript node definition sources.
//!
//! Node definitions encode their metadata implicitly, as the object-literal
//! initializer of a `description` class field:
//!
//! ```typescript
//! export class Slack implements INodeType {
//!     description: INodeTypeDescription = {
//!         displayName: 'Slack',
//!         group: ['output'],
//!         version: 1,
//!         ...
//!     };
//! }
//! ```
//!
//! [`parse_node_source`] recovers that object and maps it onto
//! [`NodeMetadata`]. A file with no such descriptor yields `Ok(None)` —
//! absence of metadata is a normal outcome, not an error.

use tree_sitter::Node;

use super::metadata::{CredentialRequirement, NodeMetadata, NodeStyle, PropertyDescriptor};
use super::value::LiteralValue;
use crate::error::ParserError;
use crate::remote::RemoteFile;
use crate::Result;

/// Compute the stable node type identifier for a file.
///
/// Deterministic in `(package, name)`: package, a dot, and the derived
/// name with its first character lowercased.
#[must_use]
pub fn node_type(package: &str, name: &str) -> String {
    let mut chars = name.chars();
    let lowered = chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().collect::<String>() + chars.as_str()
    });
    format!("{package}.{lowered}")
}

/// Parse one fetched file and extract its descriptor metadata.
///
/// Pure and deterministic: reads nothing but `file`, touches no shared
/// state.
///
/// # Errors
///
/// Returns an error only if the grammar cannot be loaded or tree-sitter
/// fails to produce a tree. "No descriptor found" is `Ok(None)`.
pub fn parse_node_source(file: &RemoteFile) -> Result<Option<NodeMetadata>> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        .map_err(|e| ParserError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(file.content.as_bytes(), None)
        .ok_or_else(|| ParserError::TreeBuild {
            path: file.path.clone(),
        })?;

    let Some(descriptor) = find_descriptor(tree.root_node(), &file.content) else {
        tracing::debug!(path = %file.path, "No descriptor object found");
        return Ok(None);
    };

    Ok(Some(map_descriptor(&descriptor, file)))
}

/// Walk the tree for a class declaration carrying a `description` field
/// with an object-literal initializer, and extract that object.
fn find_descriptor(root: Node<'_>, source: &str) -> Option<LiteralValue> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "class_declaration" {
            if let Some(descriptor) = class_descriptor(node, source) {
                return Some(descriptor);
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    None
}

/// Extract the `description` field's object literal from one class.
fn class_descriptor(class: Node<'_>, source: &str) -> Option<LiteralValue> {
    let body = class.child_by_field_name("body")?;
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() != "public_field_definition" {
            continue;
        }
        let Some(name) = member.child_by_field_name("name") else {
            continue;
        };
        if name.utf8_text(source.as_bytes()).unwrap_or("") != "description" {
            continue;
        }
        let Some(value) = member.child_by_field_name("value") else {
            continue;
        };
        let extracted = LiteralValue::extract(value, source);
        if matches!(extracted, LiteralValue::Object(_)) {
            return Some(extracted);
        }
    }
    None
}

/// Map an extracted descriptor object onto the metadata schema.
fn map_descriptor(descriptor: &LiteralValue, file: &RemoteFile) -> NodeMetadata {
    let display_name = descriptor
        .get("displayName")
        .and_then(LiteralValue::as_str)
        .map(String::from);
    let description = descriptor
        .get("description")
        .and_then(LiteralValue::as_str)
        .map(String::from);
    let documentation = descriptor
        .get("documentationUrl")
        .and_then(LiteralValue::as_str)
        .map(String::from);

    let group: Vec<String> = descriptor
        .get("group")
        .and_then(LiteralValue::as_array)
        .map(|elements| {
            elements
                .iter()
                .filter_map(|e| e.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    let category = group.first().cloned();

    let (version, is_versioned) = render_version(descriptor.get("version"));

    let properties = descriptor
        .get("properties")
        .and_then(LiteralValue::as_array)
        .map(extract_properties)
        .unwrap_or_default();

    let credentials = descriptor
        .get("credentials")
        .and_then(LiteralValue::as_array)
        .map(extract_credentials)
        .unwrap_or_default();

    let has_routing = properties_have_routing(descriptor)
        || descriptor.get("requestDefaults").is_some();
    let style = if has_routing {
        NodeStyle::Declarative
    } else {
        NodeStyle::Programmatic
    };

    let is_trigger = descriptor
        .get("polling")
        .and_then(LiteralValue::as_bool)
        .unwrap_or(false)
        || group.iter().any(|g| g.eq_ignore_ascii_case("trigger"));
    let is_webhook = descriptor.get("webhooks").is_some();
    let is_ai_tool = descriptor
        .get("usableAsTool")
        .and_then(LiteralValue::as_bool)
        .unwrap_or(false);
    let has_operations = properties.iter().any(|p| {
        p.name
            .as_deref()
            .is_some_and(|n| n == "operation" || n == "resource")
    });

    NodeMetadata {
        style,
        node_type: node_type(&file.package, &file.name),
        display_name,
        description,
        category,
        properties,
        credentials,
        is_ai_tool,
        is_trigger,
        is_webhook,
        has_operations,
        version,
        is_versioned,
        package: file.package.clone(),
        documentation,
    }
}

/// Render the `version` key: a number renders plain, an array of numbers
/// joins with ", " and marks the node versioned.
fn render_version(value: Option<&LiteralValue>) -> (Option<String>, bool) {
    match value {
        Some(LiteralValue::Num(n)) => (Some(format_number(*n)), false),
        Some(LiteralValue::Array(elements)) => {
            let versions: Vec<String> = elements
                .iter()
                .filter_map(LiteralValue::as_num)
                .map(format_number)
                .collect();
            if versions.is_empty() {
                (None, false)
            } else {
                let multiple = versions.len() > 1;
                (Some(versions.join(", ")), multiple)
            }
        }
        _ => (None, false),
    }
}

/// Shortest decimal rendering: 1.0 → "1", 1.1 → "1.1".
fn format_number(n: f64) -> String {
    if (n.fract()).abs() < f64::EPSILON {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

fn extract_properties(elements: &[LiteralValue]) -> Vec<PropertyDescriptor> {
    elements
        .iter()
        .filter(|e| matches!(e, LiteralValue::Object(_)))
        .map(|property| PropertyDescriptor {
            display_name: property
                .get("displayName")
                .and_then(LiteralValue::as_str)
                .map(String::from),
            name: property
                .get("name")
                .and_then(LiteralValue::as_str)
                .map(String::from),
            type_name: property
                .get("type")
                .and_then(LiteralValue::as_str)
                .map(String::from),
            required: property
                .get("required")
                .and_then(LiteralValue::as_bool)
                .unwrap_or(false),
        })
        .collect()
}

fn extract_credentials(elements: &[LiteralValue]) -> Vec<CredentialRequirement> {
    elements
        .iter()
        .filter_map(|credential| {
            let name = credential.get("name").and_then(LiteralValue::as_str)?;
            Some(CredentialRequirement {
                name: name.to_string(),
                required: credential
                    .get("required")
                    .and_then(LiteralValue::as_bool)
                    .unwrap_or(false),
            })
        })
        .collect()
}

/// Whether any property object carries a `routing` key.
fn properties_have_routing(descriptor: &LiteralValue) -> bool {
    descriptor
        .get("properties")
        .and_then(LiteralValue::as_array)
        .is_some_and(|elements| {
            elements
                .iter()
                .any(|property| property.get("routing").is_some())
        })
}
