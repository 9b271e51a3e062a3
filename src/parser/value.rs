//! Typed extraction of literal values from syntax tree nodes.

use tree_sitter::Node;

/// A literal value recovered from a descriptor object.
///
/// `Unsupported` is an explicit outcome for shapes the extractor does not
/// handle (identifiers, call expressions, spreads, ...). It is distinct
/// from a key being absent, so callers can tell "not declared" apart from
/// "declared but not statically extractable".
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// String or template literal.
    Str(String),
    /// Numeric literal.
    Num(f64),
    /// Boolean literal.
    Bool(bool),
    /// Array literal; elements extracted recursively.
    Array(Vec<LiteralValue>),
    /// Object literal; pairs in source order.
    Object(Vec<(String, LiteralValue)>),
    /// A shape the extractor cannot evaluate statically.
    Unsupported,
}

impl LiteralValue {
    /// Extract a literal from a syntax tree node.
    ///
    /// Total over the shapes it must handle: anything unrecognized comes
    /// back as [`LiteralValue::Unsupported`], never an error.
    #[must_use]
    pub fn extract(node: Node<'_>, source: &str) -> Self {
        match node.kind() {
            "string" | "template_string" => Self::Str(string_text(node, source)),
            "number" => node_text(node, source)
                .replace('_', "")
                .parse::<f64>()
                .map_or(Self::Unsupported, Self::Num),
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            "array" => {
                let mut cursor = node.walk();
                let elements = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() != "comment")
                    .map(|child| Self::extract(child, source))
                    .collect();
                Self::Array(elements)
            }
            "object" => {
                let mut cursor = node.walk();
                let mut pairs = Vec::new();
                for member in node.named_children(&mut cursor) {
                    match member.kind() {
                        "pair" => {
                            let Some(key) = member.child_by_field_name("key") else {
                                continue;
                            };
                            let value = member
                                .child_by_field_name("value")
                                .map_or(Self::Unsupported, |v| Self::extract(v, source));
                            pairs.push((string_text(key, source), value));
                        }
                        // `{ shorthand }` — key is known, value is not static
                        "shorthand_property_identifier" => {
                            pairs.push((node_text(member, source), Self::Unsupported));
                        }
                        _ => {}
                    }
                }
                Self::Object(pairs)
            }
            // `{...} as INodeTypeDescription`, `(expr)` — unwrap and retry
            "as_expression" | "satisfies_expression" | "parenthesized_expression" => node
                .named_child(0)
                .map_or(Self::Unsupported, |inner| Self::extract(inner, source)),
            _ => Self::Unsupported,
        }
    }

    /// Look up a key in an object literal.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// The string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric payload, if this is a number.
    #[must_use]
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(elements) => Some(elements),
            _ => None,
        }
    }
}

/// Raw source text of a node.
fn node_text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// Source text of a string-ish node with surrounding quotes stripped.
/// Also used for object keys, which may be quoted or bare identifiers.
fn string_text(node: Node<'_>, source: &str) -> String {
    let text = node_text(node, source);
    let trimmed = text.trim();
    for quote in ['\'', '"', '`'] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    trimmed.to_string()
}
