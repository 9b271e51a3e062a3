//! Plain-data query results served by the catalog.
//!
//! Serialization to a wire format is the caller's concern; these are just
//! serde-friendly records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::NodeMetadata;

/// Cap on the raw source returned by a detail lookup, in characters.
pub const MAX_SOURCE_CHARS: usize = 10_000;

/// Marker appended when a detail lookup truncates the source.
pub(crate) const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Lightweight node summary returned by search and listing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Derived short identifier (file stem).
    pub name: String,

    /// Human-facing name from the descriptor.
    pub display_name: Option<String>,

    /// Short description from the descriptor.
    pub description: Option<String>,

    /// Parsed category.
    pub category: Option<String>,

    /// Logical package.
    pub package: String,

    /// Stable node type identifier.
    pub node_type: String,

    /// Trigger flag.
    pub is_trigger: bool,

    /// Webhook flag.
    pub is_webhook: bool,

    /// AI-tool flag.
    pub is_ai_tool: bool,

    /// Supported version(s).
    pub version: Option<String>,
}

impl NodeSummary {
    /// Build a summary from a file's derived name and parsed metadata.
    #[must_use]
    pub fn from_metadata(name: &str, metadata: &NodeMetadata) -> Self {
        Self {
            name: name.to_string(),
            display_name: metadata.display_name.clone(),
            description: metadata.description.clone(),
            category: metadata.category.clone(),
            package: metadata.package.clone(),
            node_type: metadata.node_type.clone(),
            is_trigger: metadata.is_trigger,
            is_webhook: metadata.is_webhook,
            is_ai_tool: metadata.is_ai_tool,
            version: metadata.version.clone(),
        }
    }
}

/// Full detail record for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetails {
    /// Derived short identifier.
    pub name: String,

    /// Repository path of the definition file.
    pub path: String,

    /// Content-addressed revision key of the file.
    pub sha: String,

    /// Full parsed metadata.
    pub metadata: NodeMetadata,

    /// Credential definition names plausibly related to this node.
    ///
    /// Best-effort name-overlap hint, not a guaranteed relationship: a
    /// credential is listed when its derived name contains the node's
    /// name or vice versa, case-insensitively.
    pub related_credentials: Vec<String>,

    /// Raw source, truncated at [`MAX_SOURCE_CHARS`] with a marker.
    pub source: String,
}

/// Diagnostic snapshot of the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    /// All cached files (nodes + credentials).
    pub total_files: usize,

    /// Cached node definition files.
    pub node_count: usize,

    /// Cached credential definition files.
    pub credential_count: usize,

    /// Node files that yielded parsed metadata.
    pub parsed_count: usize,

    /// Cached file counts per package.
    pub by_package: BTreeMap<String, usize>,

    /// Parsed node counts per category.
    pub by_category: BTreeMap<String, usize>,

    /// Repository revision observed at initialization.
    pub revision: String,

    /// When this cache generation was built.
    pub initialized_at: DateTime<Utc>,

    /// Path roots whose tree listing failed during discovery.
    pub failed_roots: Vec<String>,

    /// Individual file fetches that failed during discovery.
    pub failed_files: usize,
}

/// Truncate source text for a detail response, appending a marker when
/// anything was cut.
#[must_use]
pub(crate) fn truncate_source(source: &str) -> String {
    if source.chars().count() <= MAX_SOURCE_CHARS {
        return source.to_string();
    }
    let mut truncated: String = source.chars().take(MAX_SOURCE_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
