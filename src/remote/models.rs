//! Wire and record types for remote discovery.

use serde::{Deserialize, Serialize};

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// A file.
    Blob,
    /// A directory.
    Tree,
    /// Anything else the API may report (submodule commits etc.).
    #[serde(other)]
    Other,
}

/// One entry from a recursive repository tree listing.
///
/// Transient: consumed by the discovery coordinator during filtering and
/// discarded afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root.
    pub path: String,

    /// File mode string as reported by the API.
    #[serde(default)]
    pub mode: String,

    /// Entry kind.
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Content-addressed key used to fetch the blob and detect changes.
    pub sha: String,

    /// Size in bytes; absent for trees.
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    /// Whether this entry is a file.
    #[must_use]
    pub fn is_blob(&self) -> bool {
        self.entry_type == EntryType::Blob
    }
}

/// One fetched source file, tagged with its derived identity.
///
/// Immutable once created; lives for exactly one cache generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Path relative to the repository root.
    pub path: String,

    /// Short identifier derived from the filename with the configured
    /// suffix stripped, e.g. `Slack.node.ts` → `Slack`.
    pub name: String,

    /// Raw decoded file text.
    pub content: String,

    /// Content-addressed revision key of this file.
    pub sha: String,

    /// Logical package the file belongs to, from its path root.
    pub package: String,
}

impl RemoteFile {
    /// Create a new remote file record, deriving `name` from the path.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        sha: impl Into<String>,
        package: impl Into<String>,
        suffix: &str,
    ) -> Self {
        let path = path.into();
        let name = derive_name(&path, suffix);
        Self {
            path,
            name,
            content: content.into(),
            sha: sha.into(),
            package: package.into(),
        }
    }
}

/// Derive the short identifier for a file: final path segment with the
/// recognition suffix stripped.
#[must_use]
pub fn derive_name(path: &str, suffix: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name
        .strip_suffix(suffix)
        .unwrap_or(file_name)
        .to_string()
}
