//! Read-only query operations over the catalog cache.
//!
//! Every operation (except change detection) first ensures the cache is
//! initialized, then serves from the current generation. Zero results and
//! unknown names render as empty lists or `None`, never as errors.

use super::cache::Catalog;
use super::models::{truncate_source, NodeDetails, NodeSummary};
use crate::Result;

impl Catalog {
    /// Case-insensitive substring search over derived name, display name,
    /// description, and category. Results keep discovery order.
    ///
    /// # Errors
    ///
    /// Propagates initialization failure when the cache was empty.
    pub async fn search(&self, query: &str) -> Result<Vec<NodeSummary>> {
        let needle = query.to_lowercase();
        self.with_generation(|generation| {
            generation
                .node_files
                .iter()
                .zip(&generation.parsed)
                .filter_map(|(file, parsed)| {
                    let metadata = parsed.as_ref()?;
                    let haystacks = [
                        Some(file.name.as_str()),
                        metadata.display_name.as_deref(),
                        metadata.description.as_deref(),
                        metadata.category.as_deref(),
                    ];
                    let hit = haystacks
                        .into_iter()
                        .flatten()
                        .any(|field| field.to_lowercase().contains(&needle));
                    hit.then(|| NodeSummary::from_metadata(&file.name, metadata))
                })
                .collect()
        })
        .await
    }

    /// Nodes whose parsed category equals `category`, case-insensitively.
    ///
    /// Exact match only: `"Core"` does not match `"Core Nodes"`. Substring
    /// category matching is available through [`Catalog::search`].
    ///
    /// # Errors
    ///
    /// Propagates initialization failure when the cache was empty.
    pub async fn get_by_category(&self, category: &str) -> Result<Vec<NodeSummary>> {
        self.with_generation(|generation| {
            generation
                .node_files
                .iter()
                .zip(&generation.parsed)
                .filter_map(|(file, parsed)| {
                    let metadata = parsed.as_ref()?;
                    let matches = metadata
                        .category
                        .as_deref()
                        .is_some_and(|c| c.eq_ignore_ascii_case(category));
                    matches.then(|| NodeSummary::from_metadata(&file.name, metadata))
                })
                .collect()
        })
        .await
    }

    /// Summaries for every cached node file with parsed metadata.
    ///
    /// Files whose source yielded no descriptor are silently excluded.
    ///
    /// # Errors
    ///
    /// Propagates initialization failure when the cache was empty.
    pub async fn list_all(&self) -> Result<Vec<NodeSummary>> {
        self.with_generation(|generation| {
            generation
                .node_files
                .iter()
                .zip(&generation.parsed)
                .filter_map(|(file, parsed)| {
                    parsed
                        .as_ref()
                        .map(|metadata| NodeSummary::from_metadata(&file.name, metadata))
                })
                .collect()
        })
        .await
    }

    /// Full detail for the node with the given derived name.
    ///
    /// Name matching is exact and case-insensitive. `Ok(None)` is the
    /// normal negative result for unknown names and for files without
    /// parsed metadata.
    ///
    /// # Errors
    ///
    /// Propagates initialization failure when the cache was empty.
    pub async fn get_details(&self, name: &str) -> Result<Option<NodeDetails>> {
        self.with_generation(|generation| {
            let (file, metadata) = generation
                .node_files
                .iter()
                .zip(&generation.parsed)
                .find(|(file, _)| file.name.eq_ignore_ascii_case(name))
                .and_then(|(file, parsed)| parsed.as_ref().map(|m| (file, m)))?;

            let node_name = file.name.to_lowercase();
            let related_credentials: Vec<String> = generation
                .credential_files
                .iter()
                .filter(|credential| {
                    let cred_name = credential.name.to_lowercase();
                    cred_name.contains(&node_name) || node_name.contains(&cred_name)
                })
                .map(|credential| credential.name.clone())
                .collect();

            Some(NodeDetails {
                name: file.name.clone(),
                path: file.path.clone(),
                sha: file.sha.clone(),
                metadata: metadata.clone(),
                related_credentials,
                source: truncate_source(&file.content),
            })
        })
        .await
    }

    /// Whether the repository head has moved past `last_known`.
    ///
    /// Polls the branch head directly; never initializes or refreshes the
    /// cache, so it can be called cheaply to decide whether a refresh is
    /// warranted. With no prior revision the answer is `true`.
    ///
    /// # Errors
    ///
    /// Propagates a branch head lookup failure.
    pub async fn has_changed(&self, last_known: Option<&str>) -> Result<bool> {
        let head = self.client().get_branch_head().await?;
        Ok(last_known.map_or(true, |previous| previous != head))
    }
}
