//! Batch discovery coordinator.
//!
//! Drives one recursive tree listing per configured path root, filters the
//! entries to matching definition files, and fetches their contents in
//! fixed-size concurrent batches with pacing between batches. Failures are
//! isolated at two granularities: a failed tree listing skips that root
//! only, and a failed blob fetch drops that file only.

use std::time::Duration;

use futures::future::join_all;

use super::client::RepoClient;
use super::models::{RemoteFile, TreeEntry};
use crate::config::PathRoot;
use crate::error::RemoteError;

/// Tuning knobs for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Filename suffix that identifies relevant files.
    pub suffix: String,

    /// Blob fetches issued concurrently per batch.
    pub batch_size: usize,

    /// Pause between batches.
    pub batch_delay: Duration,

    /// Deadline for a single blob fetch.
    pub fetch_timeout: Duration,
}

/// A path root whose tree listing failed.
#[derive(Debug, Clone)]
pub struct FailedRoot {
    /// The root's path prefix.
    pub path: String,

    /// Rendered failure, kept for diagnostics.
    pub reason: String,
}

/// Result of one discovery run across a set of path roots.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    /// Successfully fetched files, in tree-listing order per root.
    pub files: Vec<RemoteFile>,

    /// Roots whose tree listing failed outright.
    pub failed_roots: Vec<FailedRoot>,

    /// Count of individual blob fetches that failed or timed out.
    pub failed_files: usize,
}

impl DiscoveryOutcome {
    /// Whether every configured root failed to list.
    #[must_use]
    pub fn all_roots_failed(&self, configured: usize) -> bool {
        configured > 0 && self.failed_roots.len() == configured
    }
}

/// Discover and fetch every definition file under the given path roots.
///
/// Per root: one recursive tree call, suffix filtering, then batched blob
/// fetches. A root whose listing fails is recorded and skipped; a file
/// whose fetch fails is recorded and dropped. Never returns an error —
/// callers decide whether an empty outcome is fatal.
pub async fn discover(
    client: &dyn RepoClient,
    roots: &[PathRoot],
    options: &DiscoveryOptions,
) -> DiscoveryOutcome {
    let mut outcome = DiscoveryOutcome::default();

    for root in roots {
        let entries = match client.get_tree(&root.path).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    root = %root.path,
                    error = %e,
                    "Tree listing failed, skipping root"
                );
                outcome.failed_roots.push(FailedRoot {
                    path: root.path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let matching: Vec<TreeEntry> = entries
            .into_iter()
            .filter(|entry| entry.is_blob() && entry.path.ends_with(&options.suffix))
            .collect();

        tracing::info!(
            root = %root.path,
            matched = matching.len(),
            "Tree listed, fetching contents"
        );

        fetch_batched(client, root, &matching, options, &mut outcome).await;
    }

    tracing::info!(
        files = outcome.files.len(),
        failed_roots = outcome.failed_roots.len(),
        failed_files = outcome.failed_files,
        "Discovery run complete"
    );

    outcome
}

/// Fetch blob contents for `entries` in fixed-size concurrent batches,
/// accumulating successes into `outcome`.
async fn fetch_batched(
    client: &dyn RepoClient,
    root: &PathRoot,
    entries: &[TreeEntry],
    options: &DiscoveryOptions,
    outcome: &mut DiscoveryOutcome,
) {
    let mut batches = entries.chunks(options.batch_size.max(1)).peekable();

    while let Some(batch) = batches.next() {
        let fetches = batch.iter().map(|entry| fetch_one(client, entry, options));
        let results = join_all(fetches).await;

        for (entry, result) in batch.iter().zip(results) {
            match result {
                Ok(content) => outcome.files.push(RemoteFile::new(
                    entry.path.clone(),
                    content,
                    entry.sha.clone(),
                    root.package.clone(),
                    &options.suffix,
                )),
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path,
                        error = %e,
                        "Blob fetch failed, dropping file"
                    );
                    outcome.failed_files += 1;
                }
            }
        }

        // Pace between batches, but not after the last one.
        if batches.peek().is_some() && !options.batch_delay.is_zero() {
            tokio::time::sleep(options.batch_delay).await;
        }
    }
}

/// Fetch a single blob under the per-fetch deadline.
async fn fetch_one(
    client: &dyn RepoClient,
    entry: &TreeEntry,
    options: &DiscoveryOptions,
) -> crate::Result<String> {
    match tokio::time::timeout(options.fetch_timeout, client.get_blob(&entry.sha)).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout {
            what: entry.path.clone(),
            seconds: options.fetch_timeout.as_secs(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::remote::models::EntryType;

    fn blob(path: &str, sha: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            mode: "100644".to_string(),
            entry_type: EntryType::Blob,
            sha: sha.to_string(),
            size: Some(100),
        }
    }

    fn tree(path: &str, sha: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            mode: "040000".to_string(),
            entry_type: EntryType::Tree,
            sha: sha.to_string(),
            size: None,
        }
    }

    /// Test double with per-operation call counters and scriptable trees.
    struct StubClient {
        trees: HashMap<String, Vec<TreeEntry>>,
        blobs: HashMap<String, String>,
        failing_blobs: Vec<String>,
        tree_calls: AtomicUsize,
        blob_calls: AtomicUsize,
    }

    impl StubClient {
        fn new() -> Self {
            Self {
                trees: HashMap::new(),
                blobs: HashMap::new(),
                failing_blobs: Vec::new(),
                tree_calls: AtomicUsize::new(0),
                blob_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RepoClient for StubClient {
        async fn get_branch_head(&self) -> crate::Result<String> {
            Ok("head".to_string())
        }

        async fn get_tree(&self, path_prefix: &str) -> crate::Result<Vec<TreeEntry>> {
            self.tree_calls.fetch_add(1, Ordering::SeqCst);
            self.trees
                .get(path_prefix)
                .cloned()
                .ok_or_else(|| RemoteError::not_found(path_prefix).into())
        }

        async fn get_blob(&self, sha: &str) -> crate::Result<String> {
            self.blob_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_blobs.iter().any(|s| s == sha) {
                return Err(RemoteError::Http("connection reset".to_string()).into());
            }
            self.blobs
                .get(sha)
                .cloned()
                .ok_or_else(|| RemoteError::not_found(sha).into())
        }
    }

    fn options() -> DiscoveryOptions {
        DiscoveryOptions {
            suffix: ".node.ts".to_string(),
            batch_size: 3,
            batch_delay: Duration::ZERO,
            fetch_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_discover_filters_by_suffix_and_type() {
        let mut client = StubClient::new();
        client.trees.insert(
            "nodes".to_string(),
            vec![
                blob("nodes/Slack/Slack.node.ts", "s1"),
                blob("nodes/Slack/README.md", "s2"),
                tree("nodes/Slack", "s3"),
                blob("nodes/Http/Http.node.ts", "s4"),
            ],
        );
        client.blobs.insert("s1".to_string(), "slack src".to_string());
        client.blobs.insert("s4".to_string(), "http src".to_string());

        let roots = [PathRoot::new("nodes", "pkg")];
        let outcome = discover(&client, &roots, &options()).await;

        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.files[0].name, "Slack");
        assert_eq!(outcome.files[1].name, "Http");
        // Only matching blobs were fetched
        assert_eq!(client.blob_calls.load(Ordering::SeqCst), 2);
        // One recursive listing per root, never per directory
        assert_eq!(client.tree_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_partial_file_failure_is_isolated() {
        let mut client = StubClient::new();
        let mut entries = Vec::new();
        for i in 0..10 {
            let sha = format!("sha{i}");
            entries.push(blob(&format!("nodes/N{i}/N{i}.node.ts"), &sha));
            client.blobs.insert(sha, format!("src {i}"));
        }
        client.failing_blobs.push("sha4".to_string());
        client.trees.insert("nodes".to_string(), entries);

        let roots = [PathRoot::new("nodes", "pkg")];
        let outcome = discover(&client, &roots, &options()).await;

        assert_eq!(outcome.files.len(), 9);
        assert_eq!(outcome.failed_files, 1);
        assert!(outcome.failed_roots.is_empty());
        assert!(!outcome.files.iter().any(|f| f.sha == "sha4"));
    }

    #[tokio::test]
    async fn test_failed_root_does_not_stop_others() {
        let mut client = StubClient::new();
        client.trees.insert(
            "good".to_string(),
            vec![blob("good/A/A.node.ts", "a1")],
        );
        client.blobs.insert("a1".to_string(), "a src".to_string());

        let roots = [PathRoot::new("missing", "p1"), PathRoot::new("good", "p2")];
        let outcome = discover(&client, &roots, &options()).await;

        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.failed_roots.len(), 1);
        assert_eq!(outcome.failed_roots[0].path, "missing");
        assert!(!outcome.all_roots_failed(roots.len()));
    }

    #[tokio::test]
    async fn test_all_roots_failed() {
        let client = StubClient::new();
        let roots = [PathRoot::new("a", "p"), PathRoot::new("b", "p")];
        let outcome = discover(&client, &roots, &options()).await;

        assert!(outcome.files.is_empty());
        assert!(outcome.all_roots_failed(roots.len()));
    }

    #[tokio::test]
    async fn test_result_order_follows_tree_listing() {
        let mut client = StubClient::new();
        let mut entries = Vec::new();
        for i in 0..7 {
            let sha = format!("o{i}");
            entries.push(blob(&format!("nodes/X{i}/X{i}.node.ts"), &sha));
            client.blobs.insert(sha, String::new());
        }
        client.trees.insert("nodes".to_string(), entries);

        let roots = [PathRoot::new("nodes", "pkg")];
        // batch_size 3 splits this into 3 batches; order must still hold
        let outcome = discover(&client, &roots, &options()).await;

        let names: Vec<&str> = outcome.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["X0", "X1", "X2", "X3", "X4", "X5", "X6"]);
    }
}
