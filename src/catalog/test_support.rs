//! Scriptable repository client for cache and query tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, PathRoot};
use crate::error::RemoteError;
use crate::remote::{EntryType, RepoClient, TreeEntry};
use crate::Result;

/// In-process [`RepoClient`] double with call counters and mutable
/// scripted state, so tests can change the remote between generations.
pub struct ScriptedClient {
    trees: Mutex<HashMap<String, Vec<TreeEntry>>>,
    blobs: Mutex<HashMap<String, String>>,
    failing_blobs: Mutex<HashSet<String>>,
    head: Mutex<String>,
    fail_head: Mutex<bool>,
    /// Artificial latency per blob fetch, for refresh-interleaving tests.
    pub blob_delay: Duration,
    pub tree_calls: AtomicUsize,
    pub blob_calls: AtomicUsize,
    pub head_calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            trees: Mutex::new(HashMap::new()),
            blobs: Mutex::new(HashMap::new()),
            failing_blobs: Mutex::new(HashSet::new()),
            head: Mutex::new("rev-1".to_string()),
            fail_head: Mutex::new(false),
            blob_delay: Duration::ZERO,
            tree_calls: AtomicUsize::new(0),
            blob_calls: AtomicUsize::new(0),
            head_calls: AtomicUsize::new(0),
        }
    }

    /// Register a file under `root`; its sha is derived from the path.
    pub fn add_file(&self, root: &str, file_name: &str, content: &str) {
        let path = format!("{root}/{file_name}");
        let sha = format!("sha-{path}");
        self.trees
            .lock()
            .unwrap()
            .entry(root.to_string())
            .or_default()
            .push(TreeEntry {
                path,
                mode: "100644".to_string(),
                entry_type: EntryType::Blob,
                sha: sha.clone(),
                size: Some(content.len() as u64),
            });
        self.blobs.lock().unwrap().insert(sha, content.to_string());
    }

    /// Drop everything under `root`, for simulating remote change.
    pub fn clear_root(&self, root: &str) {
        self.trees.lock().unwrap().remove(root);
    }

    pub fn fail_blob(&self, root: &str, file_name: &str) {
        let sha = format!("sha-{root}/{file_name}");
        self.failing_blobs.lock().unwrap().insert(sha);
    }

    pub fn set_head(&self, sha: &str) {
        *self.head.lock().unwrap() = sha.to_string();
    }

    pub fn fail_head_lookups(&self) {
        *self.fail_head.lock().unwrap() = true;
    }
}

#[async_trait]
impl RepoClient for ScriptedClient {
    async fn get_branch_head(&self) -> Result<String> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_head.lock().unwrap() {
            return Err(RemoteError::Http("head lookup refused".to_string()).into());
        }
        Ok(self.head.lock().unwrap().clone())
    }

    async fn get_tree(&self, path_prefix: &str) -> Result<Vec<TreeEntry>> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        self.trees
            .lock()
            .unwrap()
            .get(path_prefix)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(path_prefix).into())
    }

    async fn get_blob(&self, sha: &str) -> Result<String> {
        self.blob_calls.fetch_add(1, Ordering::SeqCst);
        if !self.blob_delay.is_zero() {
            tokio::time::sleep(self.blob_delay).await;
        }
        if self.failing_blobs.lock().unwrap().contains(sha) {
            return Err(RemoteError::Http("connection reset".to_string()).into());
        }
        self.blobs
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(sha).into())
    }
}

/// A config pointing at the scripted client's conventional roots, with
/// pacing disabled so tests run fast.
pub fn test_config() -> Config {
    Config {
        node_roots: vec![PathRoot::new("nodes", "test-nodes")],
        credential_roots: vec![PathRoot::new("credentials", "test-nodes")],
        batch_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// Minimal node definition source with the given display name and group.
pub fn node_source(display_name: &str, group: &str) -> String {
    format!(
        r"export class {display_name} implements INodeType {{
    description: INodeTypeDescription = {{
        displayName: '{display_name}',
        name: '{lower}',
        group: ['{group}'],
        version: 1,
        description: 'The {display_name} integration',
        properties: [],
    }};
}}",
        lower = display_name.to_lowercase()
    )
}
