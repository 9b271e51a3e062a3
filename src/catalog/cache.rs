//! The metadata cache: lifecycle, single-flight init, atomic refresh.
//!
//! A cache *generation* bundles the fetched node and credential files,
//! their memoized parse results, and the repository revision observed at
//! build time. Generations are immutable: `force_refresh` builds a whole
//! new generation off to the side and swaps it in under one write lock,
//! so readers observe either the old complete state or the new one.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use super::models::CatalogStats;
use crate::config::Config;
use crate::error::CatalogError;
use crate::parser::{parse_node_source, NodeMetadata};
use crate::remote::{discover, DiscoveryOptions, FailedRoot, RemoteFile, RepoClient};
use crate::Result;

/// One immutable cache generation.
#[derive(Debug)]
pub(crate) struct CacheGeneration {
    /// Node definition files, in discovery order.
    pub node_files: Vec<RemoteFile>,

    /// Credential definition files, in discovery order.
    pub credential_files: Vec<RemoteFile>,

    /// Memoized parse results, parallel to `node_files`. `None` marks a
    /// file with no extractable descriptor.
    pub parsed: Vec<Option<NodeMetadata>>,

    /// Branch head revision at build time; empty when the head lookup
    /// failed (discovery itself still succeeded).
    pub revision: String,

    /// Build timestamp.
    pub initialized_at: DateTime<Utc>,

    /// Roots whose tree listing failed, kept for diagnostics.
    pub failed_roots: Vec<FailedRoot>,

    /// Count of individual blob fetches that failed.
    pub failed_files: usize,
}

/// Process-wide catalog of discovered definition files.
///
/// Cheaply clonable; all clones share one cache.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    client: Arc<dyn RepoClient>,
    config: Config,
    state: RwLock<Option<CacheGeneration>>,
    init_lock: Mutex<()>,
}

impl Catalog {
    /// Create a catalog over the given client and configuration.
    ///
    /// No discovery happens here; the cache fills lazily on first use.
    #[must_use]
    pub fn new(client: Arc<dyn RepoClient>, config: Config) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                client,
                config,
                state: RwLock::new(None),
                init_lock: Mutex::new(()),
            }),
        }
    }

    /// Whether a cache generation is loaded.
    pub async fn is_initialized(&self) -> bool {
        self.inner.state.read().await.is_some()
    }

    /// Initialize the cache if it is not already.
    ///
    /// Idempotent and single-flight: concurrent callers share one
    /// in-flight discovery run instead of duplicating it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DiscoveryFailed`] when every configured
    /// path root fails to list; partial failures succeed with diagnostics
    /// recorded in the generation.
    pub async fn ensure_initialized(&self) -> Result<()> {
        if self.inner.state.read().await.is_some() {
            return Ok(());
        }

        let _flight = self.inner.init_lock.lock().await;

        // A concurrent caller may have finished while we waited.
        if self.inner.state.read().await.is_some() {
            return Ok(());
        }

        tracing::info!("Initializing catalog cache");
        let generation = self.build_generation().await?;
        *self.inner.state.write().await = Some(generation);
        tracing::info!("Catalog cache initialized");
        Ok(())
    }

    /// Discard the current generation and rebuild from the remote.
    ///
    /// The new generation is built before the old one is dropped; reads
    /// during the rebuild are served from the old complete state.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`Catalog::ensure_initialized`]. On error
    /// the previous generation stays in place.
    pub async fn force_refresh(&self) -> Result<()> {
        let _flight = self.inner.init_lock.lock().await;

        tracing::info!("Refreshing catalog cache");
        let generation = self.build_generation().await?;
        *self.inner.state.write().await = Some(generation);
        tracing::info!("Catalog cache refreshed");
        Ok(())
    }

    /// Diagnostic counts over the current generation.
    ///
    /// # Errors
    ///
    /// Propagates initialization failure when the cache was empty.
    pub async fn stats(&self) -> Result<CatalogStats> {
        self.ensure_initialized().await?;
        let state = self.inner.state.read().await;
        let generation = state.as_ref().ok_or(CatalogError::NotInitialized)?;

        let mut by_package: BTreeMap<String, usize> = BTreeMap::new();
        for file in generation
            .node_files
            .iter()
            .chain(&generation.credential_files)
        {
            *by_package.entry(file.package.clone()).or_default() += 1;
        }

        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        for metadata in generation.parsed.iter().flatten() {
            let category = metadata
                .category
                .clone()
                .unwrap_or_else(|| "uncategorized".to_string());
            *by_category.entry(category).or_default() += 1;
        }

        Ok(CatalogStats {
            total_files: generation.node_files.len() + generation.credential_files.len(),
            node_count: generation.node_files.len(),
            credential_count: generation.credential_files.len(),
            parsed_count: generation.parsed.iter().flatten().count(),
            by_package,
            by_category,
            revision: generation.revision.clone(),
            initialized_at: generation.initialized_at,
            failed_roots: generation
                .failed_roots
                .iter()
                .map(|root| format!("{}: {}", root.path, root.reason))
                .collect(),
            failed_files: generation.failed_files,
        })
    }

    /// Run a closure against the current generation.
    ///
    /// The read lock is held only for the duration of the closure, so a
    /// reader always sees one complete generation.
    pub(crate) async fn with_generation<T>(
        &self,
        f: impl FnOnce(&CacheGeneration) -> T,
    ) -> Result<T> {
        self.ensure_initialized().await?;
        let state = self.inner.state.read().await;
        let generation = state.as_ref().ok_or(CatalogError::NotInitialized)?;
        Ok(f(generation))
    }

    pub(crate) fn client(&self) -> &dyn RepoClient {
        self.inner.client.as_ref()
    }

    /// Build a complete new generation: discover both file kinds, stamp
    /// the branch revision, memoize parses.
    async fn build_generation(&self) -> Result<CacheGeneration> {
        let config = &self.inner.config;
        let client = self.inner.client.as_ref();

        let node_outcome = discover(
            client,
            &config.node_roots,
            &DiscoveryOptions {
                suffix: config.node_suffix.clone(),
                batch_size: config.batch_size,
                batch_delay: config.batch_delay,
                fetch_timeout: config.fetch_timeout,
            },
        )
        .await;

        let credential_outcome = discover(
            client,
            &config.credential_roots,
            &DiscoveryOptions {
                suffix: config.credential_suffix.clone(),
                batch_size: config.batch_size,
                batch_delay: config.batch_delay,
                fetch_timeout: config.fetch_timeout,
            },
        )
        .await;

        let configured = config.node_roots.len() + config.credential_roots.len();
        let failed = node_outcome.failed_roots.len() + credential_outcome.failed_roots.len();
        if configured > 0 && failed == configured {
            let reasons: Vec<String> = node_outcome
                .failed_roots
                .iter()
                .chain(&credential_outcome.failed_roots)
                .map(|root| format!("{}: {}", root.path, root.reason))
                .collect();
            return Err(CatalogError::DiscoveryFailed(format!(
                "all {configured} path roots failed ({})",
                reasons.join("; ")
            ))
            .into());
        }

        // Head lookup failure is not fatal once files are in hand; the
        // revision stamp stays empty and change detection re-fetches.
        let revision = match client.get_branch_head().await {
            Ok(sha) => sha,
            Err(e) => {
                tracing::warn!(error = %e, "Branch head lookup failed, revision unknown");
                String::new()
            }
        };

        let parsed: Vec<Option<NodeMetadata>> = node_outcome
            .files
            .iter()
            .map(|file| match parse_node_source(file) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %file.path, error = %e, "Parse failed");
                    None
                }
            })
            .collect();

        let mut failed_roots = node_outcome.failed_roots;
        failed_roots.extend(credential_outcome.failed_roots);

        Ok(CacheGeneration {
            node_files: node_outcome.files,
            credential_files: credential_outcome.files,
            parsed,
            revision,
            initialized_at: Utc::now(),
            failed_roots,
            failed_files: node_outcome.failed_files + credential_outcome.failed_files,
        })
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("repo", &self.inner.config.repo_url())
            .finish_non_exhaustive()
    }
}
