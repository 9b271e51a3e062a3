//! Configuration settings and validation.

use std::time::Duration;

use crate::{Error, Result};

/// One subtree of the remote repository to scan, together with the logical
/// package its files belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRoot {
    /// Path prefix inside the repository, e.g. `packages/nodes-base/nodes`.
    pub path: String,

    /// Logical package name tagged onto every file found under this root,
    /// e.g. `n8n-nodes-base`.
    pub package: String,
}

impl PathRoot {
    /// Create a new path root.
    #[must_use]
    pub fn new(path: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
        }
    }
}

/// Main configuration for the catalog engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Branch reference to read from.
    pub branch: String,

    /// Subtrees scanned for node definition files.
    pub node_roots: Vec<PathRoot>,

    /// Subtrees scanned for credential definition files.
    pub credential_roots: Vec<PathRoot>,

    /// Filename suffix identifying node definition files.
    pub node_suffix: String,

    /// Filename suffix identifying credential definition files.
    pub credential_suffix: String,

    /// Number of blob fetches issued concurrently per batch.
    pub batch_size: usize,

    /// Pause inserted between batches to respect API rate limits.
    pub batch_delay: Duration,

    /// Deadline for a single network call.
    pub fetch_timeout: Duration,

    /// Optional API token for authenticated (higher rate limit) access.
    pub token: Option<String>,

    /// Base URL of the hosting API. Overridable for tests.
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: "n8n-io".to_string(),
            repo: "n8n".to_string(),
            branch: "master".to_string(),
            node_roots: vec![PathRoot::new(
                "packages/nodes-base/nodes",
                "n8n-nodes-base",
            )],
            credential_roots: vec![PathRoot::new(
                "packages/nodes-base/credentials",
                "n8n-nodes-base",
            )],
            node_suffix: ".node.ts".to_string(),
            credential_suffix: ".credentials.ts".to_string(),
            batch_size: 10,
            batch_delay: Duration::from_millis(300),
            fetch_timeout: Duration::from_secs(30),
            token: None,
            api_base: "https://api.github.com".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_empty() {
            return Err(Error::config("owner cannot be empty"));
        }

        if self.repo.is_empty() {
            return Err(Error::config("repo cannot be empty"));
        }

        if self.branch.is_empty() {
            return Err(Error::config("branch cannot be empty"));
        }

        if self.batch_size == 0 {
            return Err(Error::config("batch_size cannot be 0"));
        }

        if self.batch_size > 100 {
            return Err(Error::config(
                "batch_size cannot exceed 100 (API burst limit)",
            ));
        }

        if self.node_roots.is_empty() && self.credential_roots.is_empty() {
            return Err(Error::config("at least one path root must be configured"));
        }

        for root in self.node_roots.iter().chain(&self.credential_roots) {
            if root.path.is_empty() {
                return Err(Error::config("path root cannot be empty"));
            }
            if root.package.is_empty() {
                return Err(Error::config(format!(
                    "path root '{}' has no package name",
                    root.path
                )));
            }
        }

        if self.api_base.is_empty() {
            return Err(Error::config("api_base cannot be empty"));
        }

        Ok(())
    }

    /// Base URL for repository-scoped API calls.
    #[must_use]
    pub fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.branch, "master");
        assert_eq!(config.batch_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_owner() {
        let config = Config {
            owner: String::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn test_validate_empty_repo() {
        let config = Config {
            repo: String::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("repo"));
    }

    #[test]
    fn test_validate_empty_branch() {
        let config = Config {
            branch: String::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("branch"));
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let config = Config {
            batch_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_validate_oversized_batch() {
        let config = Config {
            batch_size: 500,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_validate_no_roots() {
        let config = Config {
            node_roots: Vec::new(),
            credential_roots: Vec::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("path root"));
    }

    #[test]
    fn test_validate_root_without_package() {
        let config = Config {
            node_roots: vec![PathRoot::new("packages/nodes", "")],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("package"));
    }

    #[test]
    fn test_repo_url() {
        let config = Config {
            api_base: "https://api.github.com/".to_string(),
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            ..Default::default()
        };
        assert_eq!(config.repo_url(), "https://api.github.com/repos/acme/widgets");
    }
}
