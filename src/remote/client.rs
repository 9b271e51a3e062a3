//! Repository hosting API client.
//!
//! [`RepoClient`] is the engine's only network seam: the discovery
//! coordinator and the catalog cache are written against the trait, so
//! tests substitute in-process doubles with call counters.

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;

use super::models::TreeEntry;
use crate::config::Config;
use crate::error::RemoteError;
use crate::Result;

/// Access to the remote repository hosting service.
///
/// Three operation shapes, matching the hosting API one-to-one:
/// branch head lookup, one recursive tree listing, and blob fetch by
/// content key.
#[async_trait]
pub trait RepoClient: Send + Sync {
    /// Current revision identifier of the configured branch.
    async fn get_branch_head(&self) -> Result<String>;

    /// All tree entries under `path_prefix`, from a single recursive
    /// listing call. Never one request per directory level.
    async fn get_tree(&self, path_prefix: &str) -> Result<Vec<TreeEntry>>;

    /// Decoded text of the blob with the given content key.
    async fn get_blob(&self, sha: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

/// GitHub REST API implementation of [`RepoClient`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    repo_url: String,
    branch: String,
    token: Option<String>,
    timeout_secs: u64,
}

impl GithubClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nodescout/", env!("CARGO_PKG_VERSION")))
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        Ok(Self {
            http,
            repo_url: config.repo_url(),
            branch: config.branch.clone(),
            token: config.token.clone(),
            timeout_secs: config.fetch_timeout.as_secs(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout {
                    what: url.to_string(),
                    seconds: self.timeout_secs,
                }
            } else {
                RemoteError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), url).into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()).into())
    }
}

/// Map a non-success HTTP status onto the remote error taxonomy.
fn status_error(status: u16, url: &str) -> RemoteError {
    match status {
        404 => RemoteError::not_found(url),
        403 | 429 => RemoteError::RateLimited(url.to_string()),
        _ => RemoteError::Status {
            status,
            url: url.to_string(),
        },
    }
}

#[async_trait]
impl RepoClient for GithubClient {
    async fn get_branch_head(&self) -> Result<String> {
        let url = format!("{}/branches/{}", self.repo_url, self.branch);
        let branch: BranchResponse = self.get_json(&url).await?;
        Ok(branch.commit.sha)
    }

    async fn get_tree(&self, path_prefix: &str) -> Result<Vec<TreeEntry>> {
        let url = format!(
            "{}/git/trees/{}?recursive=1",
            self.repo_url, self.branch
        );
        let listing: TreeResponse = self.get_json(&url).await?;

        if listing.truncated {
            tracing::warn!(
                prefix = %path_prefix,
                "Tree listing truncated by the API; discovery may be incomplete"
            );
        }

        Ok(listing
            .tree
            .into_iter()
            .filter(|entry| entry.path.starts_with(path_prefix))
            .collect())
    }

    async fn get_blob(&self, sha: &str) -> Result<String> {
        let url = format!("{}/git/blobs/{}", self.repo_url, sha);
        let blob: BlobResponse = self.get_json(&url).await?;

        if blob.encoding != "base64" {
            return Err(RemoteError::Decode(format!(
                "unexpected blob encoding '{}' for {sha}",
                blob.encoding
            ))
            .into());
        }

        decode_blob(&blob.content).map_err(Into::into)
    }
}

/// Decode a base64 blob body. The API wraps the payload in newlines.
fn decode_blob(content: &str) -> std::result::Result<String, RemoteError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| RemoteError::Decode(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| RemoteError::Decode(format!("invalid utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_blob() {
        // "export class Slack {}" base64-encoded with a line wrap
        let encoded = "ZXhwb3J0IGNsYXNz\nIFNsYWNrIHt9\n";
        assert_eq!(decode_blob(encoded).unwrap(), "export class Slack {}");
    }

    #[test]
    fn test_decode_blob_invalid() {
        let err = decode_blob("!!!not-base64!!!").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(404, "u"),
            RemoteError::NotFound(_)
        ));
        assert!(matches!(
            status_error(403, "u"),
            RemoteError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(429, "u"),
            RemoteError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(500, "u"),
            RemoteError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_client_from_config() {
        let config = Config::default();
        let client = GithubClient::new(&config).unwrap();
        assert_eq!(client.repo_url, "https://api.github.com/repos/n8n-io/n8n");
        assert_eq!(client.branch, "master");
    }

    #[test]
    fn test_tree_response_deserialization() {
        let listing: TreeResponse = serde_json::from_value(serde_json::json!({
            "sha": "root",
            "tree": [
                {"path": "a.ts", "mode": "100644", "type": "blob", "sha": "s1", "size": 10},
                {"path": "dir", "mode": "040000", "type": "tree", "sha": "s2"}
            ],
            "truncated": false
        }))
        .unwrap();
        assert_eq!(listing.tree.len(), 2);
        assert!(!listing.truncated);
    }
}
