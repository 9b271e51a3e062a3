//! Error types and Result aliases for nodescout.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using nodescout's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nodescout operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote repository access error.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Source parsing error.
    #[error("parser error: {0}")]
    Parser(#[from] ParserError),

    /// Catalog cache error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors from the remote repository hosting API.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(String),

    /// Non-success status from the API.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Requested ref, tree, or blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API signalled rate limiting.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// A single fetch exceeded its deadline.
    #[error("fetch timed out after {seconds}s: {what}")]
    Timeout { what: String, seconds: u64 },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Source parser errors.
///
/// Absence of a descriptor in a source file is *not* an error; the parser
/// returns `None` for that case. This enum covers real failures only.
#[derive(Error, Debug)]
pub enum ParserError {
    /// The tree-sitter grammar could not be loaded.
    #[error("failed to load grammar: {0}")]
    Grammar(String),

    /// tree-sitter produced no tree for the input.
    #[error("failed to build syntax tree for '{path}'")]
    TreeBuild { path: String },
}

/// Catalog cache errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Every configured path root failed discovery.
    #[error("discovery failed: {0}")]
    DiscoveryFailed(String),

    /// A read was attempted against an uninitialized cache.
    #[error("catalog not initialized")]
    NotInitialized,
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl RemoteError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
