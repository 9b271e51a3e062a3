//! Remote repository access and discovery.
//!
//! This module provides:
//! - A [`RepoClient`] trait over the hosting API (branch head, recursive
//!   tree listing, blob fetch)
//! - [`GithubClient`], the reqwest-backed production implementation
//! - The batch discovery coordinator that turns tree listings into fetched
//!   [`RemoteFile`] records with bounded fan-out and partial-failure
//!   tolerance

mod client;
mod discovery;
mod models;

pub use client::{GithubClient, RepoClient};
pub use discovery::{discover, DiscoveryOptions, DiscoveryOutcome, FailedRoot};
pub use models::{EntryType, RemoteFile, TreeEntry};
