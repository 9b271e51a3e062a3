//! Metadata cache and query layer.
//!
//! This module provides:
//! - [`Catalog`], the process-wide cache of discovered definition files
//!   with single-flight initialization and atomic generation swap
//! - Read-only query operations over the cache: search, category filter,
//!   detail lookup, stats, change detection

mod cache;
mod models;
mod query;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::Catalog;
pub use models::{CatalogStats, NodeDetails, NodeSummary, MAX_SOURCE_CHARS};
