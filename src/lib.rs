//! nodescout
//!
//! Remote node catalog engine: discovers integration-node definition files
//! in a source-controlled monorepo, extracts their descriptor metadata
//! from the TypeScript AST, and serves search/detail/stats queries from a
//! process-lifetime, single-flight, atomically-refreshed in-memory cache.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod observability;
pub mod parser;
pub mod remote;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{Error, Result};
