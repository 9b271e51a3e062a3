//! Configuration management for nodescout.
//!
//! All discovery parameters (repository coordinates, path roots, suffixes,
//! batch tuning) are injected through [`Config`] rather than hard-coded, so
//! the engine can be pointed at any compatible monorepo.

mod settings;

pub use settings::{Config, PathRoot};
