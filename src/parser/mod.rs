//! TypeScript source parsing and metadata extraction.
//!
//! This module provides:
//! - [`LiteralValue`], a tagged extractor over the literal shapes a
//!   descriptor object can contain
//! - [`parse_node_source`], which walks a file's syntax tree for the
//!   top-level class's descriptor object literal and maps it onto
//!   [`NodeMetadata`]
//!
//! Parsing is pure: same input text, same output, no I/O.

mod metadata;
mod source;
mod value;

pub use metadata::{CredentialRequirement, NodeMetadata, NodeStyle, PropertyDescriptor};
pub use source::{node_type, parse_node_source};
pub use value::LiteralValue;
