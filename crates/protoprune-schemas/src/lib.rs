//! Schema definitions for the protoprune pipeline.
//!
//! This crate contains the data structures that describe a fully parsed
//! protocol schema: top-level namespaces holding message and enum
//! definitions, whose fields may reference other definitions anywhere in the
//! tree. The tree is serialized to JSON so that the parser, the reachability
//! filter, and the code emitter can run as separate processes.
//!
//! The schemas are designed to be:
//! - **Ordered**: every child collection keeps declaration order
//! - **Name-indexed**: names are map keys, unique within their parent
//! - **Acyclic in ownership**: field references are keys, never owned nodes

mod schema_tree;
#[cfg(test)]
mod testutil;

#[doc(inline)]
pub use schema_tree::*;
