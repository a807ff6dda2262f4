//! Reachability filtering for parsed schema trees.
//!
//! Code generation usually needs only a handful of messages out of a large
//! schema. This crate computes the transitive closure of an entry set over
//! field references and prunes the schema tree to it, so the emitter sees
//! only the namespaces and definitions the entry set needs.
//!
//! ## Algorithm
//!
//! 1. Walk field references depth-first from the entry definitions,
//!    crossing namespace boundaries, expanding each message at most once
//! 2. Record every reached `(namespace, definition)` pair
//! 3. Drop unreached namespaces, then unreached entries of kept namespaces
//!
//! ## Usage
//!
//! ```no_run
//! use protoprune_filter::{FilterRequest, run};
//!
//! let input = std::io::stdin().lock();
//! let mut output = Vec::new();
//! let request = FilterRequest::parse("acme.orders:Order").unwrap();
//! run(input, &mut output, &[request]).unwrap();
//! ```

mod error;
mod prune;
mod reachable;
mod request;
#[cfg(test)]
mod testutil;

use std::io::{Read, Write};

use protoprune_schemas::SchemaRoot;
use serde::Serialize;
use tracing::{debug, debug_span};

#[doc(inline)]
pub use crate::error::FilterError;
use crate::error::FilterErrorKind;
pub use crate::prune::prune_tree;
pub use crate::reachable::{Reachability, ReachableSet, compute_reachable};
pub use crate::request::FilterRequest;

/// Prunes `root` to the definitions reachable from `request`.
///
/// Computes the reachable set first and prunes only if that succeeds, so on
/// error the tree is left exactly as it was.
///
/// # Errors
///
/// Returns [`FilterError`] classified as [`FilterError::is_schema_reference`]
/// if a requested or referenced definition is missing from a namespace that
/// exists in `root`.
pub fn filter_message(
    root: &mut SchemaRoot,
    request: &FilterRequest,
) -> Result<ReachableSet, FilterError> {
    filter_messages(root, std::slice::from_ref(request))
}

/// Prunes `root` to the union of what every request in `requests` reaches.
///
/// All requests are walked with shared state before a single prune. A
/// request whose namespace is absent from `root` contributes nothing.
///
/// # Errors
///
/// See [`filter_message`].
pub fn filter_messages(
    root: &mut SchemaRoot,
    requests: &[FilterRequest],
) -> Result<ReachableSet, FilterError> {
    let _span = debug_span!("filter_messages", requests = requests.len()).entered();

    let mut walk = Reachability::new();
    for request in requests {
        walk.visit(root, request)?;
    }
    let reachable = walk.finish();
    debug!(
        namespaces = reachable.iter().count(),
        definitions = reachable.len(),
        "computed reachable set"
    );

    prune_tree(root, &reachable);
    Ok(reachable)
}

/// Run the filter over a serialized schema tree.
///
/// Reads a `SchemaRoot` from the input, prunes it to what `requests` reach,
/// and writes the pruned tree to output as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`FilterError`] if:
/// - Reading from input fails ([`FilterError::is_io`])
/// - The input is not a valid schema tree ([`FilterError::is_deserialization`])
/// - A requested definition is missing ([`FilterError::is_schema_reference`])
/// - Writing to output fails ([`FilterError::is_io`])
/// - JSON serialization fails ([`FilterError::is_serialization`])
pub fn run(
    input: impl Read,
    output: impl Write,
    requests: &[FilterRequest],
) -> Result<(), FilterError> {
    let _span = debug_span!("run").entered();

    let mut root = read_root(input)?;
    filter_messages(&mut root, requests)?;
    write_json(output, &root)
}

/// Run only the reachability walk over a serialized schema tree.
///
/// Writes the reachable set (namespace name to definition names) as JSON
/// instead of the pruned tree.
///
/// # Errors
///
/// Same classification as [`run`].
pub fn run_reachable(
    input: impl Read,
    output: impl Write,
    requests: &[FilterRequest],
) -> Result<(), FilterError> {
    let _span = debug_span!("run_reachable").entered();

    let root = read_root(input)?;
    let mut walk = Reachability::new();
    for request in requests {
        walk.visit(&root, request)?;
    }
    write_json(output, &walk.finish())
}

fn read_root(mut input: impl Read) -> Result<SchemaRoot, FilterError> {
    let mut json = String::new();
    input.read_to_string(&mut json)?;
    let root: SchemaRoot = serde_json::from_str(&json).map_err(|e| {
        FilterError::new(FilterErrorKind::Deserialization(e))
    })?;
    debug!(
        namespaces = root.namespaces.len(),
        definitions = root.count_definitions(),
        "loaded schema tree"
    );
    Ok(root)
}

fn write_json(
    mut output: impl Write,
    value: &impl Serialize,
) -> Result<(), FilterError> {
    serde_json::to_writer_pretty(&mut output, value)
        .map_err(|e| FilterError::new(FilterErrorKind::Serialization(e)))?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
