//! In-place pruning of a schema tree to a reachable set.

use protoprune_schemas::SchemaRoot;
use tracing::debug;

use crate::reachable::ReachableSet;

/// Removes every namespace and definition not in `reachable`.
///
/// Top-level namespaces absent from `reachable` are dropped with all their
/// contents. Within each kept namespace, only entries whose names are in
/// that namespace's reachable set survive; this also drops sub-namespaces.
/// Surviving entries keep their original order and are otherwise untouched.
pub fn prune_tree(root: &mut SchemaRoot, reachable: &ReachableSet) {
    let namespaces_before = root.namespaces.len();
    let definitions_before = root.count_definitions();

    root.namespaces
        .retain(|name, namespace| match reachable.namespace(name) {
            Some(kept) => {
                namespace.nested.retain(|entry, _| kept.contains(entry));
                true
            }
            None => false,
        });

    debug!(
        namespaces_before,
        namespaces_after = root.namespaces.len(),
        definitions_before,
        definitions_after = root.count_definitions(),
        "pruned schema tree"
    );
}
