//! Reachability walk over field references.
//!
//! Starting from the entry definitions of a [`FilterRequest`], the walk
//! follows every resolved field reference, across namespace boundaries,
//! and records each `(namespace, definition)` pair it reaches. Each message
//! is expanded at most once, so reference cycles and shared (diamond)
//! references terminate without repeated work.
//!
//! ## Algorithm
//!
//! The walk is a depth-first traversal driven by an explicit stack of
//! singleton lookups. Popping a lookup:
//! 1. Skips it if its namespace is not a top-level namespace of the root
//! 2. Ensures the namespace has an entry in the reachable set
//! 3. Fails with a schema reference error if the definition is missing
//! 4. Records the definition as reachable
//! 5. If it is a message not yet expanded, marks it expanded and pushes one
//!    lookup per resolved field, in reverse so fields are visited in order
//!
//! This visits definitions in the same order as the recursive formulation
//! while keeping stack depth independent of reference chain length.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use protoprune_schemas::{Node, SchemaRoot, TypeRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace};

use crate::error::FilterError;
use crate::request::FilterRequest;

/// Definitions required by an entry set, grouped by namespace.
///
/// A namespace can be present with an empty set: it was walked into but
/// none of its definitions were needed. Pruning keeps such a namespace and
/// empties it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReachableSet(IndexMap<String, IndexSet<String>>);

impl ReachableSet {
    /// Returns true if `namespace.name` is reachable.
    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.0
            .get(namespace)
            .is_some_and(|names| names.contains(name))
    }

    /// Returns true if the walk entered `namespace`.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.0.contains_key(namespace)
    }

    /// Reachable definition names in `namespace`, in discovery order.
    pub fn namespace(&self, namespace: &str) -> Option<&IndexSet<String>> {
        self.0.get(namespace)
    }

    /// Iterates namespaces and their reachable names in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.0.iter().map(|(ns, names)| (ns.as_str(), names))
    }

    /// Total number of reachable definitions across all namespaces.
    pub fn len(&self) -> usize {
        self.0.values().map(IndexSet::len).sum()
    }

    /// Returns true if no definition is reachable.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn enter(&mut self, namespace: &str) -> &mut IndexSet<String> {
        if !self.0.contains_key(namespace) {
            self.0.insert(namespace.to_string(), IndexSet::new());
        }
        &mut self.0[namespace]
    }
}

/// Per-invocation walk state: the reachable set under construction and the
/// marker of messages already expanded.
///
/// A single `Reachability` can [`visit`](Self::visit) several requests;
/// they share state, so a definition reachable from more than one request
/// is still expanded once. The state is never shared between independent
/// filter invocations.
///
/// # Example
///
/// ```
/// use protoprune_filter::{FilterRequest, Reachability};
/// use protoprune_schemas::SchemaRoot;
///
/// let root = SchemaRoot::default();
/// let mut walk = Reachability::new();
/// // Namespaces missing from the tree are skipped, not errors.
/// walk.visit(&root, &FilterRequest::new("acme", ["Order"])).unwrap();
/// assert!(walk.finish().is_empty());
/// ```
#[derive(Default)]
pub struct Reachability<'a> {
    reachable: ReachableSet,
    expanded: HashSet<TypeRef>,
    observer: Option<Box<dyn FnMut(&TypeRef) + 'a>>,
}

impl<'a> Reachability<'a> {
    /// Creates an empty walk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a hook called once each time a message is expanded, with
    /// the message's key.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&TypeRef) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The reachable set built so far.
    pub fn reachable(&self) -> &ReachableSet {
        &self.reachable
    }

    /// Walks everything reachable from `request`, adding it to this walk's
    /// reachable set.
    ///
    /// If `request.namespace` is not a top-level namespace of `root`, this is
    /// a no-op. The same tolerance applies to references whose parent is not
    /// a top-level namespace.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] classified as
    /// [`FilterError::is_schema_reference`] if a requested or referenced
    /// definition is missing from a namespace that exists. The walk state is
    /// left partially updated; callers abandon it.
    pub fn visit(
        &mut self,
        root: &SchemaRoot,
        request: &FilterRequest,
    ) -> Result<(), FilterError> {
        let _span = debug_span!(
            "visit",
            namespace = %request.namespace,
            types = request.type_names.len()
        )
        .entered();

        if !root.namespaces.contains_key(&request.namespace) {
            debug!(namespace = %request.namespace, "namespace not in tree, skipping");
            return Ok(());
        }
        self.reachable.enter(&request.namespace);

        let mut stack: Vec<TypeRef> = request
            .type_names
            .iter()
            .rev()
            .map(|name| TypeRef::new(request.namespace.as_str(), name.as_str()))
            .collect();

        while let Some(key) = stack.pop() {
            let Some(namespace) = root.namespaces.get(&key.namespace) else {
                trace!(%key, "reference outside top-level namespaces, skipping");
                continue;
            };
            let names = self.reachable.enter(&key.namespace);

            let Some(node) = namespace.nested.get(&key.name) else {
                return Err(FilterError::schema_reference(
                    key.namespace,
                    key.name,
                ));
            };
            names.insert(key.name.clone());

            let Node::Message(message) = node else {
                continue;
            };
            if self.expanded.contains(&key) {
                continue;
            }

            trace!(%key, fields = message.fields.len(), "expanding");
            if let Some(observer) = self.observer.as_mut() {
                observer(&key);
            }
            stack.extend(
                message
                    .fields
                    .iter()
                    .rev()
                    .filter_map(|field| field.ty.resolved())
                    .cloned(),
            );
            self.expanded.insert(key);
        }

        Ok(())
    }

    /// Consumes the walk and returns the reachable set.
    pub fn finish(self) -> ReachableSet {
        self.reachable
    }
}

/// Computes the definitions reachable from a single request.
///
/// # Errors
///
/// See [`Reachability::visit`].
pub fn compute_reachable(
    root: &SchemaRoot,
    request: &FilterRequest,
) -> Result<ReachableSet, FilterError> {
    let mut walk = Reachability::new();
    walk.visit(root, request)?;
    Ok(walk.finish())
}
