//! Shared fixtures and proptest strategies for filter tests.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;
use protoprune_schemas::{
    Field, FieldType, Message, Namespace, Node, SchemaRoot, TypeRef,
};

use crate::request::FilterRequest;

/// Builds a flat schema from `(definition, references)` pairs.
///
/// `definition` is `"namespace.Message"`; `references` is a
/// space-separated list of `"namespace.Message"` keys, one field each. A
/// `definition` with no `.` declares an empty namespace. Namespaces appear
/// in order of first mention.
pub fn schema(defs: &[(&str, &str)]) -> SchemaRoot {
    let mut root = SchemaRoot::default();
    for &(def, refs) in defs {
        let Some((ns, name)) = def.split_once('.') else {
            root.namespaces.entry(def.to_string()).or_default();
            continue;
        };
        let fields = refs
            .split_whitespace()
            .enumerate()
            .map(|(i, target)| {
                let (target_ns, target_name) =
                    target.split_once('.').expect("reference is ns.Name");
                reference_field(i, TypeRef::new(target_ns, target_name))
            })
            .collect();
        root.namespaces
            .entry(ns.to_string())
            .or_default()
            .nested
            .insert(name.to_string(), Node::Message(Message { fields }));
    }
    root
}

fn reference_field(index: usize, target: TypeRef) -> Field {
    Field {
        name: format!("f{index}"),
        number: u32::try_from(index + 1).expect("field count fits u32"),
        repeated: false,
        ty: FieldType::Resolved(target),
    }
}

/// Transitive closure of `request` computed by naive fixpoint iteration.
///
/// Assumes every reference in `root` resolves.
pub fn brute_force_closure(
    root: &SchemaRoot,
    request: &FilterRequest,
) -> BTreeSet<TypeRef> {
    let mut closure: BTreeSet<TypeRef> = request
        .type_names
        .iter()
        .map(|name| TypeRef::new(request.namespace.as_str(), name.as_str()))
        .collect();
    loop {
        let next: BTreeSet<TypeRef> = closure
            .iter()
            .filter_map(|key| root.resolve(key))
            .flat_map(Node::fields)
            .filter_map(|field| field.ty.resolved().cloned())
            .collect();
        let before = closure.len();
        closure.extend(next);
        if closure.len() == before {
            return closure;
        }
    }
}

/// Strategy for flat schemas whose references all resolve.
///
/// Generates 1-4 namespaces of 1-5 messages each plus up to 24 random
/// reference fields between them, so cycles, diamonds and cross-namespace
/// references all occur. Each message also gets a leading scalar field.
pub fn arb_schema() -> impl Strategy<Value = SchemaRoot> {
    (vec(1..6usize, 1..5), vec((any::<Index>(), any::<Index>()), 0..24))
        .prop_map(|(sizes, edges)| {
            let keys: Vec<TypeRef> = sizes
                .iter()
                .enumerate()
                .flat_map(|(ns, &size)| {
                    (0..size).map(move |t| TypeRef::new(format!("ns{ns}"), format!("T{t}")))
                })
                .collect();

            let mut fields: IndexMap<TypeRef, Vec<Field>> = keys
                .iter()
                .map(|key| {
                    let id = Field {
                        name: "id".to_string(),
                        number: 1,
                        repeated: false,
                        ty: FieldType::Scalar("int64".to_string()),
                    };
                    (key.clone(), vec![id])
                })
                .collect();
            for (from, to) in edges {
                let target = keys[to.index(keys.len())].clone();
                let owner = &mut fields[from.index(keys.len())];
                let index = owner.len();
                owner.push(reference_field(index, target));
            }

            let mut root = SchemaRoot::default();
            for (key, fields) in fields {
                root.namespaces
                    .entry(key.namespace)
                    .or_insert_with(Namespace::default)
                    .nested
                    .insert(key.name, Node::Message(Message { fields }));
            }
            root
        })
}

/// Strategy for a flat schema together with a non-empty entry set drawn
/// from one of its namespaces.
pub fn arb_schema_with_request() -> impl Strategy<Value = (SchemaRoot, FilterRequest)> {
    (arb_schema(), any::<Index>(), vec(any::<Index>(), 1..4)).prop_map(
        |(root, ns_index, type_indices)| {
            let (ns, namespace) = root
                .namespaces
                .get_index(ns_index.index(root.namespaces.len()))
                .expect("index in range");
            let names: Vec<String> = type_indices
                .iter()
                .map(|i| {
                    let (name, _) = namespace
                        .nested
                        .get_index(i.index(namespace.nested.len()))
                        .expect("index in range");
                    name.clone()
                })
                .collect();
            let request = FilterRequest::new(ns.clone(), names);
            (root, request)
        },
    )
}
