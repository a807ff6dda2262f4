//! Schema tree for representing parsed protocol definitions.
//!
//! The tree mirrors the package structure of the parsed schema: the root
//! owns top-level namespaces, each namespace owns its child entries
//! (sub-namespaces, messages, enums), and each message owns its fields.
//! This is the output of the parsing phase and the input and output of the
//! reachability filter.
//!
//! ## References
//!
//! A field whose declared type names another definition carries a resolved
//! [`TypeRef`]: the referenced definition's name plus the name of its
//! direct parent. References are plain keys. Following one is a map lookup
//! on the root, so cyclic schemas (messages that reference each other) need
//! no shared ownership.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dotted path to a definition, e.g. `"acme.orders.Order"`.
///
/// The root is represented by an empty path (`QualifiedName::root()`).
/// Used as the `path` parameter in recursive tree walks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Creates a qualified name from a raw string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the root (empty) path.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns a child path by appending `.segment`.
    ///
    /// If this path is the root, returns just the segment (no leading `.`).
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self(segment.to_owned())
        } else {
            Self(format!("{}.{segment}", self.0))
        }
    }

    /// Returns the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved reference from a field to the definition it denotes.
///
/// `namespace` is the name of the definition's direct parent namespace,
/// which for a sub-namespace is its own short name, not its dotted path.
/// The same pair is used as the identity of a definition during
/// reachability walks.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TypeRef {
    /// Name of the parent that owns the referenced definition.
    pub namespace: String,
    /// Name of the referenced definition within its parent.
    pub name: String,
}

impl TypeRef {
    /// Constructs a reference from its components.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Root of a parsed schema.
///
/// Top-level namespaces are keyed by name and keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaRoot {
    /// All top-level namespaces, keyed by namespace name.
    pub namespaces: IndexMap<String, Namespace>,
}

impl SchemaRoot {
    /// Looks up the definition a reference points at.
    ///
    /// Only references whose parent is a top-level namespace resolve;
    /// references into sub-namespaces return `None`.
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<&Node> {
        self.namespaces
            .get(&type_ref.namespace)?
            .nested
            .get(&type_ref.name)
    }

    /// Recursively counts message and enum definitions in the whole tree.
    pub fn count_definitions(&self) -> usize {
        self.namespaces
            .values()
            .map(Namespace::count_definitions)
            .sum()
    }

    /// Calls `f(path, node)` for every entry below the top-level namespaces,
    /// parents before their children.
    ///
    /// Top-level namespaces are not themselves passed to `f`; their names
    /// appear as the first segment of every path.
    pub fn for_each_definition(
        &self,
        f: &mut impl FnMut(&QualifiedName, &Node),
    ) {
        let root = QualifiedName::root();
        for (name, namespace) in &self.namespaces {
            namespace.for_each_definition(&root.child(name), f);
        }
    }

    /// Calls `f(owner_path, field, reference)` for every field in the tree
    /// that carries a resolved reference.
    pub fn for_each_reference(
        &self,
        f: &mut impl FnMut(&QualifiedName, &Field, &TypeRef),
    ) {
        self.for_each_definition(&mut |path, node| {
            for field in node.fields() {
                if let Some(type_ref) = field.ty.resolved() {
                    f(path, field, type_ref);
                }
            }
        });
    }
}

/// A namespace (protocol package) containing definitions and
/// sub-namespaces.
///
/// Entry names are stored as map keys, not in the nodes themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    /// Child entries keyed by name, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nested: IndexMap<String, Node>,
}

impl Namespace {
    /// Recursively counts message and enum definitions in this subtree.
    pub fn count_definitions(&self) -> usize {
        count_in(&self.nested)
    }

    /// Calls `f(path, node)` for every entry in this subtree, where `path`
    /// is the dotted path of the entry itself.
    pub fn for_each_definition(
        &self,
        path: &QualifiedName,
        f: &mut impl FnMut(&QualifiedName, &Node),
    ) {
        walk(&self.nested, path, f);
    }
}

fn count_in(entries: &IndexMap<String, Node>) -> usize {
    entries
        .values()
        .map(|node| {
            let own = usize::from(!matches!(node, Node::Namespace(_)));
            own + node.nested().map_or(0, count_in)
        })
        .sum()
}

fn walk(
    entries: &IndexMap<String, Node>,
    path: &QualifiedName,
    f: &mut impl FnMut(&QualifiedName, &Node),
) {
    for (name, node) in entries {
        let child = path.child(name);
        f(&child, node);
        if let Some(nested) = node.nested() {
            walk(nested, &child, f);
        }
    }
}

/// An entry inside a namespace.
///
/// Each variant exposes only the children it can have: namespaces have
/// nested entries, messages have fields, enums have neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// A nested namespace.
    Namespace(Namespace),
    /// A message (record) type definition.
    Message(Message),
    /// An enum type definition.
    Enum(Enum),
}

impl Node {
    /// Short lowercase name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Namespace(_) => "namespace",
            Node::Message(_) => "message",
            Node::Enum(_) => "enum",
        }
    }

    /// Nested entries; only namespaces have them.
    pub fn nested(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Namespace(namespace) => Some(&namespace.nested),
            Node::Message(_) | Node::Enum(_) => None,
        }
    }

    /// Fields of a message; empty for every other kind.
    pub fn fields(&self) -> &[Field] {
        match self {
            Node::Message(message) => &message.fields,
            Node::Namespace(_) | Node::Enum(_) => &[],
        }
    }

    /// Returns the message definition if this node is one.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Node::Message(message) => Some(message),
            Node::Namespace(_) | Node::Enum(_) => None,
        }
    }
}

/// A message type definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// An enum type definition. Enums are valid reference targets but have no
/// fields, so reachability never expands them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    /// Value names mapped to their numeric values, in declaration order.
    pub values: IndexMap<String, i32>,
}

/// A named, typed member of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its message.
    pub name: String,

    /// Wire field number.
    pub number: u32,

    /// Whether the field is a repeated (list) field. Omitted when false.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub repeated: bool,

    /// The declared type, flattened into the field object as either a
    /// `"scalar"` or a `"resolved"` key.
    #[serde(flatten)]
    pub ty: FieldType,
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A primitive type such as `int32` or `string`. Needs no resolution.
    Scalar(String),
    /// A reference to another definition in the tree.
    Resolved(TypeRef),
}

impl FieldType {
    /// Returns the resolved reference, if this is not a scalar.
    pub fn resolved(&self) -> Option<&TypeRef> {
        match self {
            FieldType::Resolved(type_ref) => Some(type_ref),
            FieldType::Scalar(_) => None,
        }
    }
}
