//! The abstract schema node model.
//!
//! Validation-library adapters lower their own schema values into
//! [`SchemaNode`]s stored in a [`SchemaArena`]. Nodes reference each other by
//! [`NodeId`], which makes sharing and cycles explicit: using the same id twice
//! shares the node, and a cycle is built either by reserving an id and
//! defining it later or by going through a [`NodeKind::Lazy`] getter.
//!
//! ```
//! use scribe_schema::{NodeKind, SchemaArena};
//!
//! let mut arena = SchemaArena::new();
//! let category = arena.reserve();
//! let children = arena.array(category);
//! let name = arena.string();
//! arena.define(
//!     category,
//!     NodeKind::object([("name", name), ("children", children)]),
//! );
//! arena.set_name(category, "Category");
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Index of a node in a [`SchemaArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a lazy getter in a [`SchemaArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GetterId(usize);

impl GetterId {
    /// Getter index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Deferred node resolution for [`NodeKind::Lazy`].
pub type Getter = Arc<dyn Fn() -> NodeId + Send + Sync>;

/// Declared direction of a transform on a [`NodeKind::Pipe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectDirection {
    /// Always document the pre-transform shape.
    Input,
    /// Always document the post-transform shape.
    Output,
    /// Both shapes are the same; ignore the transform.
    Same,
}

/// Which side of a value a conversion is describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Values received (request bodies, parameters).
    Input,
    /// Values produced (responses).
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// Number constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberNode {
    /// Whether only integers are accepted.
    pub integer: bool,
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
}

/// String constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringNode {
    /// Regex the value must match.
    pub pattern: Option<String>,
    /// Format hint (e.g. `email`, `uuid`).
    pub format: Option<String>,
    /// Minimum length.
    pub min_length: Option<u64>,
    /// Maximum length.
    pub max_length: Option<u64>,
}

/// One kind of schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `true` / `false`.
    Boolean,
    /// Exactly `null`.
    Null,
    /// A number.
    Number(NumberNode),
    /// A string.
    String(StringNode),
    /// Exactly one value.
    Literal(Value),
    /// One of a fixed set of values.
    Enum(Vec<Value>),
    /// Homogeneous list.
    Array {
        /// Element node.
        items: NodeId,
        /// Minimum length.
        min_items: Option<u64>,
        /// Maximum length.
        max_items: Option<u64>,
    },
    /// Positional list, optionally followed by a homogeneous tail.
    Tuple {
        /// Positional element nodes.
        items: Vec<NodeId>,
        /// Node for elements past the positional ones.
        rest: Option<NodeId>,
    },
    /// Record with known keys.
    Object {
        /// Property nodes in declaration order.
        properties: IndexMap<String, NodeId>,
        /// Node for unknown keys.
        rest: Option<NodeId>,
        /// Reject unknown keys when there is no `rest`.
        closed: bool,
    },
    /// Map with constrained keys and values.
    Record {
        /// Key node.
        key: NodeId,
        /// Value node.
        value: NodeId,
    },
    /// Any of several options.
    Union {
        /// Option nodes.
        options: Vec<NodeId>,
        /// Exactly one option must match.
        exclusive: bool,
        /// Property selecting the branch.
        discriminator: Option<String>,
    },
    /// All of several options.
    Intersect(Vec<NodeId>),
    /// The wrapped node or `null`.
    Nullable(NodeId),
    /// The wrapped node, possibly absent.
    Optional {
        /// Wrapped node.
        inner: NodeId,
        /// Value used when absent.
        default: Option<Value>,
    },
    /// Node produced on demand, used for recursive schemas.
    Lazy(GetterId),
    /// A transform from `base` into `result`.
    Pipe {
        /// Pre-transform node.
        base: NodeId,
        /// Post-transform node when the representation changes.
        result: Option<NodeId>,
        /// Declared direction.
        effect: Option<EffectDirection>,
    },
    /// No constraint.
    Any,
    /// Absent value; dropped from unions.
    Undefined,
    /// An adapter-specific kind with no mapping.
    Custom(String),
}

impl NodeKind {
    /// Build an object kind from `(key, node)` pairs.
    pub fn object<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NodeId)>,
    {
        Self::Object {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            rest: None,
            closed: false,
        }
    }

    /// Build a non-exclusive union.
    pub fn union(options: impl IntoIterator<Item = NodeId>) -> Self {
        Self::Union {
            options: options.into_iter().collect(),
            exclusive: false,
            discriminator: None,
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Literal(_) => "literal",
            Self::Enum(_) => "enum",
            Self::Array { .. } => "array",
            Self::Tuple { .. } => "tuple",
            Self::Object { .. } => "object",
            Self::Record { .. } => "record",
            Self::Union { .. } => "union",
            Self::Intersect(_) => "intersect",
            Self::Nullable(_) => "nullable",
            Self::Optional { .. } => "optional",
            Self::Lazy(_) => "lazy",
            Self::Pipe { .. } => "pipe",
            Self::Any => "any",
            Self::Undefined => "undefined",
            Self::Custom(kind) => kind,
        }
    }
}

/// Registration and documentation metadata carried by a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMeta {
    /// Component name; a named node is emitted once and referenced elsewhere.
    pub name: Option<String>,
    /// Human description.
    pub description: Option<String>,
    /// Example value.
    pub example: Option<Value>,
    /// Whether the value is deprecated.
    pub deprecated: bool,
}

/// A node: its kind plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// The kind.
    pub kind: NodeKind,
    /// The metadata.
    pub meta: NodeMeta,
}

impl SchemaNode {
    /// Create an unnamed node.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            meta: NodeMeta::default(),
        }
    }

    /// Registered name, if any.
    pub fn name(&self) -> Option<&str> {
        self.meta.name.as_deref()
    }
}

/// Storage for nodes and lazy getters.
#[derive(Default, Clone)]
pub struct SchemaArena {
    nodes: Vec<Option<SchemaNode>>,
    getters: Vec<Getter>,
}

impl fmt::Debug for SchemaArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaArena")
            .field("nodes", &self.nodes)
            .field("getters", &self.getters.len())
            .finish()
    }
}

impl SchemaArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, defined or reserved.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no slots.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node.
    pub fn insert(&mut self, node: SchemaNode) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    /// Add an unnamed node of the given kind.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        self.insert(SchemaNode::new(kind))
    }

    /// Add a node registered under `name`.
    pub fn named(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.add(kind);
        self.set_name(id, name);
        id
    }

    /// Reserve an id to be defined later, so a node can refer to itself.
    pub fn reserve(&mut self) -> NodeId {
        self.nodes.push(None);
        NodeId(self.nodes.len() - 1)
    }

    /// Define (or redefine) the kind at `id`, keeping any metadata.
    pub fn define(&mut self, id: NodeId, kind: NodeKind) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            match slot {
                Some(node) => node.kind = kind,
                None => *slot = Some(SchemaNode::new(kind)),
            }
        }
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn meta_mut(&mut self, id: NodeId) -> Option<&mut NodeMeta> {
        let slot = self.nodes.get_mut(id.0)?;
        if slot.is_none() {
            *slot = Some(SchemaNode::new(NodeKind::Any));
        }
        slot.as_mut().map(|node| &mut node.meta)
    }

    /// Register `id` as a reusable component.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(meta) = self.meta_mut(id) {
            meta.name = Some(name.into());
        }
    }

    /// Attach a description.
    pub fn describe(&mut self, id: NodeId, description: impl Into<String>) {
        if let Some(meta) = self.meta_mut(id) {
            meta.description = Some(description.into());
        }
    }

    /// Attach an example value.
    pub fn set_example(&mut self, id: NodeId, example: Value) {
        if let Some(meta) = self.meta_mut(id) {
            meta.example = Some(example);
        }
    }

    /// Mark as deprecated.
    pub fn deprecate(&mut self, id: NodeId) {
        if let Some(meta) = self.meta_mut(id) {
            meta.deprecated = true;
        }
    }

    /// Register a lazy getter and return a lazy node that uses it.
    pub fn lazy<F>(&mut self, getter: F) -> NodeId
    where
        F: Fn() -> NodeId + Send + Sync + 'static,
    {
        self.getters.push(Arc::new(getter));
        let getter = GetterId(self.getters.len() - 1);
        self.add(NodeKind::Lazy(getter))
    }

    /// Look up a getter.
    pub fn getter(&self, id: GetterId) -> Option<&Getter> {
        self.getters.get(id.0)
    }

    /// Add a plain string node.
    pub fn string(&mut self) -> NodeId {
        self.add(NodeKind::String(StringNode::default()))
    }

    /// Add a string node with a pattern.
    pub fn pattern(&mut self, pattern: impl Into<String>) -> NodeId {
        self.add(NodeKind::String(StringNode {
            pattern: Some(pattern.into()),
            ..StringNode::default()
        }))
    }

    /// Add a number node.
    pub fn number(&mut self) -> NodeId {
        self.add(NodeKind::Number(NumberNode::default()))
    }

    /// Add an integer node.
    pub fn integer(&mut self) -> NodeId {
        self.add(NodeKind::Number(NumberNode {
            integer: true,
            ..NumberNode::default()
        }))
    }

    /// Add a boolean node.
    pub fn boolean(&mut self) -> NodeId {
        self.add(NodeKind::Boolean)
    }

    /// Add a literal node.
    pub fn literal(&mut self, value: impl Into<Value>) -> NodeId {
        self.add(NodeKind::Literal(value.into()))
    }

    /// Add an enum node.
    pub fn enumeration<I, V>(&mut self, values: I) -> NodeId
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add(NodeKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// Add an array node.
    pub fn array(&mut self, items: NodeId) -> NodeId {
        self.add(NodeKind::Array {
            items,
            min_items: None,
            max_items: None,
        })
    }

    /// Add an open object node.
    pub fn object<K, I>(&mut self, properties: I) -> NodeId
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NodeId)>,
    {
        self.add(NodeKind::object(properties))
    }

    /// Add an optional wrapper.
    pub fn optional(&mut self, inner: NodeId) -> NodeId {
        self.add(NodeKind::Optional {
            inner,
            default: None,
        })
    }

    /// Add a nullable wrapper.
    pub fn nullable(&mut self, inner: NodeId) -> NodeId {
        self.add(NodeKind::Nullable(inner))
    }

    /// Add a transform node.
    pub fn pipe(
        &mut self,
        base: NodeId,
        result: Option<NodeId>,
        effect: Option<EffectDirection>,
    ) -> NodeId {
        self.add(NodeKind::Pipe {
            base,
            result,
            effect,
        })
    }

    /// Follow lazy getters until a non-lazy node is reached.
    ///
    /// Used for structural inspection (optionality, discriminants); the
    /// converter resolves getters through its per-pass cache instead.
    pub fn resolve(&self, mut id: NodeId) -> Option<(NodeId, &SchemaNode)> {
        for _ in 0..=self.getters.len() {
            let node = self.get(id)?;
            match node.kind {
                NodeKind::Lazy(getter) => id = (self.getter(getter)?)(),
                _ => return Some((id, node)),
            }
        }
        None
    }

    /// Whether a property holding `id` may be omitted from its object.
    ///
    /// True for optional nodes, and for nullable nodes wrapping an optional
    /// node that carries a default.
    pub fn is_optional(&self, id: NodeId) -> bool {
        let Some((_, node)) = self.resolve(id) else {
            return false;
        };
        match &node.kind {
            NodeKind::Optional { .. } => true,
            NodeKind::Nullable(inner) => matches!(
                self.resolve(*inner).map(|(_, n)| &n.kind),
                Some(NodeKind::Optional {
                    default: Some(_),
                    ..
                })
            ),
            _ => false,
        }
    }
}
