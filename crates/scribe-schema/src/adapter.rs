//! The seam between validation libraries and the converter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SchemaResult;
use crate::node::{NodeId, SchemaArena};
use crate::schema::Schema;

/// Lowers a validation library's schema values into arena nodes.
///
/// The converter never sees the library's own types; it only walks the
/// nodes an adapter produces.
pub trait SchemaAdapter {
    /// The library's schema type.
    type Value: ?Sized;

    /// Add `value` (and everything it references) to `arena`.
    fn to_node(&self, value: &Self::Value, arena: &mut SchemaArena) -> SchemaResult<NodeId>;
}

/// A schema an adapter has already rendered, plus the components it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorSchema {
    /// The rendered schema, usually a reference into `components`.
    pub schema: Schema,
    /// Definitions referenced by `schema`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub components: IndexMap<String, Schema>,
}

impl ValidatorSchema {
    /// Wrap a schema with no components.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            components: IndexMap::new(),
        }
    }

    /// Add a component definition.
    #[must_use]
    pub fn component(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components.insert(name.into(), schema);
        self
    }
}
