//! # Scribe Schema
//!
//! Abstract validation-schema graphs and their conversion into OpenAPI
//! schema objects.
//!
//! Adapters for individual validation libraries lower their schema values
//! into a [`SchemaArena`]. A [`SchemaConverter`] then renders arena nodes for
//! either OpenAPI 3.0 or 3.1, collecting named nodes into reusable component
//! definitions and emitting `$ref` pointers to them.
//!
//! ## Features
//!
//! - Arena-backed node graph, so shared and cyclic schemas are explicit
//! - Versioned rendering (`nullable` for 3.0, type arrays for 3.1)
//! - Input/output views of transforms, with conflict detection on shared
//!   components
//! - Configurable failure policy (`ignore`, `warn`, `throw`)
//!
//! ## Example
//!
//! ```
//! use scribe_schema::{ConversionConfig, NodeKind, SchemaArena, SchemaConverter, Side};
//!
//! let mut arena = SchemaArena::new();
//! let tree = arena.reserve();
//! let children = arena.array(tree);
//! let label = arena.string();
//! arena.define(tree, NodeKind::object([("label", label), ("children", children)]));
//! arena.set_name(tree, "Tree");
//!
//! let config = ConversionConfig::default();
//! let mut converter = SchemaConverter::new(&arena, &config);
//! let schema = converter.convert(tree, Side::Output).unwrap();
//!
//! let children = &schema.properties["children"];
//! assert_eq!(
//!     children.items.as_ref().unwrap().reference.as_deref(),
//!     Some("#/components/schemas/Tree")
//! );
//! ```

mod adapter;
mod config;
mod convert;
mod error;
mod node;
mod registry;
mod schema;

pub use adapter::{SchemaAdapter, ValidatorSchema};
pub use config::{ConversionConfig, ErrorMode, OpenApiVersion, UnionStyle, DEFAULT_REF_PREFIX};
pub use convert::SchemaConverter;
pub use error::{SchemaError, SchemaResult};
pub use node::{
    EffectDirection, Getter, GetterId, NodeId, NodeKind, NodeMeta, NumberNode, SchemaArena,
    SchemaNode, Side, StringNode,
};
pub use registry::{ConversionContext, EffectRecord, EffectSource, RefStatus, VisitFrame, VisitState};
pub use schema::{AdditionalProperties, Discriminator, Schema, SchemaType, SchemaTypeSet};
