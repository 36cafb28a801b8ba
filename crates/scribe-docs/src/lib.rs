//! # Scribe Docs
//!
//! Route-driven OpenAPI document generation.
//!
//! This crate provides:
//! - **Route registry** collecting metadata fragments per path and method
//! - **Fragment merging** with `ALL`-method inheritance and parameter
//!   deduplication
//! - **Validator resolvers** that render request and response schemas through
//!   the shared [`scribe_schema`] converter
//! - **Document assembly** with path filters, memoization, and per-request
//!   hiding
//!
//! ## Quick Start
//!
//! ```rust
//! use scribe_docs::{response, validator, DocumentBuilder, HttpMethod, ValidationTarget};
//! use scribe_schema::NodeKind;
//!
//! # tokio_test::block_on(async {
//! let mut docs = DocumentBuilder::new()
//!     .title("Pet Store")
//!     .version("1.0.0")
//!     .into_docs();
//!
//! let arena = docs.arena_mut();
//! let name = arena.string();
//! let pet = arena.named("Pet", NodeKind::object([("name", name)]));
//!
//! docs.route(HttpMethod::Post, "/pets")?
//!     .fragment(validator(ValidationTarget::Json, pet))
//!     .fragment(response("201", "Created", pet));
//!
//! let document = docs.document().await?;
//! assert!(document.schema("Pet").is_some());
//! println!("{}", document.to_json_pretty()?);
//! # Ok::<(), scribe_docs::DocsError>(())
//! # }).unwrap();
//! ```

mod error;
mod filter;
mod fragment;
mod generator;
mod method;
mod openapi;
mod path;
mod registry;
mod resolver;
mod validator;

pub use error::{DocsError, DocsResult};
pub use filter::{PathFilter, PathPattern};
pub use fragment::{merge_parameters, OperationFragment};
pub use generator::{ApiDocs, DocumentBuilder};
pub use method::HttpMethod;
pub use openapi::{
    Components, Contact, ExternalDocumentation, Header, Info, License, MediaType, OpenApi,
    Operation, Parameter, ParameterIn, ParameterOrRef, PathItem, Reference, RequestBody, Response,
    SecurityRequirement, SecurityScheme, Server, Tag, PARAMETER_REF_PREFIX,
};
pub use path::{has_wildcard, is_static_asset, normalize_path, operation_id_for, path_parameter_names};
pub use registry::{backfill_path_parameters, ConditionalHide, Hide, RouteRecord, RouteRegistry, RouteTable};
pub use resolver::{
    resolver_fn, BoxFuture, FnResolver, FragmentResolver, ResolveContext, ResolvedFragment,
};
pub use validator::{response, validator, ResponseValidator, SchemaSource, ValidationTarget, Validator};
