//! The seam between route middleware and the document builder.
//!
//! Every piece of metadata attached to a route is a [`FragmentResolver`].
//! Resolvers run once per document build, in declaration order, and may
//! render schemas through the shared converter so named components are
//! collected into one definitions map.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use indexmap::IndexMap;
use scribe_schema::{NodeId, Schema, SchemaConverter, SchemaResult, Side};

use crate::error::DocsResult;
use crate::fragment::OperationFragment;
use crate::method::HttpMethod;
use crate::openapi::{Parameter, Reference};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a resolver contributes to the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFragment {
    /// Operation metadata.
    pub fragment: OperationFragment,
    /// Component schemas the fragment refers to.
    pub components: IndexMap<String, Schema>,
}

impl ResolvedFragment {
    /// A fragment with no components.
    pub fn new(fragment: OperationFragment) -> Self {
        Self {
            fragment,
            components: IndexMap::new(),
        }
    }

    /// Add a component schema.
    #[must_use]
    pub fn component(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components.insert(name.into(), schema);
        self
    }
}

impl From<OperationFragment> for ResolvedFragment {
    fn from(fragment: OperationFragment) -> Self {
        Self::new(fragment)
    }
}

/// Per-build state handed to resolvers.
pub struct ResolveContext<'a> {
    converter: SchemaConverter<'a>,
    parameters: IndexMap<String, Parameter>,
    path: String,
    method: HttpMethod,
}

impl fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("definitions", &self.converter.definitions().len())
            .finish()
    }
}

impl<'a> ResolveContext<'a> {
    /// Wrap the converter for one build.
    pub fn new(converter: SchemaConverter<'a>) -> Self {
        Self {
            converter,
            parameters: IndexMap::new(),
            path: "/".to_string(),
            method: HttpMethod::Get,
        }
    }

    /// Make the document's shared parameters visible to resolvers.
    #[must_use]
    pub fn with_parameter_components(mut self, parameters: IndexMap<String, Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Parameters shared through `components.parameters`.
    pub fn parameter_components(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    /// The shared parameter behind `reference`.
    pub fn shared_parameter(&self, reference: &Reference) -> Option<&Parameter> {
        self.parameters.get(reference.parameter_name()?)
    }

    pub(crate) fn set_route(&mut self, path: &str, method: HttpMethod) {
        self.path.clear();
        self.path.push_str(path);
        self.method = method;
    }

    /// Normalized path of the route being resolved.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Method of the route being resolved; `ALL` for wildcard routes.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The shared converter.
    pub fn converter(&self) -> &SchemaConverter<'a> {
        &self.converter
    }

    /// The shared converter, mutably.
    pub fn converter_mut(&mut self) -> &mut SchemaConverter<'a> {
        &mut self.converter
    }

    /// Render `node` for use at `location` within the current operation.
    ///
    /// Named nodes come back as references; their definitions stay in the
    /// converter. Diagnostics are labelled `"<METHOD> <path> > <location>"`.
    pub fn convert(&mut self, node: NodeId, side: Side, location: &str) -> SchemaResult<Schema> {
        let root = format!("{} {} > {}", self.method, self.path, location);
        self.converter.convert_component(node, side, &root)
    }

    /// Look up the definition behind a `$ref` produced by this converter.
    pub fn definition_for(&self, schema: &Schema) -> Option<&Schema> {
        let reference = schema.reference.as_deref()?;
        let name = reference.strip_prefix(self.converter.config().ref_prefix.as_str())?;
        self.converter.definitions().get(name)
    }

    /// Finish the build, yielding the converter.
    pub fn into_converter(self) -> SchemaConverter<'a> {
        self.converter
    }
}

/// Produces an operation fragment for a route.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{
///     BoxFuture, DocsResult, FragmentResolver, OperationFragment, ResolveContext,
///     ResolvedFragment,
/// };
///
/// struct Deprecated;
///
/// impl FragmentResolver for Deprecated {
///     fn resolve<'c>(
///         &'c self,
///         cx: &'c mut ResolveContext<'_>,
///     ) -> BoxFuture<'c, DocsResult<ResolvedFragment>> {
///         Box::pin(async move {
///             let note = format!("{} is going away", cx.path());
///             Ok(OperationFragment::new().deprecated(true).description(note).into())
///         })
///     }
/// }
/// ```
pub trait FragmentResolver: Send + Sync {
    /// Produce this resolver's fragment for the route in `cx`.
    fn resolve<'c>(
        &'c self,
        cx: &'c mut ResolveContext<'_>,
    ) -> BoxFuture<'c, DocsResult<ResolvedFragment>>;
}

impl FragmentResolver for OperationFragment {
    fn resolve<'c>(
        &'c self,
        _cx: &'c mut ResolveContext<'_>,
    ) -> BoxFuture<'c, DocsResult<ResolvedFragment>> {
        let fragment = self.clone();
        Box::pin(async move { Ok(fragment.into()) })
    }
}

impl FragmentResolver for ResolvedFragment {
    fn resolve<'c>(
        &'c self,
        _cx: &'c mut ResolveContext<'_>,
    ) -> BoxFuture<'c, DocsResult<ResolvedFragment>> {
        let resolved = self.clone();
        Box::pin(async move { Ok(resolved) })
    }
}

/// A resolver backed by a synchronous closure. See [`resolver_fn`].
#[derive(Clone)]
pub struct FnResolver<F> {
    f: F,
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

/// Turn a closure into a resolver.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{resolver_fn, OperationFragment};
///
/// let by_path = resolver_fn(|cx| {
///     Ok(OperationFragment::new().tag(cx.path().trim_start_matches('/')).into())
/// });
/// # let _ = by_path;
/// ```
pub fn resolver_fn<F>(f: F) -> FnResolver<F>
where
    F: Fn(&mut ResolveContext<'_>) -> DocsResult<ResolvedFragment> + Send + Sync,
{
    FnResolver { f }
}

impl<F> FragmentResolver for FnResolver<F>
where
    F: Fn(&mut ResolveContext<'_>) -> DocsResult<ResolvedFragment> + Send + Sync,
{
    fn resolve<'c>(
        &'c self,
        cx: &'c mut ResolveContext<'_>,
    ) -> BoxFuture<'c, DocsResult<ResolvedFragment>> {
        let result = (self.f)(cx);
        Box::pin(async move { result })
    }
}
