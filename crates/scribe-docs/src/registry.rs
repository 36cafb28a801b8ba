//! Route declarations and their merge into a path table.
//!
//! Routes are recorded in declaration order with the resolvers attached to
//! them. Building a table runs every resolver once, merges the fragments of
//! each path/method pair, and folds fragments registered against
//! [`HttpMethod::All`] into every concrete method of the same path.

use std::fmt;
use std::sync::Arc;

use http::request::Parts;
use indexmap::IndexMap;
use scribe_schema::Schema;
use scribe_telemetry::log_route_merged;

use crate::error::{DocsError, DocsResult};
use crate::fragment::OperationFragment;
use crate::method::HttpMethod;
use crate::openapi::{Operation, Parameter, ParameterIn, ParameterOrRef, PathItem};
use crate::path::{normalize_path, operation_id_for, path_parameter_names};
use crate::resolver::{FragmentResolver, ResolveContext};

/// When an operation is left out of the document.
#[derive(Clone)]
pub enum Hide {
    /// Never documented.
    Always,
    /// Hidden from requests for which the predicate holds.
    When(Arc<dyn Fn(&Parts) -> bool + Send + Sync>),
}

impl Hide {
    /// Hide per request.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&Parts) -> bool + Send + Sync + 'static,
    {
        Self::When(Arc::new(predicate))
    }

    /// Whether the operation is hidden from the request with head `parts`.
    pub fn hides(&self, parts: &Parts) -> bool {
        match self {
            Self::Always => true,
            Self::When(predicate) => predicate(parts),
        }
    }
}

impl fmt::Debug for Hide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::When(_) => f.write_str("When(..)"),
        }
    }
}

/// One declared route.
#[derive(Clone)]
pub struct RouteRecord {
    path: String,
    method: HttpMethod,
    fragments: Vec<Arc<dyn FragmentResolver>>,
    hide: Option<Hide>,
}

impl fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRecord")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("fragments", &self.fragments.len())
            .field("hide", &self.hide)
            .finish()
    }
}

impl RouteRecord {
    /// The path as declared.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The declared method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Number of attached resolvers.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// The hide setting, if any.
    pub fn hide_setting(&self) -> Option<&Hide> {
        self.hide.as_ref()
    }

    /// Attach a resolver; resolvers are merged in attachment order.
    pub fn fragment(&mut self, resolver: impl FragmentResolver + 'static) -> &mut Self {
        self.fragments.push(Arc::new(resolver));
        self
    }

    /// Attach a shared resolver.
    pub fn shared(&mut self, resolver: Arc<dyn FragmentResolver>) -> &mut Self {
        self.fragments.push(resolver);
        self
    }

    /// Set when the route is hidden.
    pub fn hide(&mut self, hide: Hide) -> &mut Self {
        self.hide = Some(hide);
        self
    }
}

/// A concrete operation hidden per request.
#[derive(Debug, Clone)]
pub struct ConditionalHide {
    /// Normalized path.
    pub path: String,
    /// Concrete method.
    pub method: HttpMethod,
    /// The predicate.
    pub hide: Hide,
}

/// The merged routes of one build.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Path table, in first-declaration order.
    pub paths: IndexMap<String, PathItem>,
    /// Components contributed by resolvers.
    pub components: IndexMap<String, Schema>,
    /// Operations hidden per request.
    pub conditional: Vec<ConditionalHide>,
}

#[derive(Default)]
struct Pending {
    fragment: OperationFragment,
    hides: Vec<Hide>,
    sources: usize,
}

impl Pending {
    fn absorb(&mut self, fragment: OperationFragment, hide: Option<&Hide>) {
        self.fragment.merge(fragment);
        self.hides.extend(hide.cloned());
        self.sources += 1;
    }
}

/// Collects route declarations.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{HttpMethod, OperationFragment, RouteRegistry};
///
/// let mut routes = RouteRegistry::new();
/// routes
///     .route(HttpMethod::Get, "/users/:id{[0-9]+}")
///     .unwrap()
///     .fragment(OperationFragment::new().summary("Get user"));
///
/// assert_eq!(routes.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: Vec<RouteRecord>,
}

impl RouteRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no route was declared.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Declared routes, in order.
    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    /// Declare a route.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::InvalidRoute`] when `path` does not start with `/`.
    pub fn route(&mut self, method: HttpMethod, path: impl Into<String>) -> DocsResult<&mut RouteRecord> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(DocsError::invalid_route(path, "path must start with '/'"));
        }
        self.routes.push(RouteRecord {
            path,
            method,
            fragments: Vec::new(),
            hide: None,
        });
        let index = self.routes.len() - 1;
        Ok(&mut self.routes[index])
    }

    /// Run every resolver and merge the results.
    ///
    /// `ALL` fragments of a path come first for each of its concrete methods,
    /// in registration order, followed by that method's own fragments. A path
    /// with only `ALL` registrations yields no operation.
    pub async fn build_table(&self, cx: &mut ResolveContext<'_>) -> DocsResult<RouteTable> {
        let mut wildcard: IndexMap<String, Pending> = IndexMap::new();
        let mut concrete: IndexMap<(String, HttpMethod), Pending> = IndexMap::new();
        let mut components = IndexMap::new();

        for route in &self.routes {
            let path = normalize_path(&route.path);
            cx.set_route(&path, route.method);

            let mut fragment = OperationFragment::new();
            for resolver in &route.fragments {
                let resolved = resolver.resolve(cx).await?;
                fragment.merge(resolved.fragment);
                components.extend(resolved.components);
            }

            let pending = if route.method.is_all() {
                wildcard.entry(path).or_default()
            } else {
                concrete.entry((path, route.method)).or_default()
            };
            pending.absorb(fragment, route.hide.as_ref());
        }

        let mut table = RouteTable {
            components,
            ..RouteTable::default()
        };

        for ((path, method), own) in concrete {
            let shared = wildcard.get(&path);
            let mut fragment = shared.map(|p| p.fragment.clone()).unwrap_or_default();
            fragment.merge(own.fragment);

            let hides = shared
                .into_iter()
                .flat_map(|p| p.hides.iter().cloned())
                .chain(own.hides);
            let mut conditional = Vec::new();
            let mut always = false;
            for hide in hides {
                match hide {
                    Hide::Always => always = true,
                    when @ Hide::When(_) => conditional.push(when),
                }
            }

            log_route_merged!(
                method,
                path,
                own.sources + shared.map_or(0, |p| p.sources)
            );
            if always {
                tracing::debug!(http.method = %method, http.path = %path, "Route hidden");
                continue;
            }

            let mut operation = fragment.into_operation(|| operation_id_for(method, &path));
            backfill_path_parameters(&mut operation, &path, cx.parameter_components());

            table.conditional.extend(conditional.into_iter().map(|hide| ConditionalHide {
                path: path.clone(),
                method,
                hide,
            }));
            table
                .paths
                .entry(path)
                .or_default()
                .set_operation(method, operation);
        }

        Ok(table)
    }
}

/// Ensure every `{name}` placeholder has a required path parameter.
///
/// A `$ref` into `shared` that resolves to a path parameter of that name
/// covers the placeholder. Otherwise a query parameter of the same name is
/// promoted, or a string parameter is synthesized.
pub fn backfill_path_parameters(
    operation: &mut Operation,
    path: &str,
    shared: &IndexMap<String, Parameter>,
) {
    for name in path_parameter_names(path) {
        let referenced = operation.parameters.iter().any(|p| match p {
            ParameterOrRef::Ref(reference) => reference
                .parameter_name()
                .and_then(|key| shared.get(key))
                .is_some_and(|param| param.name == name && param.location == ParameterIn::Path),
            ParameterOrRef::Item(_) => false,
        });
        if referenced {
            continue;
        }

        let mut promoted = false;
        for location in [ParameterIn::Path, ParameterIn::Query] {
            let existing = operation.parameters.iter_mut().find_map(|p| match p {
                ParameterOrRef::Item(param) if param.name == name && param.location == location => {
                    Some(param)
                }
                _ => None,
            });
            if let Some(param) = existing {
                param.location = ParameterIn::Path;
                param.required = true;
                promoted = true;
                break;
            }
        }
        if !promoted {
            operation.parameters.push(Parameter::path(name).into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::{Reference, Response};
    use crate::resolver::resolver_fn;
    use scribe_schema::{ConversionConfig, SchemaArena, SchemaConverter, SchemaType};

    async fn build(routes: &RouteRegistry) -> DocsResult<RouteTable> {
        let arena = SchemaArena::new();
        let config = ConversionConfig::default();
        let mut cx = ResolveContext::new(SchemaConverter::new(&arena, &config));
        routes.build_table(&mut cx).await
    }

    #[test]
    fn test_route_requires_leading_slash() {
        let mut routes = RouteRegistry::new();
        let err = routes.route(HttpMethod::Get, "users").unwrap_err();
        assert!(matches!(err, DocsError::InvalidRoute { .. }));
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn test_generated_operation_ids() {
        let mut routes = RouteRegistry::new();
        routes.route(HttpMethod::Get, "/").unwrap();
        routes.route(HttpMethod::Get, "/users/:id").unwrap();
        routes
            .route(HttpMethod::Post, "/users")
            .unwrap()
            .fragment(OperationFragment::new().operation_id("createUser"));

        let table = build(&routes).await.unwrap();
        assert_eq!(table.paths["/"].get.as_ref().unwrap().operation_id, "getIndex");
        assert_eq!(
            table.paths["/users/{id}"].get.as_ref().unwrap().operation_id,
            "getUsersById"
        );
        assert_eq!(table.paths["/users"].post.as_ref().unwrap().operation_id, "createUser");
    }

    #[tokio::test]
    async fn test_all_then_method_fragments() {
        let mut routes = RouteRegistry::new();
        routes
            .route(HttpMethod::Get, "/items")
            .unwrap()
            .fragment(OperationFragment::new().summary("List items"));
        routes.route(HttpMethod::All, "/items").unwrap().fragment(
            OperationFragment::new()
                .summary("Shared")
                .tag("items")
                .response("401", Response::new("Unauthorized")),
        );

        let table = build(&routes).await.unwrap();
        let get = table.paths["/items"].get.as_ref().unwrap();
        assert_eq!(get.summary.as_deref(), Some("List items"));
        assert_eq!(get.tags, vec!["items"]);
        assert!(get.responses.contains_key("401"));
    }

    #[tokio::test]
    async fn test_multiple_all_registrations_contribute() {
        let mut routes = RouteRegistry::new();
        routes
            .route(HttpMethod::All, "/admin/*")
            .unwrap()
            .fragment(OperationFragment::new().tag("admin"));
        routes
            .route(HttpMethod::All, "/reports")
            .unwrap()
            .fragment(OperationFragment::new().tag("reports").description("first"));
        routes
            .route(HttpMethod::All, "/reports")
            .unwrap()
            .fragment(OperationFragment::new().tag("audited").description("second"));
        routes.route(HttpMethod::Get, "/reports").unwrap();
        routes.route(HttpMethod::Delete, "/reports").unwrap();

        let table = build(&routes).await.unwrap();
        let item = &table.paths["/reports"];
        for op in [item.get.as_ref().unwrap(), item.delete.as_ref().unwrap()] {
            assert_eq!(op.tags, vec!["reports", "audited"]);
            assert_eq!(op.description.as_deref(), Some("second"));
        }
    }

    #[tokio::test]
    async fn test_all_only_path_emits_nothing() {
        let mut routes = RouteRegistry::new();
        routes
            .route(HttpMethod::All, "/api/*")
            .unwrap()
            .fragment(OperationFragment::new().tag("api"));
        routes.route(HttpMethod::Get, "/health").unwrap();

        let table = build(&routes).await.unwrap();
        assert_eq!(table.paths.len(), 1);
        assert!(table.paths.contains_key("/health"));
    }

    #[tokio::test]
    async fn test_repeated_method_registrations_merge() {
        let mut routes = RouteRegistry::new();
        routes
            .route(HttpMethod::Get, "/users")
            .unwrap()
            .fragment(OperationFragment::new().parameter(Parameter::query("page")));
        routes
            .route(HttpMethod::Get, "/users")
            .unwrap()
            .fragment(OperationFragment::new().parameter(Parameter::query("limit")));

        let table = build(&routes).await.unwrap();
        let get = table.paths["/users"].get.as_ref().unwrap();
        let keys: Vec<_> = get.parameters.iter().map(ParameterOrRef::merge_key).collect();
        assert_eq!(keys, vec!["query page", "query limit"]);
    }

    #[tokio::test]
    async fn test_path_parameters_backfilled() {
        let mut routes = RouteRegistry::new();
        routes
            .route(HttpMethod::Get, "/orgs/:org/repos/:repo{[a-z-]+}")
            .unwrap()
            .fragment(
                OperationFragment::new()
                    .parameter(Parameter::query("repo").with_schema(Schema::integer())),
            );

        let table = build(&routes).await.unwrap();
        let get = table.paths["/orgs/{org}/repos/{repo}"].get.as_ref().unwrap();
        let repo = get.parameter("repo", ParameterIn::Path).unwrap();
        assert!(repo.required);
        assert!(repo.schema.as_ref().unwrap().has_type(SchemaType::Integer));
        assert!(get.parameter("repo", ParameterIn::Query).is_none());

        let org = get.parameter("org", ParameterIn::Path).unwrap();
        assert!(org.required);
        assert!(org.schema.as_ref().unwrap().has_type(SchemaType::String));
    }

    #[tokio::test]
    async fn test_referenced_path_parameter_not_duplicated() {
        let mut shared = IndexMap::new();
        shared.insert("OrgId".to_string(), Parameter::path("org"));
        shared.insert("Page".to_string(), Parameter::query("page"));

        let mut routes = RouteRegistry::new();
        routes
            .route(HttpMethod::Get, "/orgs/:org/members/:page")
            .unwrap()
            .fragment(
                OperationFragment::new()
                    .parameter(ParameterOrRef::Ref(Reference::parameter("OrgId")))
                    .parameter(ParameterOrRef::Ref(Reference::parameter("Page"))),
            );

        let arena = SchemaArena::new();
        let config = ConversionConfig::default();
        let mut cx = ResolveContext::new(SchemaConverter::new(&arena, &config))
            .with_parameter_components(shared);
        let table = routes.build_table(&mut cx).await.unwrap();

        let get = table.paths["/orgs/{org}/members/{page}"].get.as_ref().unwrap();
        let keys: Vec<_> = get.parameters.iter().map(ParameterOrRef::merge_key).collect();
        assert_eq!(
            keys,
            vec![
                "#/components/parameters/OrgId",
                "#/components/parameters/Page",
                "path page",
            ]
        );
        assert!(get.parameter("org", ParameterIn::Path).is_none());
    }

    #[test]
    fn test_unresolved_reference_still_backfilled() {
        let mut operation = OperationFragment::new()
            .parameter(ParameterOrRef::Ref(Reference::parameter("OrgId")))
            .into_operation(|| "getOrg".to_string());
        backfill_path_parameters(&mut operation, "/orgs/{org}", &IndexMap::new());
        assert!(operation.parameter("org", ParameterIn::Path).unwrap().required);
    }

    #[tokio::test]
    async fn test_hidden_routes() {
        let mut routes = RouteRegistry::new();
        routes.route(HttpMethod::Get, "/internal").unwrap().hide(Hide::Always);
        routes
            .route(HttpMethod::Get, "/beta")
            .unwrap()
            .hide(Hide::when(|parts| parts.headers.contains_key("x-public")));
        routes.route(HttpMethod::All, "/legacy").unwrap().hide(Hide::Always);
        routes.route(HttpMethod::Post, "/legacy").unwrap();

        let table = build(&routes).await.unwrap();
        assert!(!table.paths.contains_key("/internal"));
        assert!(!table.paths.contains_key("/legacy"));
        assert!(table.paths.contains_key("/beta"));
        assert_eq!(table.conditional.len(), 1);
        assert_eq!(table.conditional[0].path, "/beta");
    }

    #[tokio::test]
    async fn test_resolver_components_and_errors() {
        let mut routes = RouteRegistry::new();
        routes.route(HttpMethod::Get, "/a").unwrap().fragment(resolver_fn(|_| {
            Ok(crate::resolver::ResolvedFragment::new(OperationFragment::new())
                .component("Shared", Schema::object()))
        }));
        let table = build(&routes).await.unwrap();
        assert!(table.components.contains_key("Shared"));

        routes.route(HttpMethod::Get, "/b").unwrap().fragment(resolver_fn(|cx| {
            Err(DocsError::resolver(cx.path(), cx.method().as_str(), "boom"))
        }));
        let err = build(&routes).await.unwrap_err();
        assert_eq!(err.to_string(), "Resolver for GET /b failed: boom");
    }
}
