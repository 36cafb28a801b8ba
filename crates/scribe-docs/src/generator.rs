//! Document assembly and memoization.
//!
//! [`DocumentBuilder`] holds document-level metadata; [`ApiDocs`] owns the
//! schema arena and route registry and builds the document on first request.
//! The built document is cached until the number of declared routes changes.

use std::sync::Arc;

use http::request::Parts;
use indexmap::IndexMap;
use scribe_config::ScribeConfig;
use scribe_schema::{ConversionConfig, Schema, SchemaArena, SchemaConverter};
use scribe_telemetry::log_document_built;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::DocsResult;
use crate::filter::PathFilter;
use crate::method::HttpMethod;
use crate::openapi::{
    Components, Contact, ExternalDocumentation, Info, License, OpenApi, Parameter, PathItem,
    SecurityScheme, Server, Tag,
};
use crate::registry::{ConditionalHide, RouteRecord, RouteRegistry};
use crate::resolver::ResolveContext;

/// Document-level settings.
///
/// # Example
///
/// ```rust
/// use scribe_docs::DocumentBuilder;
///
/// let docs = DocumentBuilder::new()
///     .title("Pet Store")
///     .version("2.0.0")
///     .server("https://api.example.com", Some("Production".to_string()))
///     .bearer_auth("bearer")
///     .into_docs();
/// assert!(docs.routes().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    info: Info,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    external_docs: Option<ExternalDocumentation>,
    security_schemes: IndexMap<String, SecurityScheme>,
    components: IndexMap<String, Schema>,
    parameters: IndexMap<String, Parameter>,
    conversion: ConversionConfig,
    filter: PathFilter,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// Create a builder titled "API", version "1.0.0".
    #[must_use]
    pub fn new() -> Self {
        Self {
            info: Info::new("API", "1.0.0"),
            servers: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            security_schemes: IndexMap::new(),
            components: IndexMap::new(),
            parameters: IndexMap::new(),
            conversion: ConversionConfig::default(),
            filter: PathFilter::default(),
        }
    }

    /// Build from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a filter entry is invalid.
    pub fn from_config(config: &ScribeConfig) -> DocsResult<Self> {
        let mut builder = Self::new()
            .title(config.document.title.clone())
            .version(config.document.version.clone())
            .conversion(config.conversion_config())
            .filter(PathFilter::from_config(&config.filter)?);
        builder.info.description = config.document.description.clone();
        Ok(builder)
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.info.title = title.into();
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.info.version = version.into();
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Set contact information.
    #[must_use]
    pub fn contact(mut self, contact: Contact) -> Self {
        self.info.contact = Some(contact);
        self
    }

    /// Set license information.
    #[must_use]
    pub fn license(mut self, name: impl Into<String>, url: Option<String>) -> Self {
        self.info.license = Some(License {
            name: name.into(),
            url,
        });
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Declare a tag; declared tags keep their order and description.
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Set external documentation.
    #[must_use]
    pub fn external_docs(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.external_docs = Some(ExternalDocumentation {
            url: url.into(),
            description,
        });
        self
    }

    /// Add a security scheme.
    #[must_use]
    pub fn security_scheme(mut self, name: impl Into<String>, scheme: SecurityScheme) -> Self {
        self.security_schemes.insert(name.into(), scheme);
        self
    }

    /// Add a JWT bearer security scheme.
    #[must_use]
    pub fn bearer_auth(self, name: impl Into<String>) -> Self {
        self.security_scheme(name, SecurityScheme::bearer_jwt())
    }

    /// Pre-register a component schema.
    ///
    /// A definition the converter produces under the same name replaces it.
    #[must_use]
    pub fn component(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components.insert(name.into(), schema);
        self
    }

    /// Share a parameter through `components.parameters`.
    ///
    /// Operations point at it with [`Reference::parameter`](crate::Reference::parameter);
    /// such a reference satisfies the matching path placeholder.
    #[must_use]
    pub fn parameter_component(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    /// Set schema conversion settings.
    #[must_use]
    pub fn conversion(mut self, conversion: ConversionConfig) -> Self {
        self.conversion = conversion;
        self
    }

    /// Set the path filter.
    #[must_use]
    pub fn filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Create an empty [`ApiDocs`] with these settings.
    pub fn into_docs(self) -> ApiDocs {
        ApiDocs::new(self)
    }

    /// Declared tags that survive the filter, then operation tags in order of
    /// first use.
    fn collect_tags(&self, paths: &IndexMap<String, PathItem>) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .tags
            .iter()
            .filter(|tag| !self.filter.excludes_tag(&tag.name))
            .cloned()
            .collect();
        for item in paths.values() {
            for (_, operation) in item.operations() {
                for name in &operation.tags {
                    if !tags.iter().any(|tag| &tag.name == name) {
                        tags.push(Tag::new(name.clone()));
                    }
                }
            }
        }
        tags
    }

    fn assemble(
        &self,
        paths: IndexMap<String, PathItem>,
        schemas: IndexMap<String, Schema>,
    ) -> OpenApi {
        let paths = self.filter.apply(paths);
        let tags = self.collect_tags(&paths);

        let components = Components {
            schemas,
            parameters: self.parameters.clone(),
            security_schemes: self.security_schemes.clone(),
        };

        OpenApi {
            openapi: self.conversion.version.document_version().to_string(),
            info: self.info.clone(),
            servers: self.servers.clone(),
            tags,
            paths,
            components: (!components.is_empty()).then_some(components),
            external_docs: self.external_docs.clone(),
        }
    }
}

#[derive(Debug)]
struct Cached {
    route_count: usize,
    document: Arc<OpenApi>,
    conditional: Arc<Vec<ConditionalHide>>,
}

/// Routes, schemas and the memoized document built from them.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{DocumentBuilder, HttpMethod, OperationFragment};
///
/// # tokio_test::block_on(async {
/// let mut docs = DocumentBuilder::new().title("Users").into_docs();
/// docs.route(HttpMethod::Get, "/users/:id")?
///     .fragment(OperationFragment::new().summary("Get user"));
///
/// let document = docs.document().await?;
/// let get = document.operation("/users/{id}", HttpMethod::Get).unwrap();
/// assert_eq!(get.operation_id, "getUsersById");
/// # Ok::<(), scribe_docs::DocsError>(())
/// # }).unwrap();
/// ```
#[derive(Debug)]
pub struct ApiDocs {
    builder: DocumentBuilder,
    arena: SchemaArena,
    routes: RouteRegistry,
    cache: Mutex<Option<Cached>>,
}

impl ApiDocs {
    /// Create an empty registry with `builder`'s settings.
    pub fn new(builder: DocumentBuilder) -> Self {
        Self {
            builder,
            arena: SchemaArena::new(),
            routes: RouteRegistry::new(),
            cache: Mutex::new(None),
        }
    }

    /// The schema arena routes refer into.
    pub fn arena(&self) -> &SchemaArena {
        &self.arena
    }

    /// The schema arena, for adding nodes.
    pub fn arena_mut(&mut self) -> &mut SchemaArena {
        &mut self.arena
    }

    /// Declared routes.
    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    /// Declare a route. See [`RouteRegistry::route`].
    pub fn route(
        &mut self,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> DocsResult<&mut RouteRecord> {
        self.routes.route(method, path)
    }

    /// Drop the cached document.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Build a fresh document, bypassing the cache.
    pub async fn build(&self) -> DocsResult<OpenApi> {
        let (document, _) = self.build_with_hides().await?;
        Ok(document)
    }

    async fn build_with_hides(&self) -> DocsResult<(OpenApi, Vec<ConditionalHide>)> {
        let conversion = &self.builder.conversion;
        let mut cx = ResolveContext::new(SchemaConverter::new(&self.arena, conversion))
            .with_parameter_components(self.builder.parameters.clone());
        let table = self.routes.build_table(&mut cx).await?;
        let definitions = cx.into_converter().into_definitions();

        let mut schemas = self.builder.components.clone();
        schemas.extend(table.components);
        for (name, schema) in definitions {
            if schemas.get(&name).is_some_and(|existing| existing != &schema) {
                warn!(schema = %name, "converted schema replaces a pre-registered component");
            }
            schemas.insert(name, schema);
        }

        let document = self.builder.assemble(table.paths, schemas);
        log_document_built!(
            self.routes.len(),
            document.paths.len(),
            document.components.as_ref().map_or(0, |c| c.schemas.len())
        );
        Ok((document, table.conditional))
    }

    /// The document, built on first use and cached until the route count
    /// changes.
    pub async fn document(&self) -> DocsResult<Arc<OpenApi>> {
        Ok(self.cached().await?.0)
    }

    async fn cached(&self) -> DocsResult<(Arc<OpenApi>, Arc<Vec<ConditionalHide>>)> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.route_count == self.routes.len() {
                return Ok((cached.document.clone(), cached.conditional.clone()));
            }
        }

        let (document, conditional) = self.build_with_hides().await?;
        let cached = Cached {
            route_count: self.routes.len(),
            document: Arc::new(document),
            conditional: Arc::new(conditional),
        };
        let result = (cached.document.clone(), cached.conditional.clone());
        *cache = Some(cached);
        Ok(result)
    }

    /// The document as seen by the request with head `parts`.
    ///
    /// Operations whose hide predicate holds for the request are pruned from
    /// a copy of the cached document; paths left empty are removed and tags
    /// only those operations used are dropped.
    pub async fn document_for(&self, parts: &Parts) -> DocsResult<Arc<OpenApi>> {
        let (document, conditional) = self.cached().await?;
        let hidden: Vec<_> = conditional
            .iter()
            .filter(|entry| entry.hide.hides(parts))
            .collect();
        if hidden.is_empty() {
            return Ok(document);
        }

        let mut pruned = OpenApi::clone(&document);
        for entry in hidden {
            if let Some(item) = pruned.paths.get_mut(&entry.path) {
                item.take_operation(entry.method);
                if item.is_empty() {
                    pruned.paths.shift_remove(&entry.path);
                }
            }
        }
        pruned.tags = self.builder.collect_tags(&pruned.paths);
        Ok(Arc::new(pruned))
    }

    /// The document as compact JSON.
    pub async fn to_json(&self) -> DocsResult<String> {
        self.document().await?.to_json()
    }

    /// The document as indented JSON.
    pub async fn to_json_pretty(&self) -> DocsResult<String> {
        self.document().await?.to_json_pretty()
    }
}
