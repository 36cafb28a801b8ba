//! OpenAPI document types.
//!
//! Field names follow the OpenAPI 3.0/3.1 object model; schema objects come
//! from [`scribe_schema`], which renders them for the selected dialect.
//!
//! <https://spec.openapis.org/oas/v3.1.0>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use scribe_schema::Schema;

use crate::error::DocsResult;
use crate::method::HttpMethod;

/// OpenAPI document root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version ("3.0.3" or "3.1.0").
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Tags for API grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// API paths and operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components (schemas, security schemes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// External documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "externalDocs")]
    pub external_docs: Option<ExternalDocumentation>,
}

impl OpenApi {
    /// The operation for `method` on `path`, if documented.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path)?.operation(method)
    }

    /// Number of documented operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.operations().count()).sum()
    }

    /// A component schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.as_ref()?.schemas.get(name)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> DocsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terms of service URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "termsOfService")]
    pub terms_of_service: Option<String>,
    /// Contact information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// License information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

impl Info {
    /// Create metadata with a title and version.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
        }
    }
}

/// Contact information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Contact {
    /// Contact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// License information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    /// License name.
    pub name: String,
    /// License URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The operations available on one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> Option<&mut Option<Operation>> {
        match method {
            HttpMethod::Get => Some(&mut self.get),
            HttpMethod::Put => Some(&mut self.put),
            HttpMethod::Post => Some(&mut self.post),
            HttpMethod::Delete => Some(&mut self.delete),
            HttpMethod::Options => Some(&mut self.options),
            HttpMethod::Head => Some(&mut self.head),
            HttpMethod::Patch => Some(&mut self.patch),
            HttpMethod::Trace => Some(&mut self.trace),
            HttpMethod::All => None,
        }
    }

    /// The operation for a concrete method.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
            HttpMethod::All => None,
        }
    }

    /// Place `operation` under a concrete method. `ALL` is ignored.
    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) {
        if let Some(slot) = self.slot(method) {
            *slot = Some(operation);
        }
    }

    /// Remove and return the operation for `method`.
    pub fn take_operation(&mut self, method: HttpMethod) -> Option<Operation> {
        self.slot(method)?.take()
    }

    /// Documented operations in path item order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::CONCRETE
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }

    /// Whether no method is documented.
    pub fn is_empty(&self) -> bool {
        self.operations().next().is_none()
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Full description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// External documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "externalDocs")]
    pub external_docs: Option<ExternalDocumentation>,
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Callbacks by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, Value>,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Vendor extensions (`x-*`).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Operation {
    /// The inline parameter with `name` in `location`.
    pub fn parameter(&self, name: &str, location: ParameterIn) -> Option<&Parameter> {
        self.parameters.iter().find_map(|p| match p {
            ParameterOrRef::Item(param) if param.name == name && param.location == location => {
                Some(param)
            }
            _ => None,
        })
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
    /// HTTP header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParameterIn {
    /// The location as written in `in`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, location: ParameterIn) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: location == ParameterIn::Path,
            deprecated: false,
            schema: None,
        }
    }

    /// Required string path parameter.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParameterIn::Path).with_schema(Schema::string())
    }

    /// Optional query parameter.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParameterIn::Query)
    }

    /// Set the schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Mark as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Pointer prefix for parameters shared through `components.parameters`.
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// Pointer to a reusable object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Target pointer.
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl Reference {
    /// Reference to `components.parameters[name]`.
    pub fn parameter(name: &str) -> Self {
        Self {
            reference: format!("{PARAMETER_REF_PREFIX}{name}"),
        }
    }

    /// The `components.parameters` key this reference points at, if any.
    pub fn parameter_name(&self) -> Option<&str> {
        self.reference.strip_prefix(PARAMETER_REF_PREFIX)
    }
}

/// An inline parameter or a reference to a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    /// `{ "$ref": ... }`
    Ref(Reference),
    /// Inline parameter.
    Item(Parameter),
}

impl ParameterOrRef {
    /// Identity used when merging parameter lists: the `$ref` string, else
    /// `"<in> <name>"`.
    pub fn merge_key(&self) -> String {
        match self {
            Self::Ref(r) => r.reference.clone(),
            Self::Item(p) => format!("{} {}", p.location.as_str(), p.name),
        }
    }
}

impl From<Parameter> for ParameterOrRef {
    fn from(parameter: Parameter) -> Self {
        Self::Item(parameter)
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    /// A required body with a single media type.
    pub fn new(media_type: impl Into<String>, schema: Schema) -> Self {
        let mut content = IndexMap::new();
        content.insert(media_type.into(), MediaType::new(schema));
        Self {
            description: None,
            required: true,
            content,
        }
    }

    /// Shallow-merge `other` into `self`.
    ///
    /// A present description replaces the current one, media types are merged
    /// by key, and the body stays required once any contributor requires it.
    pub fn merge(&mut self, other: Self) {
        if other.description.is_some() {
            self.description = other.description;
        }
        self.required |= other.required;
        self.content.extend(other.content);
    }
}

/// Media type content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl MediaType {
    /// Content described by `schema`.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            example: None,
        }
    }
}

/// Response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description (required).
    pub description: String,
    /// Response headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    /// A response with no content.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            headers: IndexMap::new(),
            content: IndexMap::new(),
        }
    }

    /// Add content for a media type.
    #[must_use]
    pub fn with_content(mut self, media_type: impl Into<String>, schema: Schema) -> Self {
        self.content.insert(media_type.into(), MediaType::new(schema));
        self
    }
}

/// Response header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Header schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Reusable components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Reusable schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    /// Reusable parameters.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    /// Security schemes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

impl Components {
    /// Whether there is nothing to emit.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.parameters.is_empty() && self.security_schemes.is_empty()
    }
}

/// Security scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// Security scheme type.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// HTTP auth scheme name (for type=http).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Bearer token format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "bearerFormat")]
    pub bearer_format: Option<String>,
    /// API key location (for type=apiKey).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// API key name (for type=apiKey).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SecurityScheme {
    /// HTTP bearer authentication with JWT tokens.
    pub fn bearer_jwt() -> Self {
        Self {
            scheme_type: "http".to_string(),
            description: None,
            scheme: Some("bearer".to_string()),
            bearer_format: Some("JWT".to_string()),
            location: None,
            name: None,
        }
    }

    /// API key carried in a request header.
    pub fn api_key_header(header: impl Into<String>) -> Self {
        Self {
            scheme_type: "apiKey".to_string(),
            description: None,
            scheme: None,
            bearer_format: None,
            location: Some("header".to_string()),
            name: Some(header.into()),
        }
    }
}

/// Security requirement: scheme name to required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// API tag for grouping operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// External documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "externalDocs")]
    pub external_docs: Option<ExternalDocumentation>,
}

impl Tag {
    /// A tag with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            external_docs: None,
        }
    }
}

/// External documentation link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocumentation {
    /// URL.
    pub url: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExternalDocumentation {
    /// Shallow-merge `other` into `self`; an empty incoming URL keeps the
    /// current one.
    pub fn merge(&mut self, other: Self) {
        if !other.url.is_empty() {
            self.url = other.url;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
    }
}
