//! Resolvers that document validation middleware.
//!
//! A request validator renders its schema as an input; a response validator
//! renders as an output. Body targets become the request body; query, path,
//! header and cookie targets spread an object schema into one parameter per
//! property.

use indexmap::IndexMap;
use scribe_schema::{NodeId, Schema, SchemaType, Side, ValidatorSchema};

use crate::error::{DocsError, DocsResult};
use crate::fragment::OperationFragment;
use crate::openapi::{Parameter, ParameterIn, RequestBody, Response};
use crate::resolver::{BoxFuture, FragmentResolver, ResolveContext, ResolvedFragment};

/// Where a request validator reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationTarget {
    /// JSON request body.
    Json,
    /// Form request body.
    Form,
    /// Query string.
    Query,
    /// Path parameters.
    Param,
    /// Request headers.
    Header,
    /// Cookies.
    Cookie,
}

impl ValidationTarget {
    /// Parameter location, for non-body targets.
    pub fn location(self) -> Option<ParameterIn> {
        match self {
            Self::Json | Self::Form => None,
            Self::Query => Some(ParameterIn::Query),
            Self::Param => Some(ParameterIn::Path),
            Self::Header => Some(ParameterIn::Header),
            Self::Cookie => Some(ParameterIn::Cookie),
        }
    }

    /// Media type, for body targets.
    pub fn media_type(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("application/json"),
            Self::Form => Some("multipart/form-data"),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Json | Self::Form => "requestBody",
            Self::Query => "parameters/query",
            Self::Param => "parameters/path",
            Self::Header => "parameters/header",
            Self::Cookie => "parameters/cookie",
        }
    }
}

/// A validator's schema: an arena node, or a schema an adapter rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// Render through the shared converter.
    Node(NodeId),
    /// Already rendered, with its own components.
    Rendered(ValidatorSchema),
}

impl From<NodeId> for SchemaSource {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<ValidatorSchema> for SchemaSource {
    fn from(schema: ValidatorSchema) -> Self {
        Self::Rendered(schema)
    }
}

struct Rendered {
    schema: Schema,
    components: IndexMap<String, Schema>,
}

impl Rendered {
    /// The object behind `schema`, following one `$ref` if needed.
    fn object<'s>(&'s self, cx: &'s ResolveContext<'_>) -> Option<&'s Schema> {
        if !self.schema.is_reference() {
            return Some(&self.schema);
        }
        if let Some(found) = cx.definition_for(&self.schema) {
            return Some(found);
        }
        let reference = self.schema.reference.as_deref()?;
        let name = reference.rsplit('/').next()?;
        self.components.get(name)
    }
}

fn render(
    source: &SchemaSource,
    cx: &mut ResolveContext<'_>,
    side: Side,
    location: &str,
) -> DocsResult<Rendered> {
    match source {
        SchemaSource::Node(id) => Ok(Rendered {
            schema: cx.convert(*id, side, location)?,
            components: IndexMap::new(),
        }),
        SchemaSource::Rendered(rendered) => Ok(Rendered {
            schema: rendered.schema.clone(),
            components: rendered.components.clone(),
        }),
    }
}

/// Documents a request validator. See [`validator`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    target: ValidationTarget,
    source: SchemaSource,
}

/// Document a request validator reading `target`.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{validator, ValidationTarget};
/// use scribe_schema::{NodeKind, SchemaArena};
///
/// let mut arena = SchemaArena::new();
/// let name = arena.string();
/// let body = arena.named("NewUser", NodeKind::object([("name", name)]));
///
/// let resolver = validator(ValidationTarget::Json, body);
/// assert_eq!(resolver.target(), ValidationTarget::Json);
/// ```
pub fn validator(target: ValidationTarget, source: impl Into<SchemaSource>) -> Validator {
    Validator {
        target,
        source: source.into(),
    }
}

impl Validator {
    /// The validated request part.
    pub fn target(&self) -> ValidationTarget {
        self.target
    }

    fn fragment(&self, cx: &mut ResolveContext<'_>) -> DocsResult<ResolvedFragment> {
        let rendered = render(&self.source, cx, Side::Input, self.target.label())?;

        let fragment = if let Some(media_type) = self.target.media_type() {
            OperationFragment::new().request_body(RequestBody::new(media_type, rendered.schema.clone()))
        } else {
            let location = self.target.location().unwrap_or(ParameterIn::Query);
            let object = rendered
                .object(cx)
                .filter(|s| !s.properties.is_empty() || s.has_type(SchemaType::Object))
                .ok_or_else(|| {
                    DocsError::resolver(
                        cx.path(),
                        cx.method().as_str(),
                        format!("{} validator schema must be an object", location.as_str()),
                    )
                })?;
            object
                .properties
                .iter()
                .fold(OperationFragment::new(), |fragment, (name, schema)| {
                    let mut parameter = Parameter::new(name.clone(), location)
                        .with_schema(schema.clone());
                    parameter.required |= object.required.contains(name);
                    parameter.description = schema.description.clone();
                    fragment.parameter(parameter)
                })
        };

        Ok(ResolvedFragment {
            fragment,
            components: rendered.components,
        })
    }
}

impl FragmentResolver for Validator {
    fn resolve<'c>(
        &'c self,
        cx: &'c mut ResolveContext<'_>,
    ) -> BoxFuture<'c, DocsResult<ResolvedFragment>> {
        let result = self.fragment(cx);
        Box::pin(async move { result })
    }
}

/// Documents a response schema. See [`response`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseValidator {
    status: String,
    description: String,
    media_type: String,
    source: SchemaSource,
}

/// Document the `status` response of a route as JSON described by `source`.
///
/// # Example
///
/// ```rust
/// use scribe_docs::response;
/// use scribe_schema::SchemaArena;
///
/// let mut arena = SchemaArena::new();
/// let count = arena.integer();
/// let resolver = response("200", "Number of users", count);
/// assert_eq!(resolver.status(), "200");
/// ```
pub fn response(
    status: impl Into<String>,
    description: impl Into<String>,
    source: impl Into<SchemaSource>,
) -> ResponseValidator {
    ResponseValidator {
        status: status.into(),
        description: description.into(),
        media_type: "application/json".to_string(),
        source: source.into(),
    }
}

impl ResponseValidator {
    /// Use a media type other than `application/json`.
    #[must_use]
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// The documented status code.
    pub fn status(&self) -> &str {
        &self.status
    }

    fn fragment(&self, cx: &mut ResolveContext<'_>) -> DocsResult<ResolvedFragment> {
        let location = format!("responses/{}", self.status);
        let rendered = render(&self.source, cx, Side::Output, &location)?;
        let response = Response::new(self.description.clone())
            .with_content(self.media_type.clone(), rendered.schema);
        Ok(ResolvedFragment {
            fragment: OperationFragment::new().response(self.status.clone(), response),
            components: rendered.components,
        })
    }
}

impl FragmentResolver for ResponseValidator {
    fn resolve<'c>(
        &'c self,
        cx: &'c mut ResolveContext<'_>,
    ) -> BoxFuture<'c, DocsResult<ResolvedFragment>> {
        let result = self.fragment(cx);
        Box::pin(async move { result })
    }
}
