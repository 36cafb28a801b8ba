//! Partial operation descriptions and how they combine.
//!
//! Each middleware on a route contributes an [`OperationFragment`]. Fragments
//! are merged left to right:
//!
//! - `tags` and `security` are concatenated, then deduplicated by value
//! - `parameters` are merged by identity (see [`merge_parameters`])
//! - `responses`, `callbacks` and extensions are shallow-merged by key
//! - `requestBody` and `externalDocs` are merged field by field, so a
//!   description from one fragment survives content from another
//! - scalars are overwritten, but an absent incoming value never clears one

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::openapi::{
    ExternalDocumentation, Operation, ParameterOrRef, RequestBody, Response, SecurityRequirement,
};

/// A partial operation contributed by one middleware.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{OperationFragment, Response};
///
/// let mut merged = OperationFragment::new().tag("users").summary("List users");
/// merged.merge(
///     OperationFragment::new()
///         .tag("users")
///         .tag("admin")
///         .response("200", Response::new("OK")),
/// );
///
/// assert_eq!(merged.tags, vec!["users", "admin"]);
/// assert_eq!(merged.summary.as_deref(), Some("List users"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFragment {
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
    pub external_docs: Option<ExternalDocumentation>,
    /// Explicit operation id; wins over the generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
    /// Callbacks by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, Value>,
    /// Deprecation flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Vendor extensions (`x-*`).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl OperationFragment {
    /// An empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set an explicit operation id.
    #[must_use]
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Add a parameter or parameter reference.
    #[must_use]
    pub fn parameter(mut self, parameter: impl Into<ParameterOrRef>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn request_body(mut self, body: RequestBody) -> Self {
        self.request_body = Some(body);
        self
    }

    /// Link external documentation.
    #[must_use]
    pub fn external_docs(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.external_docs = Some(ExternalDocumentation {
            url: url.into(),
            description,
        });
        self
    }

    /// Add a response.
    #[must_use]
    pub fn response(mut self, status: impl Into<String>, response: Response) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    /// Add a callback.
    #[must_use]
    pub fn callback(mut self, name: impl Into<String>, callback: Value) -> Self {
        self.callbacks.insert(name.into(), callback);
        self
    }

    /// Set the deprecation flag.
    #[must_use]
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Add a security requirement.
    #[must_use]
    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.security.push(requirement);
        self
    }

    /// Add a vendor extension. The `x-` prefix is added if missing.
    #[must_use]
    pub fn extension(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        let name = if name.starts_with("x-") {
            name
        } else {
            format!("x-{name}")
        };
        self.extensions.insert(name, value);
        self
    }

    /// Merge `other` into `self`; `other` wins where both set a value.
    pub fn merge(&mut self, other: Self) {
        extend_unique(&mut self.tags, other.tags);
        overwrite(&mut self.summary, other.summary);
        overwrite(&mut self.description, other.description);
        merge_with(&mut self.external_docs, other.external_docs, ExternalDocumentation::merge);
        overwrite(&mut self.operation_id, other.operation_id);
        merge_parameters(&mut self.parameters, other.parameters);
        merge_with(&mut self.request_body, other.request_body, RequestBody::merge);
        self.responses.extend(other.responses);
        self.callbacks.extend(other.callbacks);
        overwrite(&mut self.deprecated, other.deprecated);
        extend_unique(&mut self.security, other.security);
        self.extensions.extend(other.extensions);
    }

    /// Finish into an operation, using `default_id` when no id was given.
    pub fn into_operation(self, default_id: impl FnOnce() -> String) -> Operation {
        Operation {
            tags: self.tags,
            summary: self.summary,
            description: self.description,
            external_docs: self.external_docs,
            operation_id: self.operation_id.unwrap_or_else(default_id),
            parameters: self.parameters,
            request_body: self.request_body,
            responses: self.responses,
            callbacks: self.callbacks,
            deprecated: self.deprecated.unwrap_or(false),
            security: self.security,
            extensions: self.extensions,
        }
    }
}

fn overwrite<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

fn merge_with<T>(slot: &mut Option<T>, incoming: Option<T>, merge: impl FnOnce(&mut T, T)) {
    let Some(incoming) = incoming else {
        return;
    };
    match slot {
        Some(existing) => merge(existing, incoming),
        None => *slot = Some(incoming),
    }
}

fn extend_unique<T: PartialEq>(target: &mut Vec<T>, incoming: Vec<T>) {
    for item in incoming {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

/// Merge parameter list `incoming` into `target`.
///
/// Parameters are identified by their `$ref` string, or by `"<in> <name>"`.
/// A parameter present in both takes the incoming entry at the existing
/// position; new parameters are appended in incoming order.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{merge_parameters, Parameter, ParameterOrRef};
///
/// let mut params: Vec<ParameterOrRef> =
///     vec![Parameter::query("page").into(), Parameter::query("q").into()];
/// merge_parameters(
///     &mut params,
///     vec![Parameter::query("limit").into(), Parameter::query("page").required().into()],
/// );
///
/// let keys: Vec<_> = params.iter().map(ParameterOrRef::merge_key).collect();
/// assert_eq!(keys, ["query page", "query q", "query limit"]);
/// ```
pub fn merge_parameters(target: &mut Vec<ParameterOrRef>, incoming: Vec<ParameterOrRef>) {
    for parameter in incoming {
        let key = parameter.merge_key();
        match target.iter().position(|existing| existing.merge_key() == key) {
            Some(index) => target[index] = parameter,
            None => target.push(parameter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::{Parameter, ParameterIn, Reference};
    use scribe_schema::Schema;
    use serde_json::json;

    fn keys(params: &[ParameterOrRef]) -> Vec<String> {
        params.iter().map(ParameterOrRef::merge_key).collect()
    }

    #[test]
    fn test_parameter_merge_keeps_position() {
        let mut a: Vec<ParameterOrRef> = vec![
            Parameter::query("a").into(),
            Parameter::new("x-trace", ParameterIn::Header).into(),
            Parameter::query("b").into(),
        ];
        let b: Vec<ParameterOrRef> = vec![
            Parameter::query("c").into(),
            Parameter::query("a").with_description("from b").into(),
        ];
        merge_parameters(&mut a, b);

        assert_eq!(keys(&a), vec!["query a", "header x-trace", "query b", "query c"]);
        match &a[0] {
            ParameterOrRef::Item(p) => assert_eq!(p.description.as_deref(), Some("from b")),
            ParameterOrRef::Ref(_) => panic!("expected inline parameter"),
        }
    }

    #[test]
    fn test_parameter_merge_by_ref_and_location() {
        let page = ParameterOrRef::Ref(Reference {
            reference: "#/components/parameters/Page".to_string(),
        });
        let mut a = vec![page.clone(), Parameter::query("id").into()];
        merge_parameters(&mut a, vec![page, Parameter::path("id").into()]);
        assert_eq!(
            keys(&a),
            vec!["#/components/parameters/Page", "query id", "path id"]
        );
    }

    #[test]
    fn test_arrays_deduplicated() {
        let mut security = SecurityRequirement::new();
        security.insert("bearer".to_string(), vec![]);

        let mut a = OperationFragment::new().tag("users").security(security.clone());
        a.merge(OperationFragment::new().tag("admin").tag("users").security(security));

        assert_eq!(a.tags, vec!["users", "admin"]);
        assert_eq!(a.security.len(), 1);
    }

    #[test]
    fn test_absent_scalars_do_not_overwrite() {
        let mut a = OperationFragment::new()
            .summary("Get user")
            .description("Fetch one user")
            .deprecated(true);
        a.merge(OperationFragment::new().summary("Get a user"));

        assert_eq!(a.summary.as_deref(), Some("Get a user"));
        assert_eq!(a.description.as_deref(), Some("Fetch one user"));
        assert_eq!(a.deprecated, Some(true));
    }

    #[test]
    fn test_explicit_false_overwrites() {
        let mut a = OperationFragment::new().deprecated(true);
        a.merge(OperationFragment::new().deprecated(false));
        assert_eq!(a.deprecated, Some(false));
    }

    #[test]
    fn test_maps_shallow_merge() {
        let mut a = OperationFragment::new()
            .response("200", Response::new("OK"))
            .response("404", Response::new("Missing"))
            .extension("x-rate-limit", json!(10));
        a.merge(
            OperationFragment::new()
                .response("200", Response::new("Found").with_content("application/json", Schema::object()))
                .response("500", Response::new("Boom"))
                .extension("rate-limit", json!(20))
                .callback("onEvent", json!({})),
        );

        let statuses: Vec<_> = a.responses.keys().cloned().collect();
        assert_eq!(statuses, vec!["200", "404", "500"]);
        assert_eq!(a.responses["200"].description, "Found");
        assert_eq!(a.extensions["x-rate-limit"], json!(20));
        assert!(a.callbacks.contains_key("onEvent"));
    }

    #[test]
    fn test_request_body_merges_field_by_field() {
        let described = RequestBody {
            description: Some("The new user".to_string()),
            required: false,
            content: IndexMap::new(),
        };
        let mut a = OperationFragment::new().request_body(described);
        a.merge(
            OperationFragment::new()
                .request_body(RequestBody::new("application/json", Schema::object())),
        );

        let body = a.request_body.as_ref().unwrap();
        assert_eq!(body.description.as_deref(), Some("The new user"));
        assert!(body.required);
        assert!(body.content.contains_key("application/json"));

        a.merge(OperationFragment::new().request_body(RequestBody {
            description: Some("Replacement".to_string()),
            required: false,
            content: IndexMap::new(),
        }));
        let body = a.request_body.unwrap();
        assert_eq!(body.description.as_deref(), Some("Replacement"));
        assert!(body.required);
        assert_eq!(body.content.len(), 1);
    }

    #[test]
    fn test_external_docs_merge_keeps_description() {
        let mut a = OperationFragment::new()
            .external_docs("https://docs.example.com/users", Some("User guide".to_string()));
        a.merge(OperationFragment::new().external_docs("https://docs.example.com/v2/users", None));

        let docs = a.external_docs.unwrap();
        assert_eq!(docs.url, "https://docs.example.com/v2/users");
        assert_eq!(docs.description.as_deref(), Some("User guide"));
    }

    #[test]
    fn test_into_operation_default_id() {
        let op = OperationFragment::new().into_operation(|| "getUsers".to_string());
        assert_eq!(op.operation_id, "getUsers");
        assert!(!op.deprecated);

        let op = OperationFragment::new()
            .operation_id("listUsers")
            .into_operation(|| unreachable!());
        assert_eq!(op.operation_id, "listUsers");
    }

    #[test]
    fn test_fragment_from_json() {
        let fragment: OperationFragment = serde_json::from_value(json!({
            "summary": "Create",
            "operationId": "createThing",
            "tags": ["things"],
            "x-internal": true
        }))
        .unwrap();
        assert_eq!(fragment.operation_id.as_deref(), Some("createThing"));
        assert_eq!(fragment.extensions["x-internal"], json!(true));
    }
}
