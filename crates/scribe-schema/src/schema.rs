//! OpenAPI schema objects.
//!
//! A [`Schema`] is either an inline shape description or, when
//! [`Schema::reference`] is set, a reference object pointing at a named
//! component. One struct covers both dialects; fields that only exist in one
//! of them (`nullable` for 3.0, `prefixItems`/`const`/`propertyNames` for 3.1)
//! are simply left empty by the converter when targeting the other.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Number type.
    Number,
    /// Integer type.
    Integer,
    /// Boolean type.
    Boolean,
    /// Array type.
    Array,
    /// Object type.
    Object,
    /// Null type.
    Null,
}

impl SchemaType {
    /// The JSON type a literal value belongs to.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

/// The `type` keyword: a single type or, in 3.1, a list of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaTypeSet {
    /// `"type": "string"`
    Single(SchemaType),
    /// `"type": ["string", "null"]`
    Multiple(Vec<SchemaType>),
}

impl SchemaTypeSet {
    /// Whether the set contains the given type.
    pub fn contains(&self, ty: SchemaType) -> bool {
        match self {
            Self::Single(t) => *t == ty,
            Self::Multiple(ts) => ts.contains(&ty),
        }
    }

    /// Add a type, widening a single type into a list.
    #[must_use]
    pub fn with(self, ty: SchemaType) -> Self {
        match self {
            Self::Single(t) if t == ty => Self::Single(t),
            Self::Single(t) => Self::Multiple(vec![t, ty]),
            Self::Multiple(mut ts) => {
                if !ts.contains(&ty) {
                    ts.push(ty);
                }
                Self::Multiple(ts)
            }
        }
    }
}

impl From<SchemaType> for SchemaTypeSet {
    fn from(ty: SchemaType) -> Self {
        Self::Single(ty)
    }
}

/// `additionalProperties`: either a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` / `false`
    Allowed(bool),
    /// A schema every extra property must satisfy.
    Schema(Box<Schema>),
}

/// Discriminator object for unions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    /// The property whose value selects the branch.
    #[serde(rename = "propertyName")]
    pub property_name: String,
    /// Discriminant value to branch reference.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

/// JSON Schema definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to another schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Schema type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaTypeSet>,
    /// Schema format (e.g., "date-time", "email").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Single permitted value (3.1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "const")]
    pub const_value: Option<Value>,
    /// Enum values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "enum")]
    pub enum_values: Vec<Value>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Required properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Schema for properties not listed in `properties`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,
    /// Constraint on property names (3.1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "propertyNames")]
    pub property_names: Option<Box<Schema>>,
    /// Positional item schemas (3.1).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "prefixItems")]
    pub prefix_items: Vec<Schema>,
    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Minimum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minItems")]
    pub min_items: Option<u64>,
    /// Maximum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxItems")]
    pub max_items: Option<u64>,
    /// oneOf schemas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "oneOf")]
    pub one_of: Vec<Schema>,
    /// anyOf schemas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "anyOf")]
    pub any_of: Vec<Schema>,
    /// allOf schemas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "allOf")]
    pub all_of: Vec<Schema>,
    /// Union discriminator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    /// Minimum value (for numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Maximum value (for numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum length (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    /// Maximum length (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    /// Pattern regex (for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Whether nullable (3.0).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl Schema {
    /// Create an empty schema (`{}`), which accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Create a schema with the given type.
    #[must_use]
    pub fn typed(ty: SchemaType) -> Self {
        Self {
            schema_type: Some(ty.into()),
            ..Default::default()
        }
    }

    /// Create a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::typed(SchemaType::String)
    }

    /// Create an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::typed(SchemaType::Integer)
    }

    /// Create a number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::typed(SchemaType::Number)
    }

    /// Create a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::typed(SchemaType::Boolean)
    }

    /// Create an array schema with the given item schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array.into()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Create an object schema.
    #[must_use]
    pub fn object() -> Self {
        Self::typed(SchemaType::Object)
    }

    /// Create a reference schema.
    #[must_use]
    pub fn reference(ref_path: impl Into<String>) -> Self {
        Self {
            reference: Some(ref_path.into()),
            ..Default::default()
        }
    }

    /// Whether this is a reference object.
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Whether this is the empty schema `{}`.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the type keyword includes `ty`.
    pub fn has_type(&self, ty: SchemaType) -> bool {
        self.schema_type.as_ref().is_some_and(|t| t.contains(ty))
    }

    /// Add a description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Add a property to an object schema.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark a property as required.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
