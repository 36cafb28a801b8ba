//! Conversion settings.

use serde::{Deserialize, Serialize};

/// Default prefix for `$ref` pointers into the components section.
pub const DEFAULT_REF_PREFIX: &str = "#/components/schemas/";

/// Target schema-object dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OpenApiVersion {
    /// OpenAPI 3.0 (JSON Schema draft 4/5 subset, `nullable`).
    #[serde(rename = "3.0")]
    V3_0,
    /// OpenAPI 3.1 (JSON Schema 2020-12).
    #[default]
    #[serde(rename = "3.1")]
    V3_1,
}

impl OpenApiVersion {
    /// The value emitted in the document's `openapi` field.
    pub fn document_version(self) -> &'static str {
        match self {
            Self::V3_0 => "3.0.3",
            Self::V3_1 => "3.1.0",
        }
    }

    /// Whether the dialect is JSON Schema 2020-12 aligned.
    pub fn is_3_1(self) -> bool {
        matches!(self, Self::V3_1)
    }
}

impl std::fmt::Display for OpenApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::V3_0 => "3.0",
            Self::V3_1 => "3.1",
        })
    }
}

impl std::str::FromStr for OpenApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3.0" | "3.0.0" | "3.0.1" | "3.0.2" | "3.0.3" => Ok(Self::V3_0),
            "3.1" | "3.1.0" | "3.1.1" => Ok(Self::V3_1),
            other => Err(format!("unsupported OpenAPI version: {other}")),
        }
    }
}

/// What the converter does when it meets a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Substitute an empty schema silently.
    Ignore,
    /// Substitute an empty schema and log a warning.
    Warn,
    /// Abort the conversion.
    #[default]
    Throw,
}

/// How unions are rendered when the node does not ask for exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnionStyle {
    /// `anyOf`
    #[default]
    AnyOf,
    /// `oneOf`
    OneOf,
}

/// Settings for one conversion pass.
///
/// # Example
///
/// ```
/// use scribe_schema::{ConversionConfig, ErrorMode, OpenApiVersion};
///
/// let config = ConversionConfig::new()
///     .version(OpenApiVersion::V3_0)
///     .error_mode(ErrorMode::Warn);
///
/// assert_eq!(config.ref_prefix, "#/components/schemas/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Target dialect.
    pub version: OpenApiVersion,
    /// Failure policy.
    pub error_mode: ErrorMode,
    /// Union rendering preference.
    pub union_style: UnionStyle,
    /// Prefix prepended to component names in `$ref` pointers.
    pub ref_prefix: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            version: OpenApiVersion::default(),
            error_mode: ErrorMode::default(),
            union_style: UnionStyle::default(),
            ref_prefix: DEFAULT_REF_PREFIX.to_string(),
        }
    }
}

impl ConversionConfig {
    /// Create the default configuration (3.1, throw, anyOf).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target dialect.
    #[must_use]
    pub fn version(mut self, version: OpenApiVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub fn error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Set the union rendering preference.
    #[must_use]
    pub fn union_style(mut self, style: UnionStyle) -> Self {
        self.union_style = style;
        self
    }

    /// Set the reference prefix.
    #[must_use]
    pub fn ref_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ref_prefix = prefix.into();
        self
    }

    /// Build the `$ref` pointer for a component name.
    pub fn reference_to(&self, name: &str) -> String {
        format!("{}{}", self.ref_prefix, name)
    }
}
