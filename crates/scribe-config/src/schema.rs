//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

use scribe_schema::{ErrorMode, OpenApiVersion, UnionStyle, DEFAULT_REF_PREFIX};
use scribe_telemetry::LogFormat;

/// Prefix marking an `exclude_paths` entry as a regular expression.
pub const REGEX_PREFIX: &str = "re:";

/// Methods accepted in `filter.exclude_methods`.
pub const KNOWN_METHODS: [&str; 8] = [
    "GET", "PUT", "POST", "DELETE", "OPTIONS", "HEAD", "PATCH", "TRACE",
];

/// Document metadata section.
///
/// # Example
///
/// ```
/// use scribe_config::DocumentConfig;
///
/// let config = DocumentConfig {
///     title: "Orders API".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.version, "1.0.0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocumentConfig {
    /// API title (`info.title`).
    #[serde(default = "default_title")]
    pub title: String,

    /// API version (`info.version`).
    #[serde(default = "default_api_version")]
    pub version: String,

    /// API description (`info.description`).
    #[serde(default)]
    pub description: Option<String>,

    /// Target OpenAPI dialect.
    #[serde(default)]
    pub openapi: OpenApiVersion,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_api_version(),
            description: None,
            openapi: OpenApiVersion::default(),
        }
    }
}

fn default_title() -> String {
    "API".to_string()
}

fn default_api_version() -> String {
    "1.0.0".to_string()
}

/// Schema conversion section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// What the converter does on failure.
    #[serde(default)]
    pub error_mode: ErrorMode,

    /// Union rendering preference.
    #[serde(default)]
    pub union_style: UnionStyle,

    /// Prefix for `$ref` pointers.
    #[serde(default = "default_ref_prefix")]
    pub ref_prefix: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::default(),
            union_style: UnionStyle::default(),
            ref_prefix: default_ref_prefix(),
        }
    }
}

fn default_ref_prefix() -> String {
    DEFAULT_REF_PREFIX.to_string()
}

/// Path table filtering section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Drop paths whose final segment looks like a file name.
    #[serde(default = "default_true")]
    pub exclude_static_files: bool,

    /// Paths to drop; entries starting with `re:` are regular expressions.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// HTTP methods to drop.
    #[serde(default = "default_exclude_methods")]
    pub exclude_methods: Vec<String>,

    /// Operations carrying any of these tags are dropped.
    #[serde(default)]
    pub exclude_tags: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_static_files: true,
            exclude_paths: Vec::new(),
            exclude_methods: default_exclude_methods(),
            exclude_tags: Vec::new(),
        }
    }
}

fn default_exclude_methods() -> Vec<String> {
    vec!["OPTIONS".to_string()]
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() {
        let config = FilterConfig::default();
        assert!(config.exclude_static_files);
        assert_eq!(config.exclude_methods, vec!["OPTIONS"]);
        assert!(config.exclude_paths.is_empty());
    }

    #[test]
    fn test_section_defaults_from_empty_toml() {
        let filter: FilterConfig = toml::from_str("").unwrap();
        assert_eq!(filter, FilterConfig::default());

        let schema: SchemaConfig = toml::from_str("").unwrap();
        assert_eq!(schema.ref_prefix, "#/components/schemas/");
        assert_eq!(schema.error_mode, ErrorMode::Throw);
    }

    #[test]
    fn test_enum_fields_parse() {
        let schema: SchemaConfig = toml::from_str(
            r#"
                error_mode = "warn"
                union_style = "one_of"
            "#,
        )
        .unwrap();
        assert_eq!(schema.error_mode, ErrorMode::Warn);
        assert_eq!(schema.union_style, UnionStyle::OneOf);

        let document: DocumentConfig = toml::from_str(r#"openapi = "3.0""#).unwrap();
        assert_eq!(document.openapi, OpenApiVersion::V3_0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<LoggingConfig, _> = toml::from_str(r#"colour = true"#);
        assert!(result.is_err());
    }
}
