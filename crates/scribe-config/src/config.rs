//! Main configuration types.
//!
//! This module provides the top-level [`ScribeConfig`] struct and its builder.

use regex::Regex;
use serde::{Deserialize, Serialize};

use scribe_schema::{ConversionConfig, ErrorMode};
use scribe_telemetry::{create_env_filter, LogConfig, LogFormat};

use crate::schema::{KNOWN_METHODS, REGEX_PREFIX};
use crate::{ConfigError, DocumentConfig, FilterConfig, LoggingConfig, SchemaConfig};

/// Complete Scribe configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use scribe_config::ScribeConfig;
///
/// let config = ScribeConfig::default();
/// assert_eq!(config.document.title, "API");
/// assert!(config.filter.exclude_static_files);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ScribeConfig {
    /// Document metadata.
    #[serde(default)]
    pub document: DocumentConfig,

    /// Schema conversion settings.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Path table filtering.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScribeConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::{DocumentConfig, ScribeConfig};
    ///
    /// let config = ScribeConfig::builder()
    ///     .document(DocumentConfig {
    ///         title: "Orders API".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.document.title, "Orders API");
    /// ```
    #[must_use]
    pub fn builder() -> ScribeConfigBuilder {
        ScribeConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The document title or version is empty
    /// - The reference prefix is empty
    /// - An `re:` path exclusion is not a valid regular expression
    /// - An excluded method is not an HTTP method
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document.title.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "document.title",
                "must not be empty",
            ));
        }
        if self.document.version.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "document.version",
                "must not be empty",
            ));
        }

        if self.schema.ref_prefix.is_empty() {
            return Err(ConfigError::invalid_value(
                "schema.ref_prefix",
                "must not be empty",
            ));
        }

        for entry in &self.filter.exclude_paths {
            if let Some(pattern) = entry.strip_prefix(REGEX_PREFIX) {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::invalid_value(
                        "filter.exclude_paths",
                        format!("invalid pattern '{pattern}': {e}"),
                    )
                })?;
            }
        }

        for method in &self.filter.exclude_methods {
            if !KNOWN_METHODS.contains(&method.to_uppercase().as_str()) {
                return Err(ConfigError::invalid_value(
                    "filter.exclude_methods",
                    format!("unknown HTTP method: {method}"),
                ));
            }
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, converter failures degrade to
    /// warnings.
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::ScribeConfig;
    ///
    /// let config = ScribeConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config.schema.error_mode = ErrorMode::Warn;

        config
    }

    /// Production preset: JSON info logs, converter failures abort the build.
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::ScribeConfig;
    ///
    /// let config = ScribeConfig::production();
    /// assert_eq!(config.logging.format, scribe_telemetry::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config.schema.error_mode = ErrorMode::Throw;

        config
    }

    /// Converter settings derived from the `[document]` and `[schema]`
    /// sections.
    pub fn conversion_config(&self) -> ConversionConfig {
        ConversionConfig::new()
            .version(self.document.openapi)
            .error_mode(self.schema.error_mode)
            .union_style(self.schema.union_style)
            .ref_prefix(self.schema.ref_prefix.clone())
    }

    /// Logging settings for [`scribe_telemetry::init_logging`].
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            format: self.logging.format,
            span_events: self.logging.format == LogFormat::Pretty,
            file_line_info: self.logging.include_location,
            include_target: true,
            service_name: self.document.title.clone(),
        }
    }
}

/// Builder for [`ScribeConfig`].
#[derive(Debug, Default)]
pub struct ScribeConfigBuilder {
    document: Option<DocumentConfig>,
    schema: Option<SchemaConfig>,
    filter: Option<FilterConfig>,
    logging: Option<LoggingConfig>,
}

impl ScribeConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document section.
    #[must_use]
    pub fn document(mut self, document: DocumentConfig) -> Self {
        self.document = Some(document);
        self
    }

    /// Set the schema section.
    #[must_use]
    pub fn schema(mut self, schema: SchemaConfig) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the filter section.
    #[must_use]
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> ScribeConfig {
        ScribeConfig {
            document: self.document.unwrap_or_default(),
            schema: self.schema.unwrap_or_default(),
            filter: self.filter.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<ScribeConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
