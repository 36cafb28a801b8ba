//! # Scribe
//!
//! **OpenAPI documents from route declarations and validation schemas**
//!
//! Scribe turns the validation schemas attached to your routes into one
//! consolidated OpenAPI 3.0 or 3.1 document:
//!
//! - **Schema conversion** – arena-backed schema graphs rendered as schema
//!   objects, with named components, recursion, and input/output views of
//!   transforms
//! - **Route registry** – metadata fragments merged per path and method, with
//!   `ALL`-method inheritance and path-parameter back-fill
//! - **Document assembly** – filtering, memoization, and per-request hiding
//! - **Configuration** – TOML/JSON files, `.env`, and environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use scribe::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let config = ScribeConfig::builder()
//!     .document(DocumentConfig {
//!         title: "Pet Store".to_string(),
//!         ..Default::default()
//!     })
//!     .logging(LoggingConfig {
//!         enabled: false,
//!         ..Default::default()
//!     })
//!     .build();
//! let mut docs = scribe::bootstrap(&config)?;
//!
//! let arena = docs.arena_mut();
//! let name = arena.string();
//! let pet = arena.named("Pet", NodeKind::object([("name", name)]));
//!
//! docs.route(HttpMethod::Get, "/pets/:id")?
//!     .fragment(response("200", "A pet", pet));
//!
//! let document = docs.document().await?;
//! assert_eq!(document.info.title, "Pet Store");
//! # Ok::<(), scribe::ScribeError>(())
//! # }).unwrap();
//! ```

use thiserror::Error;

// Re-export schema conversion
pub use scribe_schema as schema;

// Re-export document assembly
pub use scribe_docs as docs;

// Re-export configuration
pub use scribe_config as config;

// Re-export logging
pub use scribe_telemetry as telemetry;

/// Errors surfaced while setting Scribe up or building a document.
#[derive(Debug, Error)]
pub enum ScribeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] scribe_config::ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] scribe_telemetry::TelemetryError),

    /// The document could not be built.
    #[error(transparent)]
    Docs(#[from] scribe_docs::DocsError),
}

/// Result type for the facade.
pub type ScribeResult<T> = Result<T, ScribeError>;

/// Validate `config`, install logging, and create an empty [`docs::ApiDocs`].
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a global subscriber is
/// already installed, or a filter entry cannot be compiled.
pub fn bootstrap(config: &scribe_config::ScribeConfig) -> ScribeResult<scribe_docs::ApiDocs> {
    config.validate()?;
    scribe_telemetry::init_logging(&config.log_config())?;
    let builder = scribe_docs::DocumentBuilder::from_config(config)?;
    Ok(builder.into_docs())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use scribe::prelude::*;
///
/// let docs = DocumentBuilder::new().into_docs();
/// assert!(docs.routes().is_empty());
/// ```
pub mod prelude {
    pub use crate::{bootstrap, ScribeError, ScribeResult};

    // Schema graphs and conversion
    pub use scribe_schema::{
        ConversionConfig, EffectDirection, ErrorMode, NodeId, NodeKind, OpenApiVersion, Schema,
        SchemaAdapter, SchemaArena, SchemaConverter, SchemaError, Side, UnionStyle,
        ValidatorSchema,
    };

    // Routes and documents
    pub use scribe_docs::{
        resolver_fn, response, validator, ApiDocs, DocsError, DocumentBuilder, FragmentResolver,
        Hide, HttpMethod, OpenApi, OperationFragment, Parameter, PathFilter, ResolveContext,
        ResolvedFragment, Response, ValidationTarget,
    };

    // Configuration
    pub use scribe_config::{
        ConfigLoader, DocumentConfig, FilterConfig, LoggingConfig, SchemaConfig, ScribeConfig,
    };

    // Logging
    pub use scribe_telemetry::{init_logging, LogConfig, LogFormat};
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_config::{LoggingConfig, ScribeConfig};

    fn quiet() -> ScribeConfig {
        ScribeConfig::builder()
            .logging(LoggingConfig {
                enabled: false,
                ..Default::default()
            })
            .build()
    }

    #[test]
    fn test_bootstrap_with_defaults() {
        let docs = bootstrap(&quiet()).unwrap();
        assert!(docs.routes().is_empty());
    }

    #[test]
    fn test_bootstrap_rejects_invalid_config() {
        let mut config = quiet();
        config.schema.ref_prefix = String::new();
        assert!(matches!(bootstrap(&config), Err(ScribeError::Config(_))));
    }

    #[test]
    fn test_error_is_transparent() {
        let err: ScribeError = scribe_docs::DocsError::UnknownMethod("FETCH".to_string()).into();
        assert_eq!(err.to_string(), "Unknown HTTP method: FETCH");
    }
}
