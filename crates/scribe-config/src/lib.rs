//! Typed configuration for Scribe.
//!
//! Configuration is loaded in layers (defaults → file → `.env` → environment)
//! into a [`ScribeConfig`] with four sections:
//!
//! - [`DocumentConfig`] - title, version, description, target OpenAPI version
//! - [`SchemaConfig`] - converter error mode, union style, reference prefix
//! - [`FilterConfig`] - path, method, tag and static-file exclusions
//! - [`LoggingConfig`] - log level and output format
//!
//! Unknown fields are rejected.
//!
//! # Example
//!
//! ```no_run
//! use scribe_config::ConfigLoader;
//!
//! # fn main() -> Result<(), scribe_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("scribe.toml")?
//!     .with_env_prefix("SCRIBE")
//!     .load()?;
//!
//! println!("Generating {} v{}", config.document.title, config.document.version);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [document]
//! title = "Orders API"
//! version = "2.1.0"
//! openapi = "3.1"
//!
//! [schema]
//! error_mode = "warn"
//! union_style = "any_of"
//! ref_prefix = "#/components/schemas/"
//!
//! [filter]
//! exclude_static_files = true
//! exclude_paths = ["/health", "re:^/internal/"]
//! exclude_methods = ["OPTIONS"]
//! exclude_tags = ["internal"]
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```

mod config;
mod error;
mod loader;
mod schema;

pub use config::{ScribeConfig, ScribeConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    DocumentConfig, FilterConfig, LoggingConfig, SchemaConfig, KNOWN_METHODS, REGEX_PREFIX,
};
