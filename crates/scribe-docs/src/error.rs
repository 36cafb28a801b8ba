//! Error types for document assembly.
//!
//! Schema conversion failures bubble up from [`scribe_schema`] unchanged;
//! everything else here concerns route declarations and resolvers.

use scribe_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur while building an API document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// A schema could not be converted.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A route declaration is malformed.
    #[error("Invalid route '{path}': {reason}")]
    InvalidRoute {
        /// The declared path template.
        path: String,
        /// Why the route was rejected.
        reason: String,
    },

    /// An exclusion pattern is not a valid regular expression.
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compilation error.
        source: regex::Error,
    },

    /// A fragment resolver failed.
    #[error("Resolver for {method} {path} failed: {reason}")]
    Resolver {
        /// Path of the route being resolved.
        path: String,
        /// Method of the route being resolved.
        method: String,
        /// The reason reported by the resolver.
        reason: String,
    },

    /// A method name is not one of the documented HTTP methods.
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),
}

impl DocsError {
    /// Create an invalid route error.
    pub fn invalid_route(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a resolver error.
    pub fn resolver(
        path: impl Into<String>,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Resolver {
            path: path.into(),
            method: method.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
