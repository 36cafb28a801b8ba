//! Error types for schema conversion.
//!
//! The first four variants are governed by [`ErrorMode`](crate::ErrorMode):
//! they are only surfaced as `Err` when the converter runs in `throw` mode.
//! Arena lookups that fail are programming errors and always propagate.

use thiserror::Error;

/// Errors that can occur while converting a schema graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The converter met a node kind it has no mapping for.
    #[error("unsupported schema node kind '{kind}' at {path}")]
    UnsupportedNodeKind {
        /// Kind reported by the adapter.
        kind: String,
        /// Traversal path to the node.
        path: String,
    },

    /// A self-referential node cycled back to itself before it had a name.
    #[error(
        "circular schema at {path} has no registered name; register the recursive node so it can be emitted as a reference"
    )]
    CircularReferenceWithoutRegistration {
        /// Full traversal path, ending at the node that closed the cycle.
        path: String,
    },

    /// A named node renders differently for input and output.
    #[error(
        "schema '{name}' is used as an input at {input_path} and as an output at {output_path}, \
         and its transforms produce different shapes for each. Either declare an explicit \
         effect direction on the transform, move the transform behind its own named schema, \
         give the transform a manual literal representation, remove the transform, or drop \
         the registration on '{name}' so both shapes are not forced to share one component"
    )]
    ConflictingEffectDirection {
        /// The registered name.
        name: String,
        /// Where the node was rendered as an input.
        input_path: String,
        /// Where the node was rendered as an output.
        output_path: String,
    },

    /// Two distinct nodes were registered under the same component name.
    #[error("schema name '{name}' is already registered by another node (at {path})")]
    DuplicateSchemaName {
        /// The contested name.
        name: String,
        /// Traversal path to the second node.
        path: String,
    },

    /// A node id does not point at a defined node.
    #[error("schema node #{index} is not defined in the arena")]
    UnknownNode {
        /// Arena index.
        index: usize,
    },

    /// A lazy getter id does not point at a registered getter.
    #[error("lazy getter #{index} is not registered in the arena")]
    UnknownGetter {
        /// Getter index.
        index: usize,
    },
}

impl SchemaError {
    /// Create an unsupported node kind error.
    pub fn unsupported(kind: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnsupportedNodeKind {
            kind: kind.into(),
            path: path.into(),
        }
    }

    /// Create a circular reference error.
    pub fn circular(path: impl Into<String>) -> Self {
        Self::CircularReferenceWithoutRegistration { path: path.into() }
    }

    /// Whether the error is subject to the configured error mode.
    ///
    /// Lookup failures always propagate.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::UnknownNode { .. } | Self::UnknownGetter { .. })
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = SchemaError::unsupported("bigint", "#/properties/id");
        let msg = err.to_string();
        assert!(msg.contains("bigint"));
        assert!(msg.contains("#/properties/id"));
    }

    #[test]
    fn test_conflict_message_has_guidance() {
        let err = SchemaError::ConflictingEffectDirection {
            name: "Date".to_string(),
            input_path: "POST /a > requestBody".to_string(),
            output_path: "GET /a > responses/200".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'Date'"));
        assert!(msg.contains("POST /a > requestBody"));
        assert!(msg.contains("GET /a > responses/200"));
        assert!(msg.contains("explicit effect direction"));
    }

    #[test]
    fn test_recoverable() {
        assert!(SchemaError::circular("#").is_recoverable());
        assert!(!SchemaError::UnknownNode { index: 3 }.is_recoverable());
    }
}
