//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level or filter directive could not be parsed.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed, or installation failed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Unknown output format name.
    #[error("Unknown log format '{0}' (expected 'json' or 'pretty')")]
    UnknownFormat(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
