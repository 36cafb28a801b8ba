//! Structured logging for Scribe.
//!
//! Scribe logs through `tracing`. This crate owns the subscriber setup and
//! the standard field names used across the workspace:
//!
//! - `info` when an API document is (re)built
//! - `debug` per route/method merge and per named schema
//! - `warn` when schema conversion degrades under the `warn` error mode
//!
//! # Example
//!
//! ```rust,ignore
//! use scribe_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_service_name("orders"))?;
//! ```

mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};
