//! Error types for the simulation host.

use std::path::PathBuf;

use nebula_core::CoreError;
use thiserror::Error;

/// Host-level errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown fields.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config parsed but a value is out of range.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Core runtime failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// `RUST_LOG` or a built-in log directive could not be parsed.
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber is already installed.
    #[error("failed to install logger: {0}")]
    LogInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Result type for host operations.
pub type EngineResult<T> = Result<T, EngineError>;
