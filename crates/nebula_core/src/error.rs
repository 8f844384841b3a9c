//! Error types for the core runtime.
//!
//! Structural misuse of the scene (reparenting the root, stale handles, missing
//! components) is not an error: those operations are silent no-ops or return `None`.
//! Only resource acquisition can fail.

use thiserror::Error;

/// Core runtime errors.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The OS refused to start a collision worker thread.
    #[error("failed to spawn collision worker {index}: {source}")]
    WorkerSpawn {
        /// Index of the worker that failed to start.
        index: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A pool was requested with no workers.
    #[error("collision pool needs at least one worker")]
    EmptyPool,
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
