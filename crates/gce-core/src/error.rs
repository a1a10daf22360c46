//! Error types for the Graph Construction Engine.
//!
//! Per the pipeline's error-handling design, almost nothing here is fatal:
//! absent tables, corrupt metadata, and unresolvable edge endpoints all
//! degrade to safe defaults in place rather than propagating. `GceError`
//! exists for the small set of things that really can't be recovered from
//! in-place: the store file not existing, or a caller passing bad arguments.

use thiserror::Error;

/// Errors from the Store Reader's interaction with the underlying SQLite file.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file does not exist or could not be opened at all.
    #[error("store not found: {0}")]
    NotFound(String),
    /// A `rusqlite` call failed in a way that isn't "table doesn't exist"
    /// (which is handled by [`crate::store::probe_table`] instead of erroring).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Top-level error for the graph-building pipeline.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GceError {
    /// The intelligence store could not be opened.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// A caller passed an invalid argument (e.g. a negative threshold).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for fallible GCE operations.
pub type Result<T> = std::result::Result<T, GceError>;
