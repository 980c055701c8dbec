// Blocking Errors - one enum for every failure a run can surface
// Recoverable conditions (missing cells, odd row labels) never reach this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockingError {
    // ========================================================================
    // CONFIGURATION
    // ========================================================================
    /// Engine name outside the two supported engines.
    #[error("unknown engine: {0} (expected 'memory' or 'sqlite')")]
    UnknownEngine(String),

    /// Out-of-core engine requested but not compiled in.
    #[error(
        "out-of-core engine requested but this build has no SQLite support; \
         rebuild with `--features sqlite` or use `--engine memory`"
    )]
    EngineUnavailable,

    // ========================================================================
    // INPUT
    // ========================================================================
    /// Requested column missing from the CSV header.
    #[error("column '{column}' not found in input header")]
    MissingColumn { column: String },

    /// Input file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // ========================================================================
    // STORE
    // ========================================================================
    /// Table name that cannot be used as a bare SQL identifier.
    #[error("invalid table name: {0}")]
    InvalidTableName(String),

    /// Append or join against a table that was never created.
    #[error("table not found in block store: {0}")]
    UnknownTable(String),

    // ========================================================================
    // PASSTHROUGH
    // ========================================================================
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for blocking operations.
pub type Result<T> = std::result::Result<T, BlockingError>;
