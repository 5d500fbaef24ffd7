//! Error types for obsdb-store.

use std::path::PathBuf;

use obsdb_types::ValidationError;

/// Result type for obsdb-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in obsdb-store.
///
/// Row-level problems met while ingesting a stream never show up here; they
/// are absorbed by the ingestion pipeline. Everything in this enum aborts the
/// current operation, and an ingestion that fails is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The database was written by a newer version of obsdb.
    #[error("Unsupported schema version {found} (this build supports up to {supported})")]
    UnsupportedSchema { found: i32, supported: i32 },

    /// The request was rejected before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The observation stream could not be read or framed.
    #[error("Malformed observation stream: {0}")]
    Stream(#[from] csv::Error),

    /// Writing an export failed.
    #[error("Failed to write export: {0}")]
    Export(#[source] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
