//! Error types for obsdb-core.

use obsdb_types::ValidationError;

/// Result type for obsdb-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from an [`ObservationSource`](crate::ObservationSource).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured base URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP request could not be made or completed.
    ///
    /// The request URL is stripped before the error is stored, since it
    /// carries the API token.
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The source answered with a non-success status.
    #[error("Observation source returned HTTP {status} for {site}")]
    Status { status: u16, site: String },

    /// No source is available for this request.
    #[error("Observation source unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Request(e.without_url())
    }
}

/// Errors returned by [`ObsCache`](crate::ObsCache).
///
/// A query that fails returns no partial result. Downloads that finished
/// before the failure stay in the cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request was rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The local cache failed.
    #[error("Cache error: {0}")]
    Store(#[from] obsdb_store::Error),

    /// A download failed.
    #[error("Download failed: {0}")]
    Transport(#[from] TransportError),
}
