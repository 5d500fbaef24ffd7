//! Validation errors shared by every obsdb crate.

use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Errors raised when a request is malformed.
///
/// These are always detected before any I/O is attempted, so a caller that
/// receives one knows the store and the network were never touched.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The start of a time range is after its end.
    #[error("Backwards time range: start {start} is after end {end}")]
    BackwardsRange {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },

    /// A query range has no extent.
    #[error("Empty time range at {0}")]
    EmptyRange(OffsetDateTime),

    /// The site identifier is blank.
    #[error("Site identifier must not be empty")]
    EmptySite,

    /// The window end hour is not a valid hour of the day.
    #[error("Window end hour {0} is out of range, expected 0-24")]
    WindowEndOutOfRange(u8),

    /// The precipitation alignment hour is not a valid hour of the day.
    #[error("Window offset hour {0} is out of range, expected 0-24")]
    WindowOffsetOutOfRange(u8),

    /// The window length is zero or negative.
    #[error("Window length must be positive, got {0}")]
    NonPositiveLength(Duration),

    /// The window increment is zero or negative.
    #[error("Window increment must be positive, got {0}")]
    NonPositiveIncrement(Duration),

    /// The number of output windows cannot be represented.
    #[error("Requested span is too large: {0}")]
    SpanTooLarge(String),
}

/// Result type alias using obsdb-types' ValidationError type.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
