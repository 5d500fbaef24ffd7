//! Data models for stored data.

use rusqlite::types::Type;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use obsdb_types::Site;

/// An hourly observation stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObservation {
    /// Lowercase station identifier.
    pub site: String,
    /// Time the observation is valid for.
    #[serde(with = "time::serde::rfc3339")]
    pub valid_time: OffsetDateTime,
    /// Temperature in Fahrenheit.
    pub temperature_f: Option<f64>,
    /// One-hour precipitation in inches.
    pub precip_in: Option<f64>,
}

impl StoredObservation {
    /// Create an observation for a site.
    pub fn new(
        site: &Site,
        valid_time: OffsetDateTime,
        temperature_f: Option<f64>,
        precip_in: Option<f64>,
    ) -> Self {
        Self {
            site: site.as_str().to_string(),
            valid_time,
            temperature_f,
            precip_in,
        }
    }
}

/// Per-site summary of what the cache holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSummary {
    /// Lowercase station identifier.
    pub site: String,
    /// Number of cached observations.
    pub count: u64,
    /// Oldest cached valid time.
    #[serde(with = "time::serde::rfc3339")]
    pub first: OffsetDateTime,
    /// Newest cached valid time.
    #[serde(with = "time::serde::rfc3339")]
    pub last: OffsetDateTime,
}

/// Convert a stored unix timestamp, reporting bad values as a column
/// conversion failure instead of panicking.
pub(crate) fn timestamp_from_sql(idx: usize, ts: i64) -> rusqlite::Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

/// Map a row of `site, valid_time, t_f, precip_in` into a [`StoredObservation`].
pub(crate) fn observation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredObservation> {
    Ok(StoredObservation {
        site: row.get(0)?,
        valid_time: timestamp_from_sql(1, row.get(1)?)?,
        temperature_f: row.get(2)?,
        precip_in: row.get(3)?,
    })
}
