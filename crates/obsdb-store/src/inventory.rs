//! Inventory analysis: does the cache already cover a time range?
//!
//! The cache is filled from a source that reports roughly once an hour, so
//! "covered" means no two consecutive cached samples are further apart than
//! [`GAP_TOLERANCE`]. A single missed report is not worth a download; a
//! longer absence is reported as a missing range so the caller can fetch it.

use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use obsdb_types::{Site, TimeRange};

use crate::error::Result;
use crate::models::timestamp_from_sql;
use crate::store::Store;

/// Largest spacing between samples that still counts as continuous
/// coverage. Slightly over one hour.
///
/// Tuned for hourly reporting; other cadences need a different value.
pub const GAP_TOLERANCE: Duration = Duration::seconds(4000);

/// Most missing ranges reported for one analysis.
///
/// When a series has more gaps than this, the final range is widened to run
/// to the end of the request, so the caller over-fetches instead of missing
/// data.
pub const MAX_MISSING_RANGES: usize = 128;

/// Result of checking the cache against a time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inventory {
    /// The cache covers the whole range.
    Sufficient,
    /// Some sub-ranges are missing, listed in ascending order.
    Insufficient { missing: Vec<TimeRange> },
}

impl Inventory {
    /// Whether no data is missing.
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Inventory::Sufficient)
    }

    /// The missing ranges, empty when sufficient.
    pub fn missing_ranges(&self) -> &[TimeRange] {
        match self {
            Inventory::Sufficient => &[],
            Inventory::Insufficient { missing } => missing,
        }
    }
}

/// Find the sub-ranges of `range` not covered by `times`.
///
/// `times` must be sorted ascending and lie inside `range`. Leading and
/// trailing edges are held to the same tolerance as interior gaps.
pub fn find_missing_ranges(times: &[OffsetDateTime], range: TimeRange) -> Vec<TimeRange> {
    let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
        return vec![range];
    };

    let mut gaps = GapList::new(range.end());

    if first - range.start() > GAP_TOLERANCE {
        gaps.push(range.start(), first);
    }

    for pair in times.windows(2) {
        if gaps.saturated {
            break;
        }
        let (t0, t1) = (pair[0], pair[1]);
        if t1 - t0 > GAP_TOLERANCE {
            gaps.push(t0, t1);
        }
    }

    if range.end() - last > GAP_TOLERANCE {
        gaps.push(last, range.end());
    }

    gaps.ranges
}

/// Bounded, ascending list of gaps.
struct GapList {
    ranges: Vec<TimeRange>,
    end: OffsetDateTime,
    saturated: bool,
}

impl GapList {
    fn new(end: OffsetDateTime) -> Self {
        Self {
            ranges: Vec::new(),
            end,
            saturated: false,
        }
    }

    fn push(&mut self, from: OffsetDateTime, to: OffsetDateTime) {
        if self.saturated {
            return;
        }

        let to = if self.ranges.len() + 1 >= MAX_MISSING_RANGES {
            warn!(
                "More than {} gaps found; reporting everything after {} as missing",
                MAX_MISSING_RANGES, from
            );
            self.saturated = true;
            self.end
        } else {
            to
        };

        if let Ok(gap) = TimeRange::new(from, to) {
            self.ranges.push(gap);
        }
    }
}

impl Store {
    /// Check whether the cache holds enough data for `site` over `range`.
    ///
    /// A database failure is returned as an error, never as
    /// [`Inventory::Insufficient`].
    pub fn have_inventory(&self, site: &Site, range: TimeRange) -> Result<Inventory> {
        let times = self.valid_times(site, range)?;
        let missing = find_missing_ranges(&times, range);

        debug!(
            "Inventory for {} over {}: {} samples, {} missing ranges",
            site,
            range,
            times.len(),
            missing.len()
        );

        if missing.is_empty() {
            Ok(Inventory::Sufficient)
        } else {
            Ok(Inventory::Insufficient { missing })
        }
    }

    /// Stored valid times for a site inside `range`, ascending.
    fn valid_times(&self, site: &Site, range: TimeRange) -> Result<Vec<OffsetDateTime>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT valid_time FROM obs
             WHERE site = ?1 AND valid_time >= ?2 AND valid_time <= ?3
             ORDER BY valid_time ASC",
        )?;

        let times = stmt
            .query_map(
                rusqlite::params![
                    site.as_str(),
                    range.start().unix_timestamp(),
                    range.end().unix_timestamp()
                ],
                |row| timestamp_from_sql(0, row.get(0)?),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(times)
    }
}
