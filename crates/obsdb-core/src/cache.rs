//! The cache orchestrator.
//!
//! [`ObsCache`] answers windowed queries from the local store, downloading
//! whatever the store is missing first. Each query:
//!
//! 1. validates its parameters (no I/O happens for a bad request),
//! 2. widens the range by one window length, so the first window is full,
//! 3. asks the store for its inventory of the widened range,
//! 4. downloads and ingests each missing range, one transaction per download,
//! 5. aggregates from the store.
//!
//! # Example
//!
//! ```
//! use obsdb_core::{MockSource, ObsCache};
//! use obsdb_store::Store;
//! use obsdb_types::TimeRange;
//! use time::{Duration, macros::datetime};
//!
//! let start = datetime!(2024-03-01 00:00 UTC);
//! let source = MockSource::new().with_hourly(start, 72, |_| 40.0, |_| 0.0);
//! let mut cache = ObsCache::new(Store::open_in_memory()?, source);
//!
//! let range = TimeRange::new(start + Duration::DAY, start + Duration::days(2))?;
//! let highs = cache.query_max_temperature("KBOI", range, 24, Duration::DAY)?;
//! assert_eq!(highs.len(), 1);
//! assert_eq!(highs[0].temperature_f, 40.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;
use time::Duration;
use tracing::{debug, info};

use obsdb_store::{Extreme, IngestStats, Store, WindowSchedule};
use obsdb_types::{PrecipitationOb, Site, TemperatureOb, TimeRange};

use crate::error::Result;
use crate::source::ObservationSource;

/// What a refresh did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Ranges that were missing and have been downloaded.
    pub fetched: Vec<TimeRange>,
    /// Ingestion counts summed over all downloads.
    pub stats: IngestStats,
}

impl RefreshReport {
    /// Whether the cache already covered the range.
    pub fn was_sufficient(&self) -> bool {
        self.fetched.is_empty()
    }
}

/// A store paired with a source to fill it from.
#[derive(Debug)]
pub struct ObsCache<S> {
    store: Store,
    source: S,
}

impl<S: ObservationSource> ObsCache<S> {
    pub fn new(store: Store, source: S) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Close the store, running its retention sweep. Returns the number of
    /// rows the sweep removed.
    pub fn close(self) -> Result<usize> {
        Ok(self.store.close()?)
    }

    /// Download whatever the cache is missing for `site` over `range`.
    pub fn refresh(&mut self, site: &str, range: TimeRange) -> Result<RefreshReport> {
        let site = Site::new(site)?;
        range.ensure_non_empty()?;
        self.fill(&site, range)
    }

    /// Daily maximum temperature for windows ending at hour `window_end`.
    pub fn query_max_temperature(
        &mut self,
        site: &str,
        range: TimeRange,
        window_end: u8,
        window_length: Duration,
    ) -> Result<Vec<TemperatureOb>> {
        self.query_temperatures(site, range, window_end, window_length, Extreme::Max)
    }

    /// Daily minimum temperature for windows ending at hour `window_end`.
    pub fn query_min_temperature(
        &mut self,
        site: &str,
        range: TimeRange,
        window_end: u8,
        window_length: Duration,
    ) -> Result<Vec<TemperatureOb>> {
        self.query_temperatures(site, range, window_end, window_length, Extreme::Min)
    }

    /// Accumulated precipitation for windows every `window_increment`,
    /// counted from hour `window_offset` (0-24) of the UTC day.
    pub fn query_precipitation(
        &mut self,
        site: &str,
        range: TimeRange,
        window_length: Duration,
        window_increment: Duration,
        window_offset: u8,
    ) -> Result<Vec<PrecipitationOb>> {
        let site = Site::new(site)?;
        WindowSchedule::aligned_to_hour(range, window_offset, window_length, window_increment)?;

        self.fill(&site, range.with_earlier_start(window_length)?)?;

        Ok(self.store.query_precipitation(
            &site,
            range,
            window_length,
            window_increment,
            window_offset,
        )?)
    }

    fn query_temperatures(
        &mut self,
        site: &str,
        range: TimeRange,
        window_end: u8,
        window_length: Duration,
        extreme: Extreme,
    ) -> Result<Vec<TemperatureOb>> {
        let site = Site::new(site)?;
        WindowSchedule::daily_ending_at(range, window_end, window_length)?;

        self.fill(&site, range.with_earlier_start(window_length)?)?;

        Ok(self
            .store
            .query_temperatures(&site, range, window_end, window_length, extreme)?)
    }

    fn fill(&mut self, site: &Site, range: TimeRange) -> Result<RefreshReport> {
        let inventory = self.store.have_inventory(site, range)?;
        let mut report = RefreshReport::default();

        if inventory.is_sufficient() {
            debug!("Cache covers {} for {}", range, site);
            return Ok(report);
        }

        for missing in inventory.missing_ranges() {
            let body = self.source.open(site, *missing)?;
            report.stats += self.store.ingest_csv(site, body)?;
            report.fetched.push(*missing);
        }

        info!(
            "Filled {} gaps for {} ({} rows)",
            report.fetched.len(),
            site,
            report.stats.rows_upserted
        );
        Ok(report)
    }
}
