//! In-memory observation source for testing.
//!
//! [`MockSource`] serves CSV bodies built from a fixed list of hourly
//! observations, records every request it receives, and can be told to fail.
//! It implements [`ObservationSource`], so an [`ObsCache`](crate::ObsCache)
//! can be exercised without a network.

use std::fmt::Write as _;
use std::io::{Cursor, Read};
use std::sync::{Mutex, PoisonError};

use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use obsdb_types::{Site, TimeRange};

use crate::error::TransportError;
use crate::source::ObservationSource;

/// A mock observation source.
///
/// # Example
///
/// ```
/// use obsdb_core::{MockSource, ObservationSource};
/// use obsdb_types::{Site, TimeRange};
/// use std::io::Read;
/// use time::macros::datetime;
///
/// let start = datetime!(2024-03-01 00:00 UTC);
/// let source = MockSource::new().with_hourly(start, 24, |_| 40.0, |_| 0.0);
///
/// let site = Site::new("kboi").unwrap();
/// let range = TimeRange::new(start, datetime!(2024-03-01 05:00 UTC)).unwrap();
/// let mut body = String::new();
/// source.open(&site, range).unwrap().read_to_string(&mut body).unwrap();
///
/// assert_eq!(body.lines().count(), 2 + 6);
/// assert_eq!(source.requests(), vec![(site, range)]);
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    observations: Vec<(OffsetDateTime, Option<f64>, Option<f64>)>,
    requests: Mutex<Vec<(Site, TimeRange)>>,
    // Requests served before failing, and the status to fail with
    failure: Option<(usize, u16)>,
}

impl MockSource {
    /// A source with no observations.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that answers every request with an HTTP error status.
    pub fn failing(status: u16) -> Self {
        Self::new().fail_after(0, status)
    }

    /// Serve the first `served` requests, then fail every later one with
    /// an HTTP error status.
    pub fn fail_after(mut self, served: usize, status: u16) -> Self {
        self.failure = Some((served, status));
        self
    }

    /// Add one observation. `None` values are served as empty fields.
    pub fn with_observation(
        mut self,
        valid_time: OffsetDateTime,
        temperature_f: Option<f64>,
        precip_in: Option<f64>,
    ) -> Self {
        self.observations.push((valid_time, temperature_f, precip_in));
        self.observations.sort_by_key(|(t, _, _)| *t);
        self
    }

    /// Add `hours` consecutive hourly observations starting at `start`.
    pub fn with_hourly(
        mut self,
        start: OffsetDateTime,
        hours: i64,
        temperature_f: impl Fn(OffsetDateTime) -> f64,
        precip_in: impl Fn(OffsetDateTime) -> f64,
    ) -> Self {
        for h in 0..hours {
            let t = start + Duration::hours(h);
            self.observations
                .push((t, Some(temperature_f(t)), Some(precip_in(t))));
        }
        self.observations.sort_by_key(|(t, _, _)| *t);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<(Site, TimeRange)> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn render(&self, site: &Site, range: TimeRange) -> Result<String, TransportError> {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
        let station = site.as_str().to_uppercase();
        let unavailable = |e: std::fmt::Error| TransportError::Unavailable(e.to_string());

        let mut body = String::new();
        writeln!(body, "# STATION: {}", station).map_err(unavailable)?;
        writeln!(
            body,
            "Station_ID,Date_Time,air_temp_set_1,precip_accum_one_hour_set_1"
        )
        .map_err(unavailable)?;

        for (t, temperature, precip) in self.observations.iter().filter(|(t, _, _)| range.contains(*t)) {
            let t = t
                .format(format)
                .map_err(|e| TransportError::Unavailable(e.to_string()))?;
            let temperature = temperature.map(|v| v.to_string()).unwrap_or_default();
            let precip = precip.map(|v| v.to_string()).unwrap_or_default();
            writeln!(body, "{},{},{},{}", station, t, temperature, precip).map_err(unavailable)?;
        }

        Ok(body)
    }
}

impl ObservationSource for MockSource {
    fn open(&self, site: &Site, range: TimeRange) -> Result<Box<dyn Read + '_>, TransportError> {
        let earlier = {
            let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
            requests.push((site.clone(), range));
            requests.len() - 1
        };

        if let Some((served, status)) = self.failure {
            if earlier >= served {
                return Err(TransportError::Status {
                    status,
                    site: site.to_string(),
                });
            }
        }

        let body = self.render(site, range)?;
        Ok(Box::new(Cursor::new(body.into_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn read_all(mut r: Box<dyn Read + '_>) -> String {
        let mut s = String::new();
        r.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn test_serves_only_requested_range() {
        let start = datetime!(2024-03-01 00:00 UTC);
        let source = MockSource::new().with_hourly(start, 48, |_| 40.0, |_| 0.01);
        let site = Site::new("kboi").unwrap();
        let range = TimeRange::new(start + Duration::hours(10), start + Duration::hours(12)).unwrap();

        let body = read_all(source.open(&site, range).unwrap());
        let rows: Vec<_> = body.lines().skip(2).collect();
        assert_eq!(
            rows,
            vec![
                "KBOI,2024-03-01T10:00:00Z,40,0.01",
                "KBOI,2024-03-01T11:00:00Z,40,0.01",
                "KBOI,2024-03-01T12:00:00Z,40,0.01",
            ]
        );
    }

    #[test]
    fn test_missing_values_are_blank() {
        let t = datetime!(2024-03-01 00:00 UTC);
        let source = MockSource::new().with_observation(t, None, None);
        let site = Site::new("kboi").unwrap();

        let body = read_all(source.open(&site, TimeRange::new(t, t).unwrap()).unwrap());
        assert_eq!(body.lines().last(), Some("KBOI,2024-03-01T00:00:00Z,,"));
    }

    #[test]
    fn test_failing_source_records_request() {
        let source = MockSource::failing(503);
        let site = Site::new("kboi").unwrap();
        let t = datetime!(2024-03-01 00:00 UTC);

        let result = source.open(&site, TimeRange::new(t, t).unwrap());
        assert!(matches!(
            result,
            Err(TransportError::Status { status: 503, .. })
        ));
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn test_fail_after_serves_first_requests() {
        let t = datetime!(2024-03-01 00:00 UTC);
        let source = MockSource::new()
            .with_hourly(t, 4, |_| 40.0, |_| 0.0)
            .fail_after(1, 500);
        let site = Site::new("kboi").unwrap();
        let r = TimeRange::new(t, t + Duration::hours(3)).unwrap();

        assert!(source.open(&site, r).is_ok());
        assert!(matches!(
            source.open(&site, r),
            Err(TransportError::Status { status: 500, .. })
        ));
        assert_eq!(source.request_count(), 2);
    }
}
