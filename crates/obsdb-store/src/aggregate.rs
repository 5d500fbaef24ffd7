//! Windowed aggregation of hourly samples.
//!
//! A query produces one value per window. Windows are described by a
//! [`WindowSchedule`]: a first window end, a step between ends, a fixed
//! length, and a last end that no window may pass. Each window's value is
//! stamped with its end time.
//!
//! Temperature windows are closed, `[end - length, end]`. Precipitation
//! windows are half-open, `(end - length, end]`, so an hourly accumulation
//! that falls on a boundary is counted by exactly one window.

use time::{Duration, OffsetDateTime, Time, UtcOffset};

use obsdb_types::{
    PrecipitationOb, Site, TemperatureOb, TimeRange, ValidationError, ValidationResult,
};

use crate::error::Result;
use crate::models::timestamp_from_sql;
use crate::store::Store;

/// Hourly amounts below this (and above zero) are trace precipitation.
pub const TRACE_THRESHOLD_IN: f64 = 0.01;

/// A window whose measurable total is below this but which saw a trace is
/// reported as [`TRACE_SENTINEL_IN`].
pub const TRACE_TOTAL_THRESHOLD_IN: f64 = 0.005;

/// Reported total for a window with only trace precipitation.
pub const TRACE_SENTINEL_IN: f64 = 0.001;

/// Most windows a single query may produce.
pub const MAX_WINDOWS: usize = 10_000_000;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// One stored value and the hour it is valid for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample {
    pub valid_time: OffsetDateTime,
    pub value: f64,
}

impl HourlySample {
    pub fn new(valid_time: OffsetDateTime, value: f64) -> Self {
        Self { valid_time, value }
    }
}

/// Which extreme a temperature query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

/// The set of windows a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSchedule {
    first_end: OffsetDateTime,
    length: Duration,
    increment: Duration,
    count: usize,
}

impl WindowSchedule {
    /// Windows ending at `first_end`, then every `increment`, for as long
    /// as the end stays at or before `last_end`.
    ///
    /// Fails when `length` or `increment` is not positive, or when the
    /// schedule would hold more than [`MAX_WINDOWS`] windows. The count is
    /// known before anything is allocated.
    pub fn new(
        first_end: OffsetDateTime,
        last_end: OffsetDateTime,
        length: Duration,
        increment: Duration,
    ) -> ValidationResult<Self> {
        if !length.is_positive() {
            return Err(ValidationError::NonPositiveLength(length));
        }
        if !increment.is_positive() {
            return Err(ValidationError::NonPositiveIncrement(increment));
        }

        let count = if first_end > last_end {
            0
        } else {
            let span = (last_end - first_end).whole_nanoseconds();
            let steps = span / increment.whole_nanoseconds();
            steps
                .checked_add(1)
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n <= MAX_WINDOWS)
                .ok_or_else(|| {
                    ValidationError::SpanTooLarge(format!(
                        "{} windows of {} between {} and {}",
                        steps, increment, first_end, last_end
                    ))
                })?
        };

        Ok(Self {
            first_end,
            length,
            increment,
            count,
        })
    }

    /// One window per day ending at hour `window_end` (0-24, UTC).
    ///
    /// The first window ends at the first such hour on or after
    /// `range.start`; 24 means midnight at the end of the day.
    pub fn daily_ending_at(
        range: TimeRange,
        window_end: u8,
        length: Duration,
    ) -> ValidationResult<Self> {
        range.ensure_non_empty()?;
        if window_end > 24 {
            return Err(ValidationError::WindowEndOutOfRange(window_end));
        }

        let start = range.start().to_offset(UtcOffset::UTC);
        let mut first_end = hour_of_day(start, window_end)?;
        if first_end < start {
            first_end = first_end
                .checked_add(Duration::DAY)
                .ok_or_else(|| past_end_of_time(first_end, Duration::DAY))?;
        }

        Self::new(first_end, range.end(), length, Duration::DAY)
    }

    /// Windows every `increment`, counted from hour `window_offset` (0-24,
    /// UTC) of the day `range.start` falls on. The first window ends at the
    /// first such multiple on or after `range.start`.
    ///
    /// An offset of 0 aligns ends to midnight; 12 with a daily increment
    /// gives 12Z-to-12Z totals.
    pub fn aligned_to_hour(
        range: TimeRange,
        window_offset: u8,
        length: Duration,
        increment: Duration,
    ) -> ValidationResult<Self> {
        range.ensure_non_empty()?;
        if window_offset > 24 {
            return Err(ValidationError::WindowOffsetOutOfRange(window_offset));
        }
        if !increment.is_positive() {
            return Err(ValidationError::NonPositiveIncrement(increment));
        }

        let start = range.start().to_offset(UtcOffset::UTC);
        let anchor = hour_of_day(start, window_offset)?;

        // Smallest whole number of steps from the anchor that reaches start
        let step = increment.whole_nanoseconds();
        let behind = (anchor - start).whole_nanoseconds();
        let steps = -behind.div_euclid(step);
        let shift = duration_from_nanos(steps * step)?;

        let first_end = anchor
            .checked_add(shift)
            .ok_or_else(|| past_end_of_time(anchor, shift))?;

        Self::new(first_end, range.end(), length, increment)
    }

    pub fn window_count(&self) -> usize {
        self.count
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    /// Window end times, ascending.
    pub fn ends(&self) -> impl Iterator<Item = OffsetDateTime> {
        let increment = self.increment;
        std::iter::successors(Some(self.first_end), move |end| end.checked_add(increment))
            .take(self.count)
    }
}

/// `hour` o'clock on the UTC day of `t`, where 24 is the next midnight.
fn hour_of_day(t: OffsetDateTime, hour: u8) -> ValidationResult<OffsetDateTime> {
    let midnight = t.replace_time(Time::MIDNIGHT);
    let offset = Duration::hours(hour.into());
    midnight
        .checked_add(offset)
        .ok_or_else(|| past_end_of_time(midnight, offset))
}

fn past_end_of_time(t: OffsetDateTime, by: Duration) -> ValidationError {
    ValidationError::SpanTooLarge(format!("{} after {} is past the end of time", by, t))
}

fn duration_from_nanos(nanos: i128) -> ValidationResult<Duration> {
    let seconds = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND))
        .map_err(|_| ValidationError::SpanTooLarge(format!("{} ns", nanos)))?;
    // Always in 0..1_000_000_000
    let subsec = nanos.rem_euclid(NANOS_PER_SECOND) as i32;
    Ok(Duration::new(seconds, subsec))
}

/// The largest or smallest value in each closed window. Windows with no
/// samples are NaN.
///
/// `samples` must be sorted by `valid_time`.
pub fn max_min_windows(
    samples: &[HourlySample],
    schedule: &WindowSchedule,
    extreme: Extreme,
) -> Vec<TemperatureOb> {
    let fold: fn(f64, f64) -> f64 = match extreme {
        Extreme::Max => f64::max,
        Extreme::Min => f64::min,
    };

    let mut results = Vec::with_capacity(schedule.window_count());
    let mut first = 0;

    for end in schedule.ends() {
        let start = end - schedule.length();
        while first < samples.len() && samples[first].valid_time < start {
            first += 1;
        }

        let temperature_f = samples[first..]
            .iter()
            .take_while(|s| s.valid_time <= end)
            .map(|s| s.value)
            .fold(f64::NAN, fold);

        results.push(TemperatureOb {
            valid_time: end,
            temperature_f,
        });
    }

    results
}

/// Total precipitation in each half-open window.
///
/// Several samples in the same UTC hour count once, using the last one.
/// Trace amounts add nothing to the total, but a window whose total stays
/// negligible after seeing one reports [`TRACE_SENTINEL_IN`]. Windows with
/// no samples are NaN.
///
/// `samples` must be sorted by `valid_time`.
pub fn precipitation_windows(
    samples: &[HourlySample],
    schedule: &WindowSchedule,
) -> Vec<PrecipitationOb> {
    let mut results = Vec::with_capacity(schedule.window_count());
    let mut first = 0;

    for end in schedule.ends() {
        let start = end - schedule.length();
        while first < samples.len() && samples[first].valid_time <= start {
            first += 1;
        }

        let mut total = PrecipTotal::default();
        for sample in samples[first..].iter().take_while(|s| s.valid_time <= end) {
            total.push(sample);
        }

        results.push(PrecipitationOb {
            valid_time: end,
            precip_in: total.finish(),
        });
    }

    results
}

#[derive(Debug, Default)]
struct PrecipTotal {
    sum: f64,
    trace: bool,
    seen: bool,
    // Latest value in the hour currently being read
    pending: Option<(i64, f64)>,
}

impl PrecipTotal {
    fn push(&mut self, sample: &HourlySample) {
        let hour = sample.valid_time.unix_timestamp().div_euclid(3600);
        if let Some((pending_hour, value)) = self.pending {
            if pending_hour != hour {
                self.add(value);
            }
        }
        self.pending = Some((hour, sample.value));
    }

    fn add(&mut self, value: f64) {
        self.seen = true;
        if value > 0.0 && value < TRACE_THRESHOLD_IN {
            self.trace = true;
        } else {
            self.sum += value;
        }
    }

    fn finish(mut self) -> f64 {
        if let Some((_, value)) = self.pending.take() {
            self.add(value);
        }

        if !self.seen {
            f64::NAN
        } else if self.trace && self.sum < TRACE_TOTAL_THRESHOLD_IN {
            TRACE_SENTINEL_IN
        } else {
            self.sum
        }
    }
}

const TEMPERATURE_SAMPLES_SQL: &str = "SELECT valid_time, t_f FROM obs
     WHERE site = ?1 AND valid_time >= ?2 AND valid_time <= ?3 AND t_f IS NOT NULL
     ORDER BY valid_time ASC";

const PRECIPITATION_SAMPLES_SQL: &str = "SELECT valid_time, precip_in FROM obs
     WHERE site = ?1 AND valid_time >= ?2 AND valid_time <= ?3 AND precip_in IS NOT NULL
     ORDER BY valid_time ASC";

// Aggregation queries
impl Store {
    /// Daily max or min temperature over `range` from cached data only.
    ///
    /// Returns an empty list when the cache holds nothing for the scanned
    /// span, which starts `window_length` before `range`.
    pub fn query_temperatures(
        &self,
        site: &Site,
        range: TimeRange,
        window_end: u8,
        window_length: Duration,
        extreme: Extreme,
    ) -> Result<Vec<TemperatureOb>> {
        let schedule = WindowSchedule::daily_ending_at(range, window_end, window_length)?;
        let samples = self.hourly_samples(TEMPERATURE_SAMPLES_SQL, site, range, window_length)?;
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        Ok(max_min_windows(&samples, &schedule, extreme))
    }

    /// Precipitation totals over `range` from cached data only, for windows
    /// every `window_increment` counted from hour `window_offset` UTC.
    ///
    /// Each window is half-open, `(end - window_length, end]`: a sample
    /// stamped exactly at the window start belongs to the previous window.
    ///
    /// Returns an empty list when the cache holds nothing for the scanned
    /// span, which starts `window_length` before `range`.
    pub fn query_precipitation(
        &self,
        site: &Site,
        range: TimeRange,
        window_length: Duration,
        window_increment: Duration,
        window_offset: u8,
    ) -> Result<Vec<PrecipitationOb>> {
        let schedule =
            WindowSchedule::aligned_to_hour(range, window_offset, window_length, window_increment)?;
        let samples =
            self.hourly_samples(PRECIPITATION_SAMPLES_SQL, site, range, window_length)?;
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        Ok(precipitation_windows(&samples, &schedule))
    }

    fn hourly_samples(
        &self,
        sql: &str,
        site: &Site,
        range: TimeRange,
        window_length: Duration,
    ) -> Result<Vec<HourlySample>> {
        let scan = range.with_earlier_start(window_length)?;
        let mut stmt = self.conn.prepare_cached(sql)?;

        let samples = stmt
            .query_map(
                rusqlite::params![
                    site.as_str(),
                    scan.start().unix_timestamp(),
                    scan.end().unix_timestamp()
                ],
                |row| {
                    Ok(HourlySample {
                        valid_time: timestamp_from_sql(0, row.get(0)?)?,
                        value: row.get(1)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoredObservation;
    use time::macros::datetime;

    const DAY1: OffsetDateTime = datetime!(2024-03-01 00:00 UTC);

    fn range(start: OffsetDateTime, end: OffsetDateTime) -> TimeRange {
        TimeRange::new(start, end).unwrap()
    }

    fn sample(t: OffsetDateTime, value: f64) -> HourlySample {
        HourlySample::new(t, value)
    }

    fn one_day() -> WindowSchedule {
        WindowSchedule::daily_ending_at(range(DAY1, DAY1 + Duration::DAY), 24, Duration::DAY)
            .unwrap()
    }

    #[test]
    fn test_max_and_min_in_one_window() {
        let samples = [
            sample(DAY1 + Duration::hours(6), 5.0),
            sample(DAY1 + Duration::hours(12), 9.0),
            sample(DAY1 + Duration::hours(18), 3.0),
        ];
        let schedule = one_day();
        assert_eq!(schedule.window_count(), 1);

        let max = max_min_windows(&samples, &schedule, Extreme::Max);
        let min = max_min_windows(&samples, &schedule, Extreme::Min);
        assert_eq!(max[0].temperature_f, 9.0);
        assert_eq!(min[0].temperature_f, 3.0);
        assert_eq!(max[0].valid_time, DAY1 + Duration::DAY);
    }

    #[test]
    fn test_temperature_window_is_closed() {
        let samples = [sample(DAY1, 70.0), sample(DAY1 + Duration::DAY, 20.0)];
        let min = max_min_windows(&samples, &one_day(), Extreme::Min);
        assert_eq!(min[0].temperature_f, 20.0);
        let max = max_min_windows(&samples, &one_day(), Extreme::Max);
        assert_eq!(max[0].temperature_f, 70.0);
    }

    #[test]
    fn test_empty_window_is_nan() {
        let samples = [sample(DAY1 + Duration::hours(12), 50.0)];
        let schedule =
            WindowSchedule::daily_ending_at(range(DAY1, DAY1 + Duration::days(3)), 24, Duration::DAY)
                .unwrap();
        assert_eq!(schedule.window_count(), 3);

        let max = max_min_windows(&samples, &schedule, Extreme::Max);
        assert_eq!(max[0].temperature_f, 50.0);
        assert!(max[1].is_missing());
        assert!(max[2].is_missing());

        let precip = precipitation_windows(&[], &schedule);
        assert!(precip.iter().all(|p| p.is_missing()));
    }

    #[test]
    fn test_daily_first_end_follows_window_end_hour() {
        let r = range(datetime!(2024-03-01 07:30 UTC), datetime!(2024-03-05 00:00 UTC));

        let ends: Vec<_> = WindowSchedule::daily_ending_at(r, 6, Duration::DAY)
            .unwrap()
            .ends()
            .collect();
        assert_eq!(
            ends,
            vec![
                datetime!(2024-03-02 06:00 UTC),
                datetime!(2024-03-03 06:00 UTC),
                datetime!(2024-03-04 06:00 UTC),
            ]
        );

        let first = WindowSchedule::daily_ending_at(r, 12, Duration::DAY)
            .unwrap()
            .ends()
            .next();
        assert_eq!(first, Some(datetime!(2024-03-01 12:00 UTC)));
    }

    #[test]
    fn test_daily_schedule_on_last_representable_day() {
        let r = range(datetime!(9999-12-31 12:00 UTC), datetime!(9999-12-31 23:00 UTC));
        let err = WindowSchedule::daily_ending_at(r, 24, Duration::DAY).unwrap_err();
        assert!(matches!(err, ValidationError::SpanTooLarge(_)));

        // Hour 23 still fits
        let schedule = WindowSchedule::daily_ending_at(r, 23, Duration::DAY).unwrap();
        assert_eq!(schedule.ends().next(), Some(datetime!(9999-12-31 23:00 UTC)));

        // Past hour 11 the next window end would be on day 10000
        let err = WindowSchedule::daily_ending_at(r, 11, Duration::DAY).unwrap_err();
        assert!(matches!(err, ValidationError::SpanTooLarge(_)));

        let err = WindowSchedule::aligned_to_hour(r, 24, Duration::DAY, Duration::DAY).unwrap_err();
        assert!(matches!(err, ValidationError::SpanTooLarge(_)));
    }

    #[test]
    fn test_midnight_alignment() {
        let r = range(datetime!(2024-03-01 07:30 UTC), datetime!(2024-03-01 20:00 UTC));
        let ends: Vec<_> = WindowSchedule::aligned_to_hour(r, 0, Duration::hours(6), Duration::hours(6))
            .unwrap()
            .ends()
            .collect();
        assert_eq!(
            ends,
            vec![
                datetime!(2024-03-01 12:00 UTC),
                datetime!(2024-03-01 18:00 UTC),
            ]
        );

        // A start already on a multiple is its own first end
        let r = range(DAY1, DAY1 + Duration::hours(1));
        let first = WindowSchedule::aligned_to_hour(r, 0, Duration::HOUR, Duration::HOUR)
            .unwrap()
            .ends()
            .next();
        assert_eq!(first, Some(DAY1));
    }

    #[test]
    fn test_offset_alignment() {
        // 12Z-to-12Z daily totals
        let r = range(datetime!(2024-03-01 07:30 UTC), datetime!(2024-03-04 00:00 UTC));
        let ends: Vec<_> = WindowSchedule::aligned_to_hour(r, 12, Duration::DAY, Duration::DAY)
            .unwrap()
            .ends()
            .collect();
        assert_eq!(
            ends,
            vec![
                datetime!(2024-03-01 12:00 UTC),
                datetime!(2024-03-02 12:00 UTC),
                datetime!(2024-03-03 12:00 UTC),
            ]
        );

        // Starting after the offset hour moves to the next day
        let r = range(datetime!(2024-03-01 13:00 UTC), datetime!(2024-03-04 00:00 UTC));
        let first = WindowSchedule::aligned_to_hour(r, 12, Duration::DAY, Duration::DAY)
            .unwrap()
            .ends()
            .next();
        assert_eq!(first, Some(datetime!(2024-03-02 12:00 UTC)));

        // Short increments step back from the offset toward the start
        let first = WindowSchedule::aligned_to_hour(
            range(datetime!(2024-03-01 07:30 UTC), datetime!(2024-03-02 00:00 UTC)),
            12,
            Duration::hours(6),
            Duration::hours(3),
        )
        .unwrap()
        .ends()
        .next();
        assert_eq!(first, Some(datetime!(2024-03-01 09:00 UTC)));
    }

    #[test]
    fn test_schedule_validation() {
        let r = range(DAY1, DAY1 + Duration::DAY);

        assert_eq!(
            WindowSchedule::daily_ending_at(r, 25, Duration::DAY),
            Err(ValidationError::WindowEndOutOfRange(25))
        );
        assert_eq!(
            WindowSchedule::daily_ending_at(r, 0, Duration::ZERO),
            Err(ValidationError::NonPositiveLength(Duration::ZERO))
        );
        assert_eq!(
            WindowSchedule::aligned_to_hour(r, 0, Duration::DAY, Duration::hours(-1)),
            Err(ValidationError::NonPositiveIncrement(Duration::hours(-1)))
        );
        assert_eq!(
            WindowSchedule::aligned_to_hour(r, 25, Duration::DAY, Duration::DAY),
            Err(ValidationError::WindowOffsetOutOfRange(25))
        );
        assert_eq!(
            WindowSchedule::daily_ending_at(range(DAY1, DAY1), 0, Duration::DAY),
            Err(ValidationError::EmptyRange(DAY1))
        );
    }

    #[test]
    fn test_schedule_too_large_is_rejected_up_front() {
        let r = range(DAY1, DAY1 + Duration::days(365));
        let err = WindowSchedule::aligned_to_hour(r, 0, Duration::HOUR, Duration::nanoseconds(1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::SpanTooLarge(_)));
    }

    #[test]
    fn test_precipitation_same_hour_uses_last_value() {
        let samples = [
            sample(DAY1 + Duration::hours(10), 0.10),
            sample(DAY1 + Duration::minutes(10 * 60 + 30), 0.15),
        ];
        let precip = precipitation_windows(&samples, &one_day());
        assert_eq!(precip[0].precip_in, 0.15);
    }

    #[test]
    fn test_precipitation_trace_rule() {
        let trace_only = [
            sample(DAY1 + Duration::hours(1), 0.004),
            sample(DAY1 + Duration::hours(2), 0.0),
        ];
        let precip = precipitation_windows(&trace_only, &one_day());
        assert_eq!(precip[0].precip_in, TRACE_SENTINEL_IN);

        let trace_and_rain = [
            sample(DAY1 + Duration::hours(1), 0.004),
            sample(DAY1 + Duration::hours(2), 0.25),
        ];
        let precip = precipitation_windows(&trace_and_rain, &one_day());
        assert_eq!(precip[0].precip_in, 0.25);

        // A lone 0.005 is below the hourly threshold, so it is a trace too
        let half_hundredth = [sample(DAY1 + Duration::hours(1), 0.005)];
        let precip = precipitation_windows(&half_hundredth, &one_day());
        assert_eq!(precip[0].precip_in, TRACE_SENTINEL_IN);

        let dry = [sample(DAY1 + Duration::hours(1), 0.0)];
        let precip = precipitation_windows(&dry, &one_day());
        assert_eq!(precip[0].precip_in, 0.0);
    }

    #[test]
    fn test_precipitation_window_is_half_open() {
        // An hour ending exactly at a window end belongs to that window only
        let samples = [
            sample(DAY1, 0.50),
            sample(DAY1 + Duration::DAY, 0.20),
        ];
        let precip = precipitation_windows(&samples, &one_day());
        assert_eq!(precip.len(), 1);
        assert_eq!(precip[0].precip_in, 0.20);
    }

    #[test]
    fn test_overlapping_windows() {
        let samples: Vec<_> = (1..=48)
            .map(|h| sample(DAY1 + Duration::hours(h), 0.01))
            .collect();
        let r = range(DAY1 + Duration::DAY, DAY1 + Duration::days(2));
        let schedule =
            WindowSchedule::aligned_to_hour(r, 0, Duration::DAY, Duration::hours(6)).unwrap();
        assert_eq!(schedule.window_count(), 5);

        for ob in precipitation_windows(&samples, &schedule) {
            assert!((ob.precip_in - 0.24).abs() < 1e-9, "{:?}", ob);
        }
    }

    #[test]
    fn test_store_queries_scan_back_one_window() {
        let store = Store::open_in_memory().unwrap();
        let site = Site::new("kboi").unwrap();
        for h in 0..48 {
            let t = DAY1 + Duration::hours(h);
            let temperature = if h == 3 { 80.0 } else { 50.0 };
            store
                .upsert(&StoredObservation::new(&site, t, Some(temperature), Some(0.02)))
                .unwrap();
        }

        // The first window ends at day 2 midnight and reaches back into day 1
        let r = range(DAY1 + Duration::DAY, DAY1 + Duration::hours(47));
        let max = store
            .query_temperatures(&site, r, 0, Duration::DAY, Extreme::Max)
            .unwrap();
        assert_eq!(max.len(), 1);
        assert_eq!(max[0].temperature_f, 80.0);

        let precip = store
            .query_precipitation(&site, r, Duration::DAY, Duration::DAY, 0)
            .unwrap();
        assert_eq!(precip.len(), 1);
        assert!((precip[0].precip_in - 0.48).abs() < 1e-9);

        // 12Z-to-12Z total, still scanning one window back
        let r = range(DAY1 + Duration::hours(36), DAY1 + Duration::hours(47));
        let precip = store
            .query_precipitation(&site, r, Duration::DAY, Duration::DAY, 12)
            .unwrap();
        assert_eq!(precip.len(), 1);
        assert_eq!(precip[0].valid_time, DAY1 + Duration::hours(36));
        assert!((precip[0].precip_in - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_store_query_without_rows_is_empty() {
        let store = Store::open_in_memory().unwrap();
        let site = Site::new("kboi").unwrap();
        let r = range(DAY1, DAY1 + Duration::days(2));

        assert!(store
            .query_temperatures(&site, r, 24, Duration::DAY, Extreme::Min)
            .unwrap()
            .is_empty());
        assert!(store
            .query_precipitation(&site, r, Duration::DAY, Duration::DAY, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_store_query_skips_null_temperatures() {
        let store = Store::open_in_memory().unwrap();
        let site = Site::new("kboi").unwrap();
        store
            .upsert(&StoredObservation::new(&site, DAY1 + Duration::hours(5), None, Some(0.1)))
            .unwrap();

        let r = range(DAY1, DAY1 + Duration::DAY);
        assert!(store
            .query_temperatures(&site, r, 24, Duration::DAY, Extreme::Max)
            .unwrap()
            .is_empty());
    }
}
