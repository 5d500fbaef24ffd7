//! Core types for cached weather observations.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use crate::error::{ValidationError, ValidationResult};

/// A closed interval of time, `[start, end]`.
///
/// The only way to build one is [`TimeRange::new`], which rejects ranges
/// whose start is after their end, so every value in circulation satisfies
/// `start <= end`.
///
/// # Examples
///
/// ```
/// use obsdb_types::TimeRange;
/// use time::macros::datetime;
///
/// let range = TimeRange::new(
///     datetime!(2024-01-01 00:00 UTC),
///     datetime!(2024-01-02 00:00 UTC),
/// )
/// .unwrap();
/// assert_eq!(range.duration(), time::Duration::days(1));
///
/// assert!(TimeRange::new(range.end(), range.start()).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimeRange {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    start: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    end: OffsetDateTime,
}

impl TimeRange {
    /// Create a range, failing if `start > end`.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::BackwardsRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a range that must have a non-zero extent (`start < end`).
    ///
    /// Query entry points require this; a zero-length range has no windows.
    pub fn non_empty(start: OffsetDateTime, end: OffsetDateTime) -> ValidationResult<Self> {
        let range = Self::new(start, end)?;
        range.ensure_non_empty()?;
        Ok(range)
    }

    /// Start of the range (inclusive).
    #[must_use]
    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// End of the range (inclusive).
    #[must_use]
    pub fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// Length of the range. Never negative.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `start == end`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Fail with [`ValidationError::EmptyRange`] when `start == end`.
    pub fn ensure_non_empty(&self) -> ValidationResult<()> {
        if self.is_empty() {
            Err(ValidationError::EmptyRange(self.start))
        } else {
            Ok(())
        }
    }

    /// Whether `t` lies inside the range, both ends included.
    #[must_use]
    pub fn contains(&self, t: OffsetDateTime) -> bool {
        self.start <= t && t <= self.end
    }

    /// Move the start of the range earlier by `by`.
    ///
    /// Used to widen a query so that the first window, which ends near
    /// `start`, has its whole length of hourly data available.
    pub fn with_earlier_start(self, by: Duration) -> ValidationResult<Self> {
        let start = self.start.checked_sub(by).ok_or_else(|| {
            ValidationError::SpanTooLarge(format!("cannot move {} back by {}", self.start, by))
        })?;
        Self::new(start, self.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = format_description!("[year]-[month]-[day] [hour][minute]");
        let start = self.start.format(&format).map_err(|_| fmt::Error)?;
        let end = self.end.format(&format).map_err(|_| fmt::Error)?;
        write!(f, "TimeRange [{} -> {}]", start, end)
    }
}

/// A weather station identifier.
///
/// Identifiers are case-insensitive at the remote source, so they are
/// normalized to lowercase once, here, and every lookup and write uses the
/// normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct Site(String);

impl Site {
    /// Normalize a station identifier.
    ///
    /// Surrounding whitespace is trimmed and the identifier is lowercased.
    ///
    /// # Examples
    ///
    /// ```
    /// use obsdb_types::Site;
    ///
    /// let site = Site::new(" KSEA ").unwrap();
    /// assert_eq!(site.as_str(), "ksea");
    /// assert!(Site::new("   ").is_err());
    /// ```
    pub fn new(id: &str) -> ValidationResult<Self> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySite);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// The normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Site {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Site {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A windowed temperature value.
///
/// `valid_time` is the END of the window that produced the value. The
/// window length is whatever the caller asked for; it is not recorded here.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TemperatureOb {
    /// End of the aggregation window.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub valid_time: OffsetDateTime,
    /// Temperature in Fahrenheit, or NaN when the window held no samples.
    pub temperature_f: f64,
}

impl TemperatureOb {
    /// Whether the window had no data.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.temperature_f.is_nan()
    }
}

/// A windowed precipitation accumulation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PrecipitationOb {
    /// End of the accumulation window.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub valid_time: OffsetDateTime,
    /// Accumulated precipitation in inches, or NaN when the window held no
    /// samples. A trace amount is reported as a small positive sentinel.
    pub precip_in: f64,
}

impl PrecipitationOb {
    /// Whether the window had no data.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.precip_in.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;

    #[test]
    fn test_time_range_rejects_backwards() {
        let start = datetime!(2024-03-02 00:00 UTC);
        let end = datetime!(2024-03-01 00:00 UTC);

        let err = TimeRange::new(start, end).unwrap_err();
        assert!(matches!(err, ValidationError::BackwardsRange { .. }));
    }

    #[test]
    fn test_time_range_allows_zero_length() {
        let t = datetime!(2024-03-01 12:00 UTC);
        let range = TimeRange::new(t, t).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.duration(), Duration::ZERO);
    }

    #[test]
    fn test_non_empty_rejects_zero_length() {
        let t = datetime!(2024-03-01 12:00 UTC);
        assert_eq!(
            TimeRange::non_empty(t, t).unwrap_err(),
            ValidationError::EmptyRange(t)
        );
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = TimeRange::new(
            datetime!(2024-03-01 00:00 UTC),
            datetime!(2024-03-01 06:00 UTC),
        )
        .unwrap();

        assert!(range.contains(range.start()));
        assert!(range.contains(range.end()));
        assert!(!range.contains(datetime!(2024-03-01 06:00:01 UTC)));
    }

    #[test]
    fn test_with_earlier_start() {
        let range = TimeRange::new(
            datetime!(2024-03-02 00:00 UTC),
            datetime!(2024-03-03 00:00 UTC),
        )
        .unwrap();

        let widened = range.with_earlier_start(Duration::hours(24)).unwrap();
        assert_eq!(widened.start(), datetime!(2024-03-01 00:00 UTC));
        assert_eq!(widened.end(), range.end());
    }

    #[test]
    fn test_display() {
        let range = TimeRange::new(
            datetime!(2024-03-01 06:30 UTC),
            datetime!(2024-03-02 18:00 UTC),
        )
        .unwrap();
        assert_eq!(
            range.to_string(),
            "TimeRange [2024-03-01 0630 -> 2024-03-02 1800]"
        );
    }

    #[test]
    fn test_site_lowercases() {
        assert_eq!(Site::new("KBOI").unwrap().as_str(), "kboi");
        assert_eq!("MesoWest1".parse::<Site>().unwrap().to_string(), "mesowest1");
    }

    #[test]
    fn test_site_rejects_blank() {
        assert_eq!(Site::new("").unwrap_err(), ValidationError::EmptySite);
    }

    #[test]
    fn test_missing_sentinels() {
        let t = datetime!(2024-03-01 00:00 UTC);
        let temp = TemperatureOb {
            valid_time: t,
            temperature_f: f64::NAN,
        };
        let precip = PrecipitationOb {
            valid_time: t,
            precip_in: 0.0,
        };
        assert!(temp.is_missing());
        assert!(!precip.is_missing());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_temperature_ob_serializes_rfc3339() {
        let ob = TemperatureOb {
            valid_time: datetime!(2024-03-01 12:00 UTC),
            temperature_f: 41.0,
        };
        let json = serde_json::to_string(&ob).unwrap();
        assert!(json.contains("2024-03-01T12:00:00Z"));
        assert!(json.contains("41.0"));
    }

    proptest! {
        #[test]
        fn prop_time_range_invariant(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000) {
            let start = OffsetDateTime::from_unix_timestamp(a).unwrap();
            let end = OffsetDateTime::from_unix_timestamp(b).unwrap();
            let result = TimeRange::new(start, end);
            prop_assert_eq!(result.is_ok(), a <= b);
            if let Ok(range) = result {
                prop_assert!(range.duration() >= Duration::ZERO);
                prop_assert!(range.contains(start));
                prop_assert!(range.contains(end));
            }
        }

        #[test]
        fn prop_site_is_idempotent(id in "[A-Za-z0-9]{1,12}") {
            let once = Site::new(&id).unwrap();
            let twice = Site::new(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
