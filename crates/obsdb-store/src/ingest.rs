//! Ingestion of delimited observation streams.
//!
//! A stream is a CSV body as served by the SynopticLabs timeseries API:
//! optional `#` comment lines, one header row naming the columns, then one
//! row per observation. [`RowParser`] turns the fields of each row into a
//! [`RowOutcome`]; [`Store::ingest_csv`] feeds a whole stream through it and
//! upserts the good rows inside a single transaction.
//!
//! Bad rows are skipped and counted. Only a stream failure (I/O, CSV framing)
//! or a database failure aborts the ingestion, and then nothing is kept.

use std::io::Read;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tracing::{debug, info, trace, warn};

use obsdb_types::Site;

use crate::error::Result;
use crate::store::{Store, UPSERT_SQL};

/// Where the parser is within a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No header row seen yet.
    AwaitingHeader,
    /// Header seen; rows are observations.
    ParsingRows,
}

/// Why a row was discarded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("Column {column} is not valid UTF-8")]
    Encoding { column: usize },

    #[error("No valid time")]
    MissingValidTime,

    #[error("Unparseable valid time {0:?}")]
    ValidTime(String),

    #[error("Valid time is the Unix epoch")]
    ZeroValidTime,

    #[error("No temperature")]
    MissingTemperature,

    #[error("Unparseable temperature {0:?}")]
    Temperature(String),

    #[error("Unparseable precipitation {0:?}")]
    Precipitation(String),
}

/// A validated observation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRow {
    pub valid_time: OffsetDateTime,
    pub temperature_f: f64,
    /// Zero when the source left the field blank.
    pub precip_in: f64,
}

/// Result of finishing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// The row was taken as the header.
    Header,
    /// The row started with `#`.
    Comment,
    /// A usable observation.
    Row(ParsedRow),
    /// The row was discarded.
    Invalid(RowError),
}

/// Counts from one ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Rows written (inserted or replaced).
    pub rows_upserted: u64,
    /// Rows discarded as invalid.
    pub rows_skipped: u64,
    /// Comment rows.
    pub comment_rows: u64,
}

impl std::ops::AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.rows_upserted += other.rows_upserted;
        self.rows_skipped += other.rows_skipped;
        self.comment_rows += other.comment_rows;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    ValidTime,
    Temperature,
    Precipitation,
}

/// Column positions learned from the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColumnRoles {
    valid_time: Option<usize>,
    temperature: Option<usize>,
    precipitation: Option<usize>,
}

impl ColumnRoles {
    /// Assign a role to `column` if its header text names one. The first
    /// column to claim a role keeps it.
    fn assign(&mut self, column: usize, text: &str) {
        let name = text.to_ascii_lowercase();
        let slot = if name.contains("valid_time") || name.contains("date_time") {
            &mut self.valid_time
        } else if name.contains("air_temp") {
            &mut self.temperature
        } else if name.contains("precip_accum") {
            &mut self.precipitation
        } else {
            return;
        };
        slot.get_or_insert(column);
    }

    fn role_of(&self, column: usize) -> Option<Role> {
        if self.valid_time == Some(column) {
            Some(Role::ValidTime)
        } else if self.temperature == Some(column) {
            Some(Role::Temperature)
        } else if self.precipitation == Some(column) {
            Some(Role::Precipitation)
        } else {
            None
        }
    }
}

/// Field-at-a-time row parser.
///
/// Call [`field`](Self::field) for each field of a row in order, then
/// [`end_row`](Self::end_row). Scratch state is reset after every row.
#[derive(Debug)]
pub struct RowParser {
    state: ParserState,
    roles: ColumnRoles,
    column: usize,
    comment: bool,
    valid_time: Option<OffsetDateTime>,
    temperature_f: Option<f64>,
    precip_in: Option<f64>,
    error: Option<RowError>,
}

impl Default for RowParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RowParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::AwaitingHeader,
            roles: ColumnRoles::default(),
            column: 0,
            comment: false,
            valid_time: None,
            temperature_f: None,
            precip_in: None,
            error: None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Consume one field. An empty field is a missing value.
    pub fn field(&mut self, raw: &[u8]) {
        let column = self.column;
        self.column += 1;

        if self.comment || self.error.is_some() {
            return;
        }
        if column == 0 && raw.first() == Some(&b'#') {
            self.comment = true;
            return;
        }

        let role = match self.state {
            ParserState::AwaitingHeader => None,
            ParserState::ParsingRows => match self.roles.role_of(column) {
                Some(role) => Some(role),
                None => return,
            },
        };

        let Ok(text) = std::str::from_utf8(raw) else {
            self.error = Some(RowError::Encoding { column });
            return;
        };
        let text = text.trim();

        match role {
            None => self.roles.assign(column, text),
            Some(_) if text.is_empty() => {}
            Some(Role::ValidTime) => match parse_valid_time(text) {
                Some(t) => self.valid_time = Some(t),
                None => self.error = Some(RowError::ValidTime(text.to_string())),
            },
            Some(Role::Temperature) => match parse_value(text) {
                Some(v) => self.temperature_f = Some(v),
                None => self.error = Some(RowError::Temperature(text.to_string())),
            },
            Some(Role::Precipitation) => match parse_value(text) {
                Some(v) => self.precip_in = Some(v),
                None => self.error = Some(RowError::Precipitation(text.to_string())),
            },
        }
    }

    /// Finish the current row.
    pub fn end_row(&mut self) -> RowOutcome {
        let outcome = if self.comment {
            RowOutcome::Comment
        } else {
            match self.state {
                ParserState::AwaitingHeader => self.finish_header(),
                ParserState::ParsingRows => self.finish_row(),
            }
        };

        self.column = 0;
        self.comment = false;
        self.valid_time = None;
        self.temperature_f = None;
        self.precip_in = None;
        self.error = None;

        outcome
    }

    fn finish_header(&mut self) -> RowOutcome {
        if let Some(error) = self.error.take() {
            self.roles = ColumnRoles::default();
            return RowOutcome::Invalid(error);
        }

        if self.roles.valid_time.is_none() || self.roles.temperature.is_none() {
            warn!(
                "Header has no valid time or temperature column ({:?}); every row will be skipped",
                self.roles
            );
        }
        self.state = ParserState::ParsingRows;
        RowOutcome::Header
    }

    fn finish_row(&mut self) -> RowOutcome {
        if let Some(error) = self.error.take() {
            return RowOutcome::Invalid(error);
        }
        let Some(valid_time) = self.valid_time else {
            return RowOutcome::Invalid(RowError::MissingValidTime);
        };
        if valid_time.unix_timestamp() == 0 {
            return RowOutcome::Invalid(RowError::ZeroValidTime);
        }
        let Some(temperature_f) = self.temperature_f else {
            return RowOutcome::Invalid(RowError::MissingTemperature);
        };

        RowOutcome::Row(ParsedRow {
            valid_time,
            temperature_f,
            precip_in: self.precip_in.unwrap_or(0.0),
        })
    }
}

fn parse_valid_time(text: &str) -> Option<OffsetDateTime> {
    let compact = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    if let Ok(t) = PrimitiveDateTime::parse(text, compact) {
        return Some(t.assume_utc());
    }
    OffsetDateTime::parse(text, &Rfc3339)
        .ok()
        .map(|t| t.to_offset(UtcOffset::UTC))
}

fn parse_value(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

// Ingestion
impl Store {
    /// Ingest a delimited observation stream for `site` in one transaction.
    ///
    /// The upsert statement is prepared before the reader is touched, so a
    /// store that cannot accept writes fails without consuming the stream.
    /// A read or framing error part way through rolls back every row of this
    /// stream.
    pub fn ingest_csv<R: Read>(&mut self, site: &Site, reader: R) -> Result<IngestStats> {
        debug!("Ingesting observations for {}", site);

        let tx = self.conn.transaction()?;
        let mut stats = IngestStats::default();
        {
            let mut upsert = tx.prepare_cached(UPSERT_SQL)?;

            let mut csv_reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(reader);
            let mut record = csv::ByteRecord::new();
            let mut parser = RowParser::new();

            while csv_reader.read_byte_record(&mut record)? {
                for field in record.iter() {
                    parser.field(field);
                }

                match parser.end_row() {
                    RowOutcome::Header => debug!("Header parsed for {}", site),
                    RowOutcome::Comment => stats.comment_rows += 1,
                    RowOutcome::Row(row) => {
                        upsert.execute(rusqlite::params![
                            site.as_str(),
                            row.valid_time.unix_timestamp(),
                            row.temperature_f,
                            row.precip_in,
                        ])?;
                        stats.rows_upserted += 1;
                    }
                    RowOutcome::Invalid(reason) => {
                        trace!("Skipping row {:?}: {}", record.position(), reason);
                        stats.rows_skipped += 1;
                    }
                }
            }
        }
        tx.commit()?;

        info!(
            "Ingested {} observations for {} ({} skipped)",
            stats.rows_upserted, site, stats.rows_skipped
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use obsdb_types::TimeRange;
    use std::io::{self, Cursor};
    use time::macros::datetime;

    const BODY: &str = "\
# STATION: KBOI
# UNITS: fahrenheit, inches
Station_ID,Date_Time,air_temp_set_1,precip_accum_one_hour_set_1
KBOI,2024-03-01T00:00:00Z,41.0,0.02
KBOI,2024-03-01T01:00:00Z,40.0,
KBOI,2024-03-01T02:00:00Z,,0.01
KBOI,2024-03-01T03:00:00Z,38.5,0.00
";

    fn feed(parser: &mut RowParser, line: &str) -> RowOutcome {
        for field in line.split(',') {
            parser.field(field.as_bytes());
        }
        parser.end_row()
    }

    fn header(parser: &mut RowParser) {
        assert_eq!(
            feed(parser, "Station_ID,Date_Time,air_temp_set_1,precip_accum_one_hour_set_1"),
            RowOutcome::Header
        );
    }

    fn site() -> Site {
        Site::new("kboi").unwrap()
    }

    fn march() -> TimeRange {
        TimeRange::new(
            datetime!(2024-03-01 00:00 UTC),
            datetime!(2024-03-02 00:00 UTC),
        )
        .unwrap()
    }

    #[test]
    fn test_comments_before_header() {
        let mut parser = RowParser::new();
        assert_eq!(feed(&mut parser, "# STATION: KBOI"), RowOutcome::Comment);
        assert_eq!(parser.state(), ParserState::AwaitingHeader);

        header(&mut parser);
        assert_eq!(parser.state(), ParserState::ParsingRows);
        assert_eq!(feed(&mut parser, "#,trailing note"), RowOutcome::Comment);
    }

    #[test]
    fn test_header_roles_by_name() {
        let mut parser = RowParser::new();
        assert_eq!(
            feed(&mut parser, "precip_accum_one_hour,AIR_TEMP,other,valid_time"),
            RowOutcome::Header
        );

        assert_eq!(
            feed(&mut parser, "0.05,61.0,ignored,2024-03-01T00:00:00Z"),
            RowOutcome::Row(ParsedRow {
                valid_time: datetime!(2024-03-01 00:00 UTC),
                temperature_f: 61.0,
                precip_in: 0.05,
            })
        );
    }

    #[test]
    fn test_missing_precipitation_is_zero() {
        let mut parser = RowParser::new();
        header(&mut parser);

        let RowOutcome::Row(row) = feed(&mut parser, "KBOI,2024-03-01T01:00:00Z,40.0,") else {
            panic!("expected a row");
        };
        assert_eq!(row.precip_in, 0.0);
    }

    #[test]
    fn test_missing_or_bad_temperature_is_invalid() {
        let mut parser = RowParser::new();
        header(&mut parser);

        assert_eq!(
            feed(&mut parser, "KBOI,2024-03-01T01:00:00Z,,0.0"),
            RowOutcome::Invalid(RowError::MissingTemperature)
        );
        assert_eq!(
            feed(&mut parser, "KBOI,2024-03-01T01:00:00Z,warm,0.0"),
            RowOutcome::Invalid(RowError::Temperature("warm".into()))
        );
        assert!(matches!(
            feed(&mut parser, "KBOI,2024-03-01T01:00:00Z,NaN,0.0"),
            RowOutcome::Invalid(RowError::Temperature(_))
        ));
    }

    #[test]
    fn test_bad_valid_time_and_epoch_are_invalid() {
        let mut parser = RowParser::new();
        header(&mut parser);

        assert_eq!(
            feed(&mut parser, "KBOI,03/01/2024 01:00,40.0,0.0"),
            RowOutcome::Invalid(RowError::ValidTime("03/01/2024 01:00".into()))
        );
        assert_eq!(
            feed(&mut parser, "KBOI,1970-01-01T00:00:00Z,40.0,0.0"),
            RowOutcome::Invalid(RowError::ZeroValidTime)
        );
        assert_eq!(
            feed(&mut parser, "KBOI,,40.0,0.0"),
            RowOutcome::Invalid(RowError::MissingValidTime)
        );
    }

    #[test]
    fn test_rfc3339_offsets_normalize_to_utc() {
        let mut parser = RowParser::new();
        header(&mut parser);

        let RowOutcome::Row(row) = feed(&mut parser, "KBOI,2024-03-01T05:00:00-07:00,40.0,0.0")
        else {
            panic!("expected a row");
        };
        assert_eq!(row.valid_time, datetime!(2024-03-01 12:00 UTC));
        assert_eq!(row.valid_time.offset(), UtcOffset::UTC);
    }

    #[test]
    fn test_invalid_utf8_is_row_scoped() {
        let mut parser = RowParser::new();
        header(&mut parser);

        parser.field(b"KBOI");
        parser.field(b"2024-03-01T00:00:00Z");
        parser.field(&[0xff, 0xfe]);
        parser.field(b"0.0");
        assert_eq!(
            parser.end_row(),
            RowOutcome::Invalid(RowError::Encoding { column: 2 })
        );

        // The next row starts clean
        assert!(matches!(
            feed(&mut parser, "KBOI,2024-03-01T01:00:00Z,40.0,0.0"),
            RowOutcome::Row(_)
        ));
    }

    #[test]
    fn test_ingest_counts_and_values() {
        let mut store = Store::open_in_memory().unwrap();
        let stats = store.ingest_csv(&site(), BODY.as_bytes()).unwrap();

        assert_eq!(
            stats,
            IngestStats {
                rows_upserted: 3,
                rows_skipped: 1,
                comment_rows: 2,
            }
        );

        let rows = store.observations(&site(), march()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].valid_time, datetime!(2024-03-01 01:00 UTC));
        assert_eq!(rows[1].precip_in, Some(0.0));
    }

    #[test]
    fn test_reingest_overlapping_keeps_latest() {
        let mut store = Store::open_in_memory().unwrap();
        store.ingest_csv(&site(), BODY.as_bytes()).unwrap();

        let update = "\
Station_ID,Date_Time,air_temp_set_1,precip_accum_one_hour_set_1
KBOI,2024-03-01T03:00:00Z,37.0,0.03
KBOI,2024-03-01T04:00:00Z,36.0,0.00
";
        store.ingest_csv(&site(), update.as_bytes()).unwrap();

        let rows = store.observations(&site(), march()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].temperature_f, Some(37.0));
        assert_eq!(rows[2].precip_in, Some(0.03));

        // Ingesting the same body again changes nothing
        store.ingest_csv(&site(), update.as_bytes()).unwrap();
        assert_eq!(store.count_in_range(&site(), march()).unwrap(), 4);
    }

    /// Serves `data`, then fails.
    struct BrokenReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_stream_failure_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        let reader = BrokenReader {
            data: Cursor::new(BODY.as_bytes().to_vec()),
        };

        let err = store.ingest_csv(&site(), reader).unwrap_err();
        assert!(matches!(err, Error::Stream(_)));
        assert_eq!(store.count_observations(None).unwrap(), 0);
    }

    #[test]
    fn test_store_failure_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_cold BEFORE INSERT ON obs
                 WHEN NEW.t_f < -100
                 BEGIN SELECT RAISE(ABORT, 'implausible temperature'); END;",
            )
            .unwrap();

        let body = "\
Date_Time,air_temp_set_1,precip_accum_one_hour_set_1
2024-03-01T00:00:00Z,41.0,0.0
2024-03-01T01:00:00Z,40.0,0.0
2024-03-01T02:00:00Z,-200.0,0.0
2024-03-01T03:00:00Z,39.0,0.0
";
        let err = store.ingest_csv(&site(), body.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(store.count_observations(None).unwrap(), 0);
    }

    #[test]
    fn test_unprepared_store_does_not_read() {
        let mut store = Store::open_in_memory().unwrap();
        store.conn.execute_batch("DROP TABLE obs").unwrap();

        let mut reader = Cursor::new(BODY.as_bytes().to_vec());
        let err = store.ingest_csv(&site(), &mut reader).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut total = IngestStats::default();
        total += IngestStats {
            rows_upserted: 2,
            rows_skipped: 1,
            comment_rows: 0,
        };
        total += IngestStats {
            rows_upserted: 3,
            rows_skipped: 0,
            comment_rows: 4,
        };
        assert_eq!(total.rows_upserted, 5);
        assert_eq!(total.rows_skipped, 1);
        assert_eq!(total.comment_rows, 4);
    }
}
