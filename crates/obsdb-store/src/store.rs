//! Main store implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use obsdb_types::{Site, TimeRange};

use crate::error::{Error, Result};
use crate::models::{SiteSummary, StoredObservation, observation_from_row, timestamp_from_sql};
use crate::queries::ObservationQuery;
use crate::schema;

/// How long observations are kept. Rows older than this are deleted when
/// the store is closed.
pub const RETENTION: Duration = Duration::days(555);

/// Insert-or-replace for one observation, keyed by `(site, valid_time)`.
pub(crate) const UPSERT_SQL: &str = "INSERT INTO obs (site, valid_time, t_f, precip_in)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(site, valid_time) DO UPDATE SET
        t_f = excluded.t_f,
        precip_in = excluded.precip_in";

/// SQLite-based store for hourly weather observations.
///
/// The store is single-writer: operations that write more than one row take
/// `&mut self` and run inside a transaction.
#[derive(Debug)]
pub struct Store {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening observation cache at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the store, first deleting everything older than [`RETENTION`].
    ///
    /// Returns the number of rows the retention sweep removed. Dropping a
    /// store without calling this skips the sweep.
    pub fn close(self) -> Result<usize> {
        let cutoff = OffsetDateTime::now_utc() - RETENTION;
        let purged = self.purge_older_than(cutoff)?;

        self.conn.close().map_err(|(_, e)| Error::Database(e))?;
        Ok(purged)
    }

    /// Delete all observations valid before `cutoff`.
    pub fn purge_older_than(&self, cutoff: OffsetDateTime) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM obs WHERE valid_time < ?",
            [cutoff.unix_timestamp()],
        )?;

        if deleted > 0 {
            info!("Purged {} observations older than {}", deleted, cutoff);
        }
        Ok(deleted)
    }
}

// Observation operations
impl Store {
    /// Insert an observation, replacing any existing row for the same
    /// site and valid time.
    pub fn upsert(&self, observation: &StoredObservation) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(UPSERT_SQL)?;
        stmt.execute(rusqlite::params![
            observation.site.to_lowercase(),
            observation.valid_time.unix_timestamp(),
            observation.temperature_f,
            observation.precip_in,
        ])?;
        Ok(())
    }

    /// All observations for a site inside `range` (inclusive), oldest first.
    pub fn observations(&self, site: &Site, range: TimeRange) -> Result<Vec<StoredObservation>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT site, valid_time, t_f, precip_in FROM obs
             WHERE site = ?1 AND valid_time >= ?2 AND valid_time <= ?3
             ORDER BY valid_time ASC",
        )?;

        let rows = stmt
            .query_map(
                rusqlite::params![
                    site.as_str(),
                    range.start().unix_timestamp(),
                    range.end().unix_timestamp()
                ],
                observation_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Count observations for a site inside `range` (inclusive).
    pub fn count_in_range(&self, site: &Site, range: TimeRange) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM obs
             WHERE site = ?1 AND valid_time >= ?2 AND valid_time <= ?3",
            rusqlite::params![
                site.as_str(),
                range.start().unix_timestamp(),
                range.end().unix_timestamp()
            ],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    /// Count observations, optionally for a single site.
    pub fn count_observations(&self, site: Option<&Site>) -> Result<u64> {
        let count: i64 = match site {
            Some(site) => self.conn.query_row(
                "SELECT COUNT(*) FROM obs WHERE site = ?",
                [site.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM obs", [], |row| row.get(0))?,
        };

        Ok(count as u64)
    }

    /// Query observations with filters.
    pub fn query_observations(&self, query: &ObservationQuery) -> Result<Vec<StoredObservation>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_ref.as_slice(), observation_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// One summary per cached site, ordered by site.
    pub fn site_summaries(&self) -> Result<Vec<SiteSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT site, COUNT(*), MIN(valid_time), MAX(valid_time)
             FROM obs GROUP BY site ORDER BY site",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(SiteSummary {
                    site: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                    first: timestamp_from_sql(2, row.get(2)?)?,
                    last: timestamp_from_sql(3, row.get(3)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Write the rows matching `query` as CSV, with a header row.
    ///
    /// Returns the number of rows written.
    pub fn export_csv<W: Write>(&self, query: &ObservationQuery, writer: W) -> Result<usize> {
        let rows = self.query_observations(query)?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &rows {
            csv_writer.serialize(row).map_err(Error::Export)?;
        }
        csv_writer.flush()?;

        debug!("Exported {} observations", rows.len());
        Ok(rows.len())
    }
}
