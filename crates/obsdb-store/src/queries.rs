//! Query builder for raw stored observations.
//!
//! The windowed queries live on [`Store`](crate::Store) directly; this
//! builder is for listing and exporting the hourly rows themselves.
//!
//! # Example
//!
//! ```
//! use obsdb_store::{ObservationQuery, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let last_week = OffsetDateTime::now_utc() - Duration::days(7);
//!
//! let query = ObservationQuery::new()
//!     .site("KSEA")
//!     .since(last_week)
//!     .oldest_first();
//!
//! let rows = store.query_observations(&query)?;
//! assert!(rows.is_empty());
//! # Ok::<(), obsdb_store::Error>(())
//! ```

use time::OffsetDateTime;

/// Fluent query builder for stored observations.
///
/// By default, queries return results ordered by `valid_time` descending
/// (newest first).
#[derive(Debug, Default, Clone)]
pub struct ObservationQuery {
    /// Filter by site (stored lowercase).
    pub site: Option<String>,
    /// Include only rows at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Include only rows at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Order by valid_time descending (newest first).
    pub newest_first: bool,
}

impl ObservationQuery {
    /// Create a new query with default settings.
    ///
    /// Default behavior:
    /// - No site filter (all sites)
    /// - No time range filter
    /// - Ordered by newest first
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter by site. The identifier is lowercased to match storage.
    pub fn site(mut self, site: &str) -> Self {
        self.site = Some(site.trim().to_lowercase());
        self
    }

    /// Filter to rows valid at or after this time.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to rows valid at or before this time.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Order results by oldest first (ascending by `valid_time`).
    ///
    /// Use this for export and any sequential processing.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the SQL WHERE clause and parameters.
    pub(crate) fn build_where(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref site) = self.site {
            conditions.push("site = ?");
            params.push(Box::new(site.clone()));
        }

        if let Some(since) = self.since {
            conditions.push("valid_time >= ?");
            params.push(Box::new(since.unix_timestamp()));
        }

        if let Some(until) = self.until {
            conditions.push("valid_time <= ?");
            params.push(Box::new(until.unix_timestamp()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    /// Build the full SQL query.
    pub(crate) fn build_sql(&self) -> String {
        let (where_clause, _) = self.build_where();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        format!(
            "SELECT site, valid_time, t_f, precip_in FROM obs {} ORDER BY site, valid_time {}",
            where_clause, order
        )
    }
}
