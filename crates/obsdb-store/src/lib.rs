//! Local SQLite cache of hourly weather observations.
//!
//! This crate owns everything that touches the cache file: the schema, the
//! transactional ingestion of downloaded CSV bodies, the inventory check that
//! decides which time ranges still need downloading, and the windowed
//! max/min temperature and precipitation queries.
//!
//! # Features
//!
//! - Upsert observations keyed by site and valid time
//! - Find gaps in cached coverage ([`Store::have_inventory`])
//! - Ingest a CSV stream in one transaction ([`Store::ingest_csv`])
//! - Windowed aggregation ([`Store::query_temperatures`], [`Store::query_precipitation`])
//! - Query, summarize and export the raw rows
//! - Retention sweep on close
//!
//! # Example
//!
//! ```
//! use obsdb_store::{Extreme, Store};
//! use obsdb_types::{Site, TimeRange};
//! use time::{Duration, macros::datetime};
//!
//! let mut store = Store::open_in_memory()?;
//! let site = Site::new("KBOI")?;
//!
//! let body = "Date_Time,air_temp_set_1,precip_accum_one_hour_set_1
//! 2024-03-01T06:00:00Z,35.0,0.00
//! 2024-03-01T15:00:00Z,52.0,0.02
//! ";
//! store.ingest_csv(&site, body.as_bytes())?;
//!
//! let range = TimeRange::new(datetime!(2024-03-01 00:00 UTC), datetime!(2024-03-02 00:00 UTC))?;
//! let highs = store.query_temperatures(&site, range, 24, Duration::DAY, Extreme::Max)?;
//! assert_eq!(highs[0].temperature_f, 52.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aggregate;
mod error;
mod ingest;
mod inventory;
mod models;
mod queries;
mod schema;
mod store;

pub use aggregate::{
    Extreme, HourlySample, MAX_WINDOWS, TRACE_SENTINEL_IN, TRACE_THRESHOLD_IN,
    TRACE_TOTAL_THRESHOLD_IN, WindowSchedule, max_min_windows, precipitation_windows,
};
pub use error::{Error, Result};
pub use ingest::{IngestStats, ParsedRow, ParserState, RowError, RowOutcome, RowParser};
pub use inventory::{GAP_TOLERANCE, Inventory, MAX_MISSING_RANGES, find_missing_ranges};
pub use models::{SiteSummary, StoredObservation};
pub use queries::ObservationQuery;
pub use schema::SCHEMA_VERSION;
pub use store::{RETENTION, Store};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/obsdb/wxobs.sqlite`
/// - macOS: `~/Library/Application Support/obsdb/wxobs.sqlite`
/// - Windows: `C:\Users\<user>\AppData\Local\obsdb\wxobs.sqlite`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("obsdb")
        .join("wxobs.sqlite")
}
