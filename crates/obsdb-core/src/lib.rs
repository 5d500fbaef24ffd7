//! Cache-filling orchestration for obsdb.
//!
//! This crate ties the local store ([`obsdb_store`]) to a remote source of
//! observations. [`ObsCache`] answers windowed temperature and
//! precipitation queries, downloading only the time ranges the cache does
//! not already cover.
//!
//! # Features
//!
//! - [`ObsCache`]: validate, check inventory, fill gaps, aggregate
//! - [`ObservationSource`]: the transport seam
//! - [`SynopticSource`]: blocking client for the SynopticLabs timeseries API
//! - [`OfflineSource`]: answer from the cache only
//! - [`MockSource`]: canned observations for tests
//!
//! # Quick Start
//!
//! ```no_run
//! use obsdb_core::{ObsCache, SynopticSource};
//! use obsdb_store::Store;
//! use obsdb_types::TimeRange;
//! use time::{Duration, macros::datetime};
//!
//! let api_key = std::env::var("SYNOPTIC_API_KEY")?;
//! let source = SynopticSource::new(&api_key)?;
//! let mut cache = ObsCache::new(Store::open_default()?, source);
//!
//! let range = TimeRange::new(
//!     datetime!(2024-01-01 00:00 UTC),
//!     datetime!(2024-01-31 00:00 UTC),
//! )?;
//! for ob in cache.query_max_temperature("KSEA", range, 24, Duration::DAY)? {
//!     println!("{}: {:.1}°F", ob.valid_time, ob.temperature_f);
//! }
//! cache.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod error;
pub mod mock;
pub mod source;

pub use cache::{ObsCache, RefreshReport};
pub use error::{Error, Result, TransportError};
pub use mock::MockSource;
pub use source::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ObservationSource, OfflineSource, SynopticSource,
};
