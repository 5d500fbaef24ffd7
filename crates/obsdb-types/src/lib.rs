//! Shared types for the obsdb weather observation cache.
//!
//! This crate holds the small value types used across the workspace:
//! the store (obsdb-store), the orchestrator (obsdb-core) and the CLI.
//!
//! # Features
//!
//! - [`TimeRange`], a validated `[start, end]` interval
//! - [`Site`], a case-normalized station identifier
//! - Windowed query results ([`TemperatureOb`], [`PrecipitationOb`])
//! - [`ValidationError`] for requests rejected before any I/O
//!
//! # Example
//!
//! ```
//! use obsdb_types::{Site, TimeRange};
//! use time::macros::datetime;
//!
//! let site = Site::new("KSEA")?;
//! let range = TimeRange::new(
//!     datetime!(2024-01-01 00:00 UTC),
//!     datetime!(2024-01-08 00:00 UTC),
//! )?;
//! assert_eq!(site.as_str(), "ksea");
//! assert_eq!(range.duration().whole_days(), 7);
//! # Ok::<(), obsdb_types::ValidationError>(())
//! ```

pub mod error;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::{PrecipitationOb, Site, TemperatureOb, TimeRange};
