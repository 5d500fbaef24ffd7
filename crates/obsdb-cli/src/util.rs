//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use obsdb_types::TimeRange;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::cli::RangeArgs;

/// Parse RFC3339, or a bare `YYYY-MM-DD` as midnight UTC.
pub fn parse_datetime(s: &str) -> Result<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(dt);
    }

    let format = format_description!("[year]-[month]-[day]");
    if let Ok(date) = time::Date::parse(s, format) {
        return Ok(date.midnight().assume_utc());
    }

    anyhow::bail!("Invalid date/time format: {}. Use RFC3339 or YYYY-MM-DD", s)
}

/// Parse the start and end of a [`RangeArgs`].
pub fn parse_range(args: &RangeArgs) -> Result<TimeRange> {
    let start = parse_datetime(&args.start)?;
    let end = parse_datetime(&args.end)?;
    Ok(TimeRange::new(start, end)?)
}

/// RFC3339 for display. Never fails for times the store can hold.
pub fn format_time(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| String::new())
}

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
