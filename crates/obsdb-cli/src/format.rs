//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use obsdb_core::RefreshReport;
use obsdb_store::{IngestStats, Inventory, SiteSummary, TRACE_SENTINEL_IN};
use obsdb_types::{PrecipitationOb, Site, TemperatureOb, TimeRange};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::util::format_time;

/// Serialize value to pretty JSON with a trailing newline.
pub fn as_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}

fn temperature_text(value: f64) -> String {
    if value.is_nan() {
        "M".to_string()
    } else {
        format!("{:.1}", value)
    }
}

fn temperature_csv(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:.1}", value)
    }
}

/// Trace amounts print as `T`, missing windows as `M`.
fn precipitation_text(value: f64) -> String {
    if value.is_nan() {
        "M".to_string()
    } else if value == TRACE_SENTINEL_IN {
        "T".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn precipitation_csv(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value == TRACE_SENTINEL_IN {
        format!("{}", TRACE_SENTINEL_IN)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_temperatures(
    obs: &[TemperatureOb],
    label: &str,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => as_json(&obs),
        OutputFormat::Csv => {
            let mut output = String::from("valid_time,temperature_f\n");
            for ob in obs {
                output.push_str(&format!(
                    "{},{}\n",
                    format_time(ob.valid_time),
                    temperature_csv(ob.temperature_f)
                ));
            }
            Ok(output)
        }
        OutputFormat::Text => {
            if obs.is_empty() {
                return Ok("No observations in range.\n".to_string());
            }
            let mut output = format!("{:<22} {:>8}\n", "Window ending", label);
            for ob in obs {
                output.push_str(&format!(
                    "{:<22} {:>8}\n",
                    format_time(ob.valid_time),
                    temperature_text(ob.temperature_f)
                ));
            }
            Ok(output)
        }
    }
}

pub fn format_precipitation(obs: &[PrecipitationOb], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => as_json(&obs),
        OutputFormat::Csv => {
            let mut output = String::from("valid_time,precip_in\n");
            for ob in obs {
                output.push_str(&format!(
                    "{},{}\n",
                    format_time(ob.valid_time),
                    precipitation_csv(ob.precip_in)
                ));
            }
            Ok(output)
        }
        OutputFormat::Text => {
            if obs.is_empty() {
                return Ok("No observations in range.\n".to_string());
            }
            let mut output = format!("{:<22} {:>8}\n", "Window ending", "Precip");
            for ob in obs {
                output.push_str(&format!(
                    "{:<22} {:>8}\n",
                    format_time(ob.valid_time),
                    precipitation_text(ob.precip_in)
                ));
            }
            Ok(output)
        }
    }
}

pub fn format_inventory(
    site: &Site,
    range: TimeRange,
    inventory: &Inventory,
    format: OutputFormat,
) -> Result<String> {
    #[derive(Serialize)]
    struct InventoryJson<'a> {
        site: &'a Site,
        range: TimeRange,
        sufficient: bool,
        missing: &'a [TimeRange],
    }

    match format {
        OutputFormat::Json => as_json(&InventoryJson {
            site,
            range,
            sufficient: inventory.is_sufficient(),
            missing: inventory.missing_ranges(),
        }),
        OutputFormat::Csv => {
            let mut output = String::from("start,end\n");
            for missing in inventory.missing_ranges() {
                output.push_str(&format!(
                    "{},{}\n",
                    format_time(missing.start()),
                    format_time(missing.end())
                ));
            }
            Ok(output)
        }
        OutputFormat::Text => {
            if inventory.is_sufficient() {
                return Ok(format!("Cache covers {} for {}\n", range, site));
            }
            let missing = inventory.missing_ranges();
            let mut output = format!("{} missing range(s) for {}:\n", missing.len(), site);
            for range in missing {
                output.push_str(&format!("  {}\n", range));
            }
            Ok(output)
        }
    }
}

pub fn format_ingest_stats(stats: &IngestStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => as_json(stats),
        OutputFormat::Csv => Ok(format!(
            "rows_upserted,rows_skipped,comment_rows\n{},{},{}\n",
            stats.rows_upserted, stats.rows_skipped, stats.comment_rows
        )),
        OutputFormat::Text => Ok(format!(
            "Import complete:\n  Upserted: {}\n  Skipped: {}\n  Comments: {}\n",
            stats.rows_upserted, stats.rows_skipped, stats.comment_rows
        )),
    }
}

pub fn format_refresh(site: &Site, report: &RefreshReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => as_json(report),
        OutputFormat::Csv => {
            let mut output = String::from("start,end\n");
            for range in &report.fetched {
                output.push_str(&format!(
                    "{},{}\n",
                    format_time(range.start()),
                    format_time(range.end())
                ));
            }
            Ok(output)
        }
        OutputFormat::Text => {
            if report.was_sufficient() {
                return Ok(format!("Cache already complete for {}\n", site));
            }
            let mut output = format!(
                "Downloaded {} range(s) for {} ({} rows, {} skipped):\n",
                report.fetched.len(),
                site,
                report.stats.rows_upserted,
                report.stats.rows_skipped
            );
            for range in &report.fetched {
                output.push_str(&format!("  {}\n", range));
            }
            Ok(output)
        }
    }
}

pub fn format_summaries(summaries: &[SiteSummary], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => as_json(&summaries),
        OutputFormat::Csv => {
            let mut output = String::from("site,count,first,last\n");
            for s in summaries {
                output.push_str(&format!(
                    "{},{},{},{}\n",
                    s.site,
                    s.count,
                    format_time(s.first),
                    format_time(s.last)
                ));
            }
            Ok(output)
        }
        OutputFormat::Text => {
            if summaries.is_empty() {
                return Ok("No stations cached yet.\n".to_string());
            }
            let mut output = String::from("Cached stations:\n");
            for s in summaries {
                output.push_str(&format!(
                    "  {:<8} {:>7} obs  {} .. {}\n",
                    s.site,
                    s.count,
                    format_time(s.first),
                    format_time(s.last)
                ));
            }
            Ok(output)
        }
    }
}
