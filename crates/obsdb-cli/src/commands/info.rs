//! Info command: where the cache lives and what it holds.

use std::path::{Path, PathBuf};

use anyhow::Result;
use obsdb_store::SiteSummary;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::format::{as_json, format_summaries};
use crate::session::Settings;
use crate::util::write_output;

#[derive(Serialize)]
struct InfoJson<'a> {
    path: &'a Path,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    observations: Option<u64>,
    sites: &'a [SiteSummary],
}

pub fn cmd_info(settings: &Settings, format: OutputFormat, output: Option<&PathBuf>) -> Result<()> {
    let db_path = settings.database.as_path();

    if !db_path.exists() {
        let content = match format {
            OutputFormat::Json => as_json(&InfoJson {
                path: db_path,
                exists: false,
                size_kb: None,
                observations: None,
                sites: &[],
            })?,
            _ => format!(
                "Database path: {}\nDatabase does not exist yet. Run 'obsdb fetch' to create it.\n",
                db_path.display()
            ),
        };
        return write_output(output, &content);
    }

    let size_kb = std::fs::metadata(db_path)?.len() / 1024;
    let store = settings.open_store()?;
    let summaries = store.site_summaries()?;
    let total = store.count_observations(None)?;

    let content = match format {
        OutputFormat::Json => as_json(&InfoJson {
            path: db_path,
            exists: true,
            size_kb: Some(size_kb),
            observations: Some(total),
            sites: &summaries,
        })?,
        OutputFormat::Csv => format_summaries(&summaries, format)?,
        OutputFormat::Text => format!(
            "Database path: {}\nDatabase size: {} KB\nObservations: {}\n\n{}",
            db_path.display(),
            size_kb,
            total,
            format_summaries(&summaries, format)?
        ),
    };

    write_output(output, &content)
}
