//! Import command: ingest a CSV file the way a download would be.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use obsdb_types::Site;
use tracing::info;

use crate::cli::OutputFormat;
use crate::format::format_ingest_stats;
use crate::session::Settings;
use crate::util::write_output;

pub fn cmd_import(
    settings: &Settings,
    site: &str,
    input: Option<&PathBuf>,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let site = Site::new(site)?;
    let mut store = settings.open_store()?;

    let result = match input {
        Some(path) => File::open(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
            .and_then(|file| {
                info!("Importing {} for {}", path.display(), site);
                Ok(store.ingest_csv(&site, BufReader::new(file))?)
            }),
        None => store
            .ingest_csv(&site, io::stdin().lock())
            .context("Failed to import from stdin"),
    };
    store.close()?;
    let stats = result?;

    let content = format_ingest_stats(&stats, format)?;
    write_output(output, &content)
}
