//! Export command: dump cached rows as CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use obsdb_store::ObservationQuery;
use obsdb_types::Site;

use crate::session::Settings;
use crate::util::parse_datetime;

pub fn cmd_export(
    settings: &Settings,
    site: Option<&str>,
    since: Option<&str>,
    until: Option<&str>,
    output: Option<&PathBuf>,
) -> Result<()> {
    let store = settings.open_store()?;
    let mut query = ObservationQuery::new().oldest_first();

    if let Some(site) = site {
        query = query.site(Site::new(site)?.as_str());
    }
    if let Some(since) = since {
        query = query.since(parse_datetime(since)?);
    }
    if let Some(until) = until {
        query = query.until(parse_datetime(until)?);
    }

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let rows = store.export_csv(&query, &mut writer)?;
            writer.flush()?;
            eprintln!("Exported {} observations to {}", rows, path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            store.export_csv(&query, &mut stdout)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
