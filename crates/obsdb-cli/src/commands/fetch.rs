//! Fetch command: fill the cache for a range.

use std::path::PathBuf;

use anyhow::Result;
use obsdb_types::Site;

use crate::cli::{OutputFormat, RangeArgs};
use crate::format::format_refresh;
use crate::session::{Settings, close_cache};
use crate::util::{parse_range, write_output};

pub fn cmd_fetch(
    settings: &Settings,
    args: &RangeArgs,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let site = Site::new(&args.site)?;
    let range = parse_range(args)?;
    let mut cache = settings.cache()?;

    let result = cache.refresh(site.as_str(), range);
    close_cache(cache)?;
    let report = result?;

    let content = format_refresh(&site, &report, format)?;
    write_output(output, &content)
}
