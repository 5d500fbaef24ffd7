//! Inventory command: report gaps without downloading.

use std::path::PathBuf;

use anyhow::Result;
use obsdb_types::Site;

use crate::cli::{OutputFormat, RangeArgs};
use crate::format::format_inventory;
use crate::session::Settings;
use crate::util::{parse_range, write_output};

pub fn cmd_inventory(
    settings: &Settings,
    args: &RangeArgs,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let site = Site::new(&args.site)?;
    let range = parse_range(args)?;
    let store = settings.open_store()?;

    let inventory = store.have_inventory(&site, range)?;

    let content = format_inventory(&site, range, &inventory, format)?;
    write_output(output, &content)
}
