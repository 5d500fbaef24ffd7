//! Windowed temperature and precipitation queries.

use std::path::PathBuf;

use anyhow::Result;
use obsdb_store::Extreme;
use time::Duration;

use crate::cli::{PrecipitationArgs, TemperatureArgs};
use crate::format::{format_precipitation, format_temperatures};
use crate::session::{Settings, close_cache};
use crate::util::{parse_range, write_output};

pub fn cmd_temperature(
    settings: &Settings,
    args: &TemperatureArgs,
    extreme: Extreme,
    output: Option<&PathBuf>,
) -> Result<()> {
    let range = parse_range(&args.range)?;
    let length = Duration::hours(i64::from(args.window_hours));
    let mut cache = settings.cache()?;

    let (result, label) = match extreme {
        Extreme::Max => (
            cache.query_max_temperature(&args.range.site, range, args.window_end, length),
            "Max F",
        ),
        Extreme::Min => (
            cache.query_min_temperature(&args.range.site, range, args.window_end, length),
            "Min F",
        ),
    };

    close_cache(cache)?;
    let obs = result?;

    let content = format_temperatures(&obs, label, args.output.format)?;
    write_output(output, &content)
}

pub fn cmd_precip(
    settings: &Settings,
    args: &PrecipitationArgs,
    output: Option<&PathBuf>,
) -> Result<()> {
    let range = parse_range(&args.range)?;
    let length = Duration::hours(i64::from(args.window_hours));
    let increment = Duration::hours(i64::from(args.increment_hours));
    let mut cache = settings.cache()?;

    let result = cache.query_precipitation(
        &args.range.site,
        range,
        length,
        increment,
        args.window_offset,
    );

    close_cache(cache)?;
    let obs = result?;

    let content = format_precipitation(&obs, args.output.format)?;
    write_output(output, &content)
}
