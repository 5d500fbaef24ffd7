//! Command-line interface for the obsdb weather observation cache.
//!
//! Answers daily max/min temperature and accumulated precipitation queries
//! for SynopticLabs stations, downloading only what the local cache lacks.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `max-t` | Daily maximum temperature |
//! | `min-t` | Daily minimum temperature |
//! | `precip` | Accumulated precipitation |
//! | `inventory` | Show missing ranges without downloading |
//! | `fetch` | Download missing ranges |
//! | `import` | Ingest a SynopticLabs CSV file |
//! | `export` | Dump cached observations as CSV |
//! | `info` | Database location and cached stations |
//! | `config` | Manage CLI configuration |
//!
//! # Environment Variables
//!
//! - `SYNOPTIC_API_KEY`: API token (overridden by `--api-key`)
//! - `OBSDB_DATABASE`: cache file (overridden by `--database`)
//! - `OBSDB_CONFIG`: configuration file (overridden by `--config`)
//! - `RUST_LOG`: log filter when neither `--verbose` nor `--quiet` is given

mod cli;
mod commands;
mod config;
mod format;
mod session;
mod util;

use std::io;

use anyhow::Result;
use clap::Parser;
use obsdb_store::Extreme;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{
    cmd_config, cmd_export, cmd_fetch, cmd_import, cmd_info, cmd_inventory, cmd_precip,
    cmd_temperature,
};
use config::Config;
use session::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::path);
    let config = Config::load(&config_path);
    let settings = Settings::resolve(&cli, &config);
    let output = cli.output.as_ref();

    match cli.command {
        Commands::MaxT(args) => cmd_temperature(&settings, &args, Extreme::Max, output),
        Commands::MinT(args) => cmd_temperature(&settings, &args, Extreme::Min, output),
        Commands::Precip(args) => cmd_precip(&settings, &args, output),
        Commands::Inventory { range, output: out } => {
            cmd_inventory(&settings, &range, out.format, output)
        }
        Commands::Fetch { range, output: out } => cmd_fetch(&settings, &range, out.format, output),
        Commands::Import {
            site,
            input,
            output: out,
        } => cmd_import(&settings, &site, input.as_ref(), out.format, output),
        Commands::Export { site, since, until } => cmd_export(
            &settings,
            site.as_deref(),
            since.as_deref(),
            until.as_deref(),
            output,
        ),
        Commands::Info { output: out } => cmd_info(&settings, out.format, output),
        Commands::Config { action } => cmd_config(action, &config_path, &config),
    }
}
