//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Station and time range shared by every cache query.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Station identifier, e.g. KBOI
    pub site: String,

    /// Start of the range (RFC3339 or YYYY-MM-DD)
    #[arg(short, long)]
    pub start: String,

    /// End of the range (RFC3339 or YYYY-MM-DD)
    #[arg(short, long)]
    pub end: String,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Daily temperature window arguments.
#[derive(Debug, Clone, Args)]
pub struct TemperatureArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// UTC hour each daily window ends at (24 is the end of the day)
    #[arg(long, default_value = "24", value_parser = clap::value_parser!(u8).range(0..=24))]
    pub window_end: u8,

    /// Window length in hours
    #[arg(long, default_value = "24")]
    pub window_hours: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Accumulated precipitation window arguments.
#[derive(Debug, Clone, Args)]
pub struct PrecipitationArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Window length in hours
    #[arg(long, default_value = "24")]
    pub window_hours: u32,

    /// Hours between window ends
    #[arg(long, default_value = "24")]
    pub increment_hours: u32,

    /// UTC hour window ends are counted from (12 gives 12Z-to-12Z totals)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=24))]
    pub window_offset: u8,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
#[command(name = "obsdb")]
#[command(author, version, about = "Cache and summarize hourly weather observations", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Cache database file
    #[arg(long, global = true, env = "OBSDB_DATABASE")]
    pub database: Option<PathBuf>,

    /// SynopticLabs API token
    #[arg(long, global = true, env = "SYNOPTIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Answer from the cache only, never download
    #[arg(long, global = true)]
    pub offline: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "OBSDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Daily maximum temperature
    MaxT(TemperatureArgs),

    /// Daily minimum temperature
    MinT(TemperatureArgs),

    /// Accumulated precipitation
    Precip(PrecipitationArgs),

    /// Show which parts of a range are missing from the cache
    Inventory {
        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Download whatever the cache is missing for a range
    Fetch {
        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Import a SynopticLabs CSV file into the cache
    Import {
        /// Station identifier the file belongs to
        site: String,

        /// CSV file to read (stdin if omitted)
        input: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export cached observations as CSV
    Export {
        /// Only export this station
        #[arg(long)]
        site: Option<String>,

        /// Only export observations at or after this time
        #[arg(long)]
        since: Option<String>,

        /// Only export observations at or before this time
        #[arg(long)]
        until: Option<String>,
    },

    /// Show database location and cached stations
    Info {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// SynopticLabs API token
    ApiKey,
    /// Cache database file
    Database,
    /// SynopticLabs API root
    BaseUrl,
    /// Download timeout in seconds
    Timeout,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}
