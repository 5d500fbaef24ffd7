//! Settings resolved from flags, environment and config file.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use obsdb_core::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ObsCache, ObservationSource, OfflineSource,
    SynopticSource, TransportError,
};
use obsdb_store::Store;
use obsdb_types::{Site, TimeRange};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::Config;

/// Everything a command needs to reach the cache and the network.
///
/// Flags (and their environment variables) win over the config file, which
/// wins over built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub offline: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            database: cli
                .database
                .clone()
                .or_else(|| config.database.clone())
                .unwrap_or_else(obsdb_store::default_db_path),
            api_key: cli
                .api_key
                .clone()
                .or_else(|| config.api_key.clone())
                .filter(|k| !k.trim().is_empty()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: config
                .timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            offline: cli.offline,
        }
    }

    pub fn open_store(&self) -> Result<Store> {
        debug!("Opening cache at {}", self.database.display());
        Store::open(&self.database)
            .with_context(|| format!("Failed to open database: {}", self.database.display()))
    }

    /// The source to fill the cache from. Offline mode needs no key.
    pub fn source(&self) -> Result<Source<'_>> {
        if self.offline {
            return Ok(Source::Offline(OfflineSource));
        }
        let Some(api_key) = self.api_key.as_deref() else {
            bail!(
                "No API key. Use --api-key, set SYNOPTIC_API_KEY, or run \
                 'obsdb config set api-key <TOKEN>'. Use --offline to query the cache only."
            );
        };
        let source = SynopticSource::with_config(api_key, &self.base_url, self.timeout)?;
        Ok(Source::Synoptic(source))
    }

    pub fn cache(&self) -> Result<ObsCache<Source<'_>>> {
        Ok(ObsCache::new(self.open_store()?, self.source()?))
    }
}

/// Close `cache`, logging what its retention sweep removed.
///
/// Commands call this before propagating a query error, so the sweep runs
/// on every path that opened the store.
pub fn close_cache<S: ObservationSource>(cache: ObsCache<S>) -> Result<()> {
    let purged = cache.close()?;
    if purged > 0 {
        info!("Retention sweep removed {} old observations", purged);
    }
    Ok(())
}

/// The source chosen at run time.
#[derive(Debug)]
pub enum Source<'k> {
    Synoptic(SynopticSource<'k>),
    Offline(OfflineSource),
}

impl ObservationSource for Source<'_> {
    fn open(&self, site: &Site, range: TimeRange) -> Result<Box<dyn Read + '_>, TransportError> {
        match self {
            Source::Synoptic(source) => source.open(site, range),
            Source::Offline(source) => source.open(site, range),
        }
    }
}
