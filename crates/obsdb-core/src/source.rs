//! Where missing observations come from.
//!
//! [`ObservationSource`] is the seam between the cache and the network. The
//! production implementation, [`SynopticSource`], requests hourly
//! temperature and precipitation from the SynopticLabs timeseries API as
//! CSV. [`OfflineSource`] refuses every request, for running against the
//! cache alone.

use std::io::{self, Read};
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, info};

use obsdb_types::{Site, TimeRange};

use crate::error::TransportError;

/// SynopticLabs API root.
pub const DEFAULT_BASE_URL: &str = "https://api.synopticdata.com/v2";

/// Default timeout for one download, body included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("obsdb/", env!("CARGO_PKG_VERSION"));

/// A provider of observation streams.
///
/// The returned reader yields a CSV body in the layout
/// [`obsdb_store::Store::ingest_csv`] accepts. It may borrow from the
/// source, and errors while reading it abort the ingestion that consumes it.
pub trait ObservationSource {
    /// Open a stream of hourly observations for `site` over `range`.
    fn open(&self, site: &Site, range: TimeRange) -> Result<Box<dyn Read + '_>, TransportError>;
}

/// Client for the SynopticLabs `stations/timeseries` endpoint.
///
/// The API key is borrowed, not copied, and never logged.
pub struct SynopticSource<'k> {
    client: Client,
    base_url: String,
    api_key: &'k str,
}

impl std::fmt::Debug for SynopticSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynopticSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl<'k> SynopticSource<'k> {
    /// Create a client for the public API with the default timeout.
    pub fn new(api_key: &'k str) -> Result<Self, TransportError> {
        Self::with_config(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client for another API root.
    ///
    /// # Arguments
    ///
    /// * `api_key` - SynopticLabs token
    /// * `base_url` - API root, e.g. `https://api.synopticdata.com/v2`
    /// * `timeout` - limit for one whole download
    pub fn with_config(
        api_key: &'k str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Self::with_client(api_key, base_url, client)
    }

    /// Create a source with a custom reqwest client.
    pub fn with_client(
        api_key: &'k str,
        base_url: &str,
        client: Client,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(TransportError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters for a request, token excluded.
    pub fn query_params(
        site: &Site,
        range: TimeRange,
    ) -> Result<Vec<(&'static str, String)>, TransportError> {
        Ok(vec![
            ("stid", site.as_str().to_string()),
            ("vars", "air_temp,precip_accum_one_hour".to_string()),
            ("units", "english".to_string()),
            ("output", "csv".to_string()),
            ("start", compact_time(range.start())?),
            ("end", compact_time(range.end())?),
            ("hfmetars", "0".to_string()),
        ])
    }
}

/// `YYYYMMDDHHMM` in UTC, as the API expects.
fn compact_time(t: OffsetDateTime) -> Result<String, TransportError> {
    t.to_offset(UtcOffset::UTC)
        .format(format_description!("[year][month][day][hour][minute]"))
        .map_err(|e| TransportError::Unavailable(e.to_string()))
}

impl ObservationSource for SynopticSource<'_> {
    fn open(&self, site: &Site, range: TimeRange) -> Result<Box<dyn Read + '_>, TransportError> {
        let url = format!("{}/stations/timeseries", self.base_url);
        let params = Self::query_params(site, range)?;

        info!("Downloading {} for {}", range, site);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .query(&[("token", self.api_key)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                site: site.to_string(),
            });
        }

        Ok(Box::new(Body(response)))
    }
}

/// Response body with request URLs removed from read errors.
struct Body(Response);

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|e| {
            let kind = e.kind();
            match e.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
                Some(Ok(inner)) => io::Error::new(kind, (*inner).without_url()),
                Some(Err(other)) => io::Error::new(kind, other),
                None => io::Error::from(kind),
            }
        })
    }
}

/// A source that has nothing. Every request fails with
/// [`TransportError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl ObservationSource for OfflineSource {
    fn open(&self, site: &Site, range: TimeRange) -> Result<Box<dyn Read + '_>, TransportError> {
        Err(TransportError::Unavailable(format!(
            "offline, and {} for {} is not cached",
            range, site
        )))
    }
}
