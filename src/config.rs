//! Runtime settings derived from CLI flags and environment variables

use chrono::{FixedOffset, Local, Offset};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cli::Cli;

/// Default farm location (Nairobi)
pub const DEFAULT_LATITUDE: f64 = -1.2921;
pub const DEFAULT_LONGITUDE: f64 = 36.8219;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Probed to decide whether the provider is reachable
pub const DEFAULT_PROBE_ADDR: &str = "api.openweathermap.org:443";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Latitude must be within -90..=90, got {0}")]
    InvalidLatitude(f64),

    #[error("Longitude must be within -180..=180, got {0}")]
    InvalidLongitude(f64),

    #[error("UTC offset must be strictly between -24 and 24 hours, got {0}")]
    InvalidUtcOffset(f64),

    #[error("Timeout must be at least one second")]
    ZeroTimeout,

    #[error("Probe address must be host:port, got '{0}'")]
    InvalidProbeAddr(String),
}

/// Validated settings for building the weather stack
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub latitude: f64,
    pub longitude: f64,
    /// Farm's shift from UTC; decides which calendar day is "today"
    pub utc_offset: FixedOffset,
    pub api_key: Option<String>,
    pub base_url: String,
    /// `None` means the XDG cache directory
    pub cache_dir: Option<PathBuf>,
    pub timeout: Duration,
    pub offline: bool,
    pub probe_addr: String,
}

impl Settings {
    /// Creates Settings from parsed CLI arguments
    ///
    /// An empty API key is treated as absent. Without `--utc-offset` the
    /// farm is assumed to share this machine's current offset.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let utc_offset = match cli.utc_offset {
            Some(hours) => offset_from_hours(hours).ok_or(ConfigError::InvalidUtcOffset(hours))?,
            None => Local::now().offset().fix(),
        };
        let settings = Settings {
            latitude: cli.lat,
            longitude: cli.lon,
            utc_offset,
            api_key: cli
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            base_url: cli.base_url.clone(),
            cache_dir: cli.cache_dir.clone(),
            timeout: Duration::from_secs(cli.timeout),
            offline: cli.offline,
            probe_addr: cli.probe_addr.clone(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ConfigError::InvalidLatitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ConfigError::InvalidLongitude(self.longitude));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        match self.probe_addr.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
            _ => Err(ConfigError::InvalidProbeAddr(self.probe_addr.clone())),
        }
    }
}

fn offset_from_hours(hours: f64) -> Option<FixedOffset> {
    if !hours.is_finite() {
        return None;
    }
    FixedOffset::east_opt((hours * 3_600.0).round() as i32)
}
