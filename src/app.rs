//! Wiring and text output for the farmlog commands
//!
//! `App` builds the weather stack once from [`Settings`] and renders what the
//! dashboard would show: current conditions, the week ahead, a staleness
//! notice and the day's advice.

use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheManager, FileSlot, MemorySlot};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, Settings};
use crate::connectivity::{Connectivity, ProbeConnectivity, StaticConnectivity};
use crate::weather::cache::PayloadStore;
use crate::weather::{recommend, CachedPayload, FetchError, OpenWeatherClient, WeatherCache, CACHE_KEY};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built
    #[error("Could not set up weather client: {0}")]
    Client(#[from] FetchError),

    #[error("Could not encode weather as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The assembled application
pub struct App {
    cache: WeatherCache,
    clock: Arc<dyn Clock>,
}

impl App {
    /// Builds the production stack: file-backed slot, OpenWeatherMap client,
    /// system clock, and a TCP probe (or a fixed "offline" answer).
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        settings.validate()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let manager = match &settings.cache_dir {
            Some(dir) => Ok(CacheManager::with_dir(dir.clone())),
            None => CacheManager::new(),
        };
        let store: Arc<PayloadStore> = match manager {
            Ok(manager) => {
                debug!(dir = %manager.dir().display(), "using weather cache directory");
                Arc::new(FileSlot::<CachedPayload>::new(manager, CACHE_KEY))
            }
            Err(e) => {
                warn!(error = %e, "weather will not be kept between runs");
                Arc::new(MemorySlot::<CachedPayload>::new())
            }
        };

        let source = OpenWeatherClient::new(
            settings.latitude,
            settings.longitude,
            settings.api_key.clone(),
            settings.timeout,
            Arc::clone(&clock),
        )?
        .with_base_url(settings.base_url.clone())
        .with_utc_offset(settings.utc_offset);

        let connectivity: Arc<dyn Connectivity> = if settings.offline {
            Arc::new(StaticConnectivity::offline())
        } else {
            Arc::new(ProbeConnectivity::new(settings.probe_addr.clone(), settings.timeout))
        };

        let cache = WeatherCache::new(store, Arc::new(source), Arc::clone(&clock), connectivity)
            .with_utc_offset(settings.utc_offset);
        Ok(Self::with_cache(cache, clock))
    }

    /// Uses an already assembled cache
    pub fn with_cache(cache: WeatherCache, clock: Arc<dyn Clock>) -> Self {
        Self { cache, clock }
    }

    /// Current payload, after any background refresh it triggered has finished
    pub async fn current(&self) -> CachedPayload {
        let payload = self.cache.get_current().await;
        self.cache.settle().await;
        payload
    }

    /// The `weather` command output
    pub async fn weather_report(&self, json: bool) -> Result<String, AppError> {
        let payload = self.current().await;
        if json {
            return Ok(serde_json::to_string_pretty(&payload)?);
        }
        Ok(render_report(&payload, self.clock.now_millis()))
    }

    /// The `advice` command output
    pub async fn advice(&self) -> String {
        recommend(&self.current().await).to_string()
    }
}

/// Human-readable weather report
pub fn render_report(payload: &CachedPayload, now_millis: i64) -> String {
    let mut out = String::new();

    if payload.is_stale(now_millis) {
        let _ = writeln!(out, "! Weather data is old. Connect to internet to update.\n");
    }

    let current = &payload.current;
    let _ = writeln!(
        out,
        "Now: {:.0}°C, {}  humidity {}%  wind {:.0} km/h",
        current.temp,
        current.condition.label(),
        current.humidity,
        current.wind_speed
    );

    if let Some(fetched_at) = payload.fetched_at() {
        let _ = writeln!(out, "Updated: {}", fetched_at.format("%Y-%m-%d %H:%M UTC"));
    }

    let _ = writeln!(out);
    for day in &payload.daily {
        let _ = writeln!(
            out,
            "{}  {:>3.0}° / {:>3.0}°  {:<7} {:>3}%  {}",
            day.date.format("%a %d %b"),
            day.temp.min,
            day.temp.max,
            day.condition.label(),
            day.rain_chance,
            day.description
        );
    }

    let _ = writeln!(out, "\nFarm advice: {}", recommend(payload));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::weather::source::WeatherSource;
    use crate::weather::{synthetic_payload, STALE_AFTER_MILLIS};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl WeatherSource for Unreachable {
        async fn fetch(&self) -> Result<CachedPayload, FetchError> {
            Err(FetchError::MissingCredential)
        }
    }

    fn offline_app(now_millis: i64) -> App {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_millis(now_millis));
        let cache = WeatherCache::new(
            Arc::new(MemorySlot::<CachedPayload>::new()),
            Arc::new(Unreachable),
            Arc::clone(&clock),
            Arc::new(StaticConnectivity::offline()),
        );
        App::with_cache(cache, clock)
    }

    #[test]
    fn test_report_lists_every_day_and_advice() {
        let payload = synthetic_payload(chrono::Utc::now(), chrono::FixedOffset::east_opt(0).unwrap());
        let report = render_report(&payload, payload.fetched_at_epoch_millis);

        assert!(report.starts_with("Now: 24°C, sunny"));
        assert!(report.contains("Farm advice: "));
        assert_eq!(report.matches('%').count(), 1 + payload.daily.len());
        assert!(!report.contains("Weather data is old"));
    }

    #[test]
    fn test_report_flags_stale_data() {
        let payload = synthetic_payload(chrono::Utc::now(), chrono::FixedOffset::east_opt(0).unwrap());
        let later = payload.fetched_at_epoch_millis + STALE_AFTER_MILLIS + 1;

        assert!(render_report(&payload, later).contains("Weather data is old"));
    }

    #[tokio::test]
    async fn test_offline_app_reports_placeholder_weather_as_json() {
        let app = offline_app(1_720_000_000_000);

        let json = app.weather_report(true).await.unwrap();
        let payload: CachedPayload = serde_json::from_str(&json).unwrap();

        assert_eq!(payload.daily.len(), 7);
        assert_eq!(payload.fetched_at_epoch_millis, 1_720_000_000_000);
    }

    #[tokio::test]
    async fn test_advice_matches_recommendation() {
        let app = offline_app(1_720_000_000_000);
        let advice = app.advice().await;
        // placeholder week: dry today, rain the day after tomorrow
        assert_eq!(advice, crate::weather::Advisory::GoodConditions.message());
    }

    #[test]
    fn test_app_new_with_cache_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings {
            latitude: 0.0,
            longitude: 0.0,
            utc_offset: chrono::FixedOffset::east_opt(0).unwrap(),
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            cache_dir: Some(dir.path().to_path_buf()),
            timeout: std::time::Duration::from_secs(1),
            offline: true,
            probe_addr: "127.0.0.1:9".to_string(),
        };
        assert!(App::new(&settings).is_ok());
    }
}
