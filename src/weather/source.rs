//! OpenWeatherMap forecast client
//!
//! This module fetches the 5-day / 3-hour forecast feed from OpenWeatherMap
//! and normalizes it into a [`CachedPayload`]. It never falls back to
//! synthetic data itself: every failure is returned as a [`FetchError`] and
//! the caller decides what to serve instead.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::classify::classify_condition;
use super::{CachedPayload, CurrentReading, DayForecast, TempRange, MAX_FORECAST_DAYS};
use crate::clock::Clock;

/// Base URL for the OpenWeatherMap forecast API
pub const OPEN_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// Conversion factor from the provider's m/s to km/h
const MS_TO_KMH: f64 = 3.6;

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (unreachable, timeout, TLS...)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The forecast list was empty
    #[error("Forecast feed contained no entries")]
    EmptyFeed,

    /// A feed entry carried an unusable timestamp
    #[error("Invalid timestamp in feed: {0}")]
    InvalidTimestamp(String),

    /// No API key is configured
    #[error("No weather API key configured")]
    MissingCredential,
}

/// Anything that can produce a fresh payload
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self) -> Result<CachedPayload, FetchError>;
}

/// Client for the OpenWeatherMap forecast feed at a fixed coordinate
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    api_key: Option<String>,
    /// Used to group points into days when the feed carries no timezone
    utc_offset: FixedOffset,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("utc_offset", &self.utc_offset)
            .finish()
    }
}

impl OpenWeatherClient {
    /// Create a client for the given coordinate
    ///
    /// # Arguments
    /// * `latitude` / `longitude` - Location of the farm
    /// * `api_key` - OpenWeatherMap credential; `None` makes every fetch fail
    /// * `timeout` - Whole-request timeout
    /// * `clock` - Used to stamp fetched payloads
    pub fn new(
        latitude: f64,
        longitude: f64,
        api_key: Option<String>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, latitude, longitude, api_key, clock))
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(
        client: Client,
        latitude: f64,
        longitude: f64,
        api_key: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            base_url: OPEN_WEATHER_BASE_URL.to_string(),
            latitude,
            longitude,
            api_key,
            utc_offset: Utc.fix(),
            clock,
        }
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Farm-local offset to fall back on when the feed has no `city.timezone`
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch(&self) -> Result<CachedPayload, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingCredential)?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let feed: ForecastFeed = serde_json::from_str(&text)?;
        debug!(points = feed.list.len(), "received forecast feed");

        normalize_feed(&feed, self.clock.now_millis(), self.utc_offset)
    }
}

/// Normalize a provider feed into a payload stamped `fetched_at_epoch_millis`
///
/// The first feed point becomes the current reading. Daily entries keep the
/// first point seen for each local calendar date, in feed order, up to seven
/// days; a point dated on or before the last kept day is discarded.
///
/// Dates are taken in the feed's `city.timezone`, or in `fallback_offset`
/// when the feed does not carry one.
pub fn normalize_feed(
    feed: &ForecastFeed,
    fetched_at_epoch_millis: i64,
    fallback_offset: FixedOffset,
) -> Result<CachedPayload, FetchError> {
    let first = feed.list.first().ok_or(FetchError::EmptyFeed)?;
    let offset = feed.utc_offset().unwrap_or(fallback_offset);

    let current = CurrentReading {
        temp: first.main.temp,
        condition: classify_condition(&first.label()),
        humidity: clamp_percent(first.main.humidity),
        wind_speed: first.wind.as_ref().map(|w| w.speed * MS_TO_KMH).unwrap_or(0.0),
    };

    let mut daily: Vec<DayForecast> = Vec::with_capacity(MAX_FORECAST_DAYS);
    for point in &feed.list {
        if daily.len() == MAX_FORECAST_DAYS {
            break;
        }
        let date = point.local_date(offset)?;
        if daily.last().is_some_and(|last| date <= last.date) {
            continue;
        }
        daily.push(DayForecast {
            date,
            temp: TempRange {
                min: point.main.temp_min,
                max: point.main.temp_max,
            },
            condition: classify_condition(&point.label()),
            description: point.description().to_string(),
            rain_chance: clamp_percent(point.pop * 100.0),
        });
    }

    Ok(CachedPayload {
        current,
        daily,
        fetched_at_epoch_millis,
    })
}

fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// OpenWeatherMap forecast response
#[derive(Debug, Deserialize)]
pub struct ForecastFeed {
    pub list: Vec<ForecastPoint>,
    #[serde(default)]
    city: Option<City>,
}

impl ForecastFeed {
    /// The location's shift from UTC, if the feed reports a usable one
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        let seconds = self.city.as_ref()?.timezone?;
        FixedOffset::east_opt(seconds)
    }
}

#[derive(Debug, Deserialize)]
struct City {
    /// Shift from UTC in seconds
    #[serde(default)]
    timezone: Option<i32>,
}

/// One 3-hour forecast point
#[derive(Debug, Deserialize)]
pub struct ForecastPoint {
    /// Unix seconds
    dt: i64,
    /// "YYYY-MM-DD HH:MM:SS"
    #[serde(default)]
    dt_txt: Option<String>,
    main: MainReading,
    #[serde(default)]
    weather: Vec<WeatherLabel>,
    #[serde(default)]
    wind: Option<Wind>,
    /// Probability of precipitation, 0-1
    #[serde(default)]
    pop: f64,
}

impl ForecastPoint {
    /// Forecast time in UTC, from `dt_txt` or else `dt`
    fn utc_time(&self) -> Result<NaiveDateTime, FetchError> {
        if let Some(time) = self
            .dt_txt
            .as_deref()
            .and_then(|txt| NaiveDateTime::parse_from_str(txt, "%Y-%m-%d %H:%M:%S").ok())
        {
            return Ok(time);
        }
        DateTime::from_timestamp(self.dt, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| FetchError::InvalidTimestamp(self.dt.to_string()))
    }

    /// Calendar date of this point at the given offset
    fn local_date(&self, offset: FixedOffset) -> Result<NaiveDate, FetchError> {
        Ok(offset.from_utc_datetime(&self.utc_time()?).date_naive())
    }

    /// Category and description joined, for keyword classification
    fn label(&self) -> String {
        self.weather
            .first()
            .map(|w| format!("{} {}", w.main, w.description))
            .unwrap_or_default()
    }

    fn description(&self) -> &str {
        self.weather.first().map(|w| w.description.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct MainReading {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherLabel {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}
