//! Weather data model and the offline-first weather cache
//!
//! A [`CachedPayload`] is the unit that gets fetched, persisted and served:
//! the current reading plus up to seven daily forecasts, stamped with the
//! moment it was produced.

pub mod advice;
pub mod cache;
pub mod classify;
pub mod refresh;
pub mod source;
pub mod synthetic;

pub use advice::{recommend, Advisory};
pub use cache::WeatherCache;
pub use classify::classify_condition;
pub use refresh::RefreshMessage;
pub use source::{normalize_feed, FetchError, OpenWeatherClient, WeatherSource};
pub use synthetic::synthetic_payload;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Slot key the payload is persisted under
pub const CACHE_KEY: &str = "farm_weather_cache";

/// Age beyond which a payload is refreshed synchronously (7 days)
pub const STALE_AFTER_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Maximum number of daily forecasts in a payload
pub const MAX_FORECAST_DAYS: usize = 7;

/// Coarse weather condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Clear or mostly clear sky
    Sunny,
    Cloudy,
    /// Any precipitation: rain, drizzle, showers, snow
    Rain,
    /// Thunderstorms and other severe weather
    Storm,
}

impl Condition {
    /// Whether the condition brings precipitation
    pub fn is_wet(self) -> bool {
        matches!(self, Condition::Rain | Condition::Storm)
    }

    pub fn label(self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloudy",
            Condition::Rain => "rain",
            Condition::Storm => "storm",
        }
    }
}

/// Snapshot of the conditions right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentReading {
    /// Temperature in Celsius
    pub temp: f64,
    pub condition: Condition,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in km/h
    pub wind_speed: f64,
}

/// Daily temperature range in Celsius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempRange {
    pub min: f64,
    pub max: f64,
}

/// Forecast for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayForecast {
    /// Calendar date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub temp: TempRange,
    pub condition: Condition,
    pub description: String,
    /// Probability of precipitation, 0-100
    pub rain_chance: u8,
}

/// The full weather snapshot, cached and replaced as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPayload {
    pub current: CurrentReading,
    /// Ascending by date, starting today, at most seven entries
    pub daily: Vec<DayForecast>,
    /// When this payload was produced (Unix epoch milliseconds)
    pub fetched_at_epoch_millis: i64,
}

impl CachedPayload {
    /// Milliseconds elapsed between production and `now_millis`
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.fetched_at_epoch_millis)
    }

    /// Whether the payload is older than the staleness threshold
    pub fn is_stale(&self, now_millis: i64) -> bool {
        self.age_millis(now_millis) > STALE_AFTER_MILLIS
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.fetched_at_epoch_millis)
    }

    pub fn today(&self) -> Option<&DayForecast> {
        self.daily.first()
    }

    pub fn tomorrow(&self) -> Option<&DayForecast> {
        self.daily.get(1)
    }

    /// Checks the shape invariants: 1..=7 days, strictly ascending dates,
    /// rain chances within 0-100.
    pub fn is_valid(&self) -> bool {
        !self.daily.is_empty()
            && self.daily.len() <= MAX_FORECAST_DAYS
            && self.daily.windows(2).all(|w| w[0].date < w[1].date)
            && self.daily.iter().all(|d| d.rain_chance <= 100)
    }
}
