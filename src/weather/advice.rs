//! Farming advice derived from the forecast
//!
//! Only today's and tomorrow's forecasts are consulted. The rules are checked
//! in order and the first match wins.

use serde::Serialize;

use super::CachedPayload;

/// Rain chance (percent) above which a day counts as rainy
pub const RAIN_CHANCE_THRESHOLD: u8 = 60;

/// Max temperature (Celsius) above which heat advice applies
pub const HEAT_THRESHOLD_CELSIUS: f64 = 30.0;

/// The advisory shown under the weather dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Rain today: stay indoors, don't spray
    IndoorWork,
    /// Rain tomorrow: finish harvesting and fertilizing today
    HarvestToday,
    /// Hot today: protect livestock, irrigate early
    HeatCare,
    GoodConditions,
}

impl Advisory {
    /// Pick the advisory for a payload
    ///
    /// A payload with fewer than two days gets [`Advisory::GoodConditions`].
    pub fn for_payload(payload: &CachedPayload) -> Self {
        let (Some(today), Some(tomorrow)) = (payload.today(), payload.tomorrow()) else {
            return Advisory::GoodConditions;
        };

        if today.condition.is_wet() || today.rain_chance > RAIN_CHANCE_THRESHOLD {
            Advisory::IndoorWork
        } else if tomorrow.condition.is_wet() || tomorrow.rain_chance > RAIN_CHANCE_THRESHOLD {
            Advisory::HarvestToday
        } else if today.temp.max > HEAT_THRESHOLD_CELSIUS {
            Advisory::HeatCare
        } else {
            Advisory::GoodConditions
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Advisory::IndoorWork => "It's likely to rain today. Good day for indoor tasks or equipment maintenance. Avoid spraying pesticides.",
            Advisory::HarvestToday => "Rain expected tomorrow. If you need to harvest or apply fertilizer, try to do it today.",
            Advisory::HeatCare => "High temperatures expected. Ensure livestock has shade and water. Irrigate crops early in the morning.",
            Advisory::GoodConditions => "Conditions look good for general farming activities. Great day for scouting crops.",
        }
    }
}

/// Advisory text for a payload
pub fn recommend(payload: &CachedPayload) -> &'static str {
    Advisory::for_payload(payload).message()
}
