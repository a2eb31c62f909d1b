//! Placeholder forecast for when no real data can be had
//!
//! Values are fixed and representative; only the dates follow the clock.

use chrono::{DateTime, Duration, FixedOffset, Utc};

use super::{CachedPayload, Condition, CurrentReading, DayForecast, TempRange, MAX_FORECAST_DAYS};

/// Weekly condition pattern, starting today
const WEEK_PATTERN: [Condition; MAX_FORECAST_DAYS] = [
    Condition::Sunny,
    Condition::Cloudy,
    Condition::Rain,
    Condition::Sunny,
    Condition::Rain,
    Condition::Cloudy,
    Condition::Sunny,
];

/// Build a seven-day synthetic payload starting on the farm's calendar day
/// of `now`, where `utc_offset` is the farm's shift from UTC
pub fn synthetic_payload(now: DateTime<Utc>, utc_offset: FixedOffset) -> CachedPayload {
    let today = now.with_timezone(&utc_offset).date_naive();

    let daily = WEEK_PATTERN
        .iter()
        .enumerate()
        .map(|(i, &condition)| DayForecast {
            date: today + Duration::days(i as i64),
            temp: TempRange { min: 18.0, max: 28.0 },
            condition,
            description: describe(condition).to_string(),
            rain_chance: if condition == Condition::Rain { 80 } else { 10 },
        })
        .collect();

    CachedPayload {
        current: CurrentReading {
            temp: 24.0,
            condition: Condition::Sunny,
            humidity: 65,
            wind_speed: 12.0,
        },
        daily,
        fetched_at_epoch_millis: now.timestamp_millis(),
    }
}

fn describe(condition: Condition) -> &'static str {
    match condition {
        Condition::Sunny => "Sunny with some clouds",
        Condition::Cloudy => "Partly cloudy",
        Condition::Rain => "Showers likely",
        Condition::Storm => "Thunderstorms possible",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_payload_shape() {
        let now = Utc::now();
        let payload = synthetic_payload(now, utc());

        assert_eq!(payload.daily.len(), 7);
        assert!(payload.is_valid());
        assert_eq!(payload.fetched_at_epoch_millis, now.timestamp_millis());
        assert_eq!(payload.daily[0].date, now.date_naive());
        assert!(payload.daily.iter().all(|d| !d.description.is_empty()));
    }

    #[test]
    fn test_synthetic_rain_days_carry_high_rain_chance() {
        let payload = synthetic_payload(Utc::now(), utc());

        for day in &payload.daily {
            if day.condition == Condition::Rain {
                assert_eq!(day.rain_chance, 80);
            } else {
                assert_eq!(day.rain_chance, 10);
            }
        }
        assert_eq!(payload.daily[2].condition, Condition::Rain);
    }

    #[test]
    fn test_synthetic_today_follows_farm_offset() {
        // 22:30 UTC on the 1st is already the 2nd in UTC+3 and still the 1st in UTC-5
        let now = DateTime::parse_from_rfc3339("2024-06-01T22:30:00Z").unwrap().with_timezone(&Utc);

        let east = synthetic_payload(now, FixedOffset::east_opt(10_800).unwrap());
        let west = synthetic_payload(now, FixedOffset::west_opt(18_000).unwrap());

        assert_eq!(east.daily[0].date.to_string(), "2024-06-02");
        assert_eq!(west.daily[0].date.to_string(), "2024-06-01");
        assert_eq!(east.daily[6].date.to_string(), "2024-06-08");
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }
}
