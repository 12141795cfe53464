//! Weather inputs consumed by the engine, and the static fallback used when
//! the live provider is unreachable.

use serde::{Deserialize, Serialize};

/// Number of days in every forecast.
pub const FORECAST_DAYS: usize = 5;

/// Environmental factor used when no snapshot is available.
const NEUTRAL_ENV_FACTOR: f64 = 0.3;

/// Current conditions.  `code` is a WMO weather interpretation code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp: f64,
    pub humidity: f64,
    pub wind: f64,
    pub code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub code: i32,
}

/// A snapshot plus the five-day outlook, as handed over by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: WeatherSnapshot,
    pub forecast: Vec<ForecastDay>,
}

impl WeatherSnapshot {
    pub const FALLBACK: WeatherSnapshot = WeatherSnapshot {
        temp: 28.0,
        humidity: 45.0,
        wind: 9.0,
        code: 0,
    };

    /// How strongly the environment dries the soil.  Hot and dry air pushes
    /// this up; it can go negative in cold, saturated air.
    pub fn env_factor(&self) -> f64 {
        let temp_factor = (self.temp - 20.0) / 30.0;
        let humidity_factor = (100.0 - self.humidity) / 100.0;
        (temp_factor + humidity_factor) / 2.0
    }

    /// True for drizzle, rain, showers and thunderstorm codes.
    pub fn is_precipitating(&self) -> bool {
        is_precipitation_code(self.code)
    }
}

/// Environmental factor for an optional snapshot.
pub fn env_factor(weather: Option<&WeatherSnapshot>) -> f64 {
    weather.map_or(NEUTRAL_ENV_FACTOR, WeatherSnapshot::env_factor)
}

pub fn is_precipitation_code(code: i32) -> bool {
    matches!(code, 51..=67 | 80..=82 | 95..=99)
}

impl WeatherReport {
    /// Static report substituted when the provider fails.
    pub fn fallback() -> Self {
        let day = |day: &str, temp_max: f64, temp_min: f64, code: i32| ForecastDay {
            day: day.to_string(),
            temp_max,
            temp_min,
            code,
        };

        Self {
            current: WeatherSnapshot::FALLBACK,
            forecast: vec![
                day("Mon", 29.0, 19.0, 0),
                day("Tue", 27.0, 18.0, 2),
                day("Wed", 24.0, 17.0, 61),
                day("Thu", 26.0, 18.0, 3),
                day("Fri", 30.0, 20.0, 0),
            ],
        }
    }
}
