//! One-shot weather read from the Open-Meteo forecast API.
//!
//! The fetch runs once at startup.  There is no retry and no timeout beyond
//! the HTTP client's defaults; any failure (network, HTTP status, malformed
//! payload) is logged and replaced by [`WeatherReport::fallback`].

use chrono::NaiveDate;
use garden_sim::{ForecastDay, WeatherReport, WeatherSnapshot, FORECAST_DAYS};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::WeatherEntry;
use crate::state::WeatherSource;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Request failed or the server answered with an error status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The payload parsed but does not describe a usable forecast.
    #[error("malformed weather payload: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Open-Meteo payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

impl ForecastResponse {
    fn into_report(self) -> Result<WeatherReport, WeatherError> {
        let d = self.daily;
        let days = [
            d.time.len(),
            d.weather_code.len(),
            d.temperature_2m_max.len(),
            d.temperature_2m_min.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0);
        if days < FORECAST_DAYS {
            return Err(WeatherError::Malformed(format!(
                "expected {FORECAST_DAYS} forecast days, got {days}"
            )));
        }

        let mut forecast = Vec::with_capacity(FORECAST_DAYS);
        for i in 0..FORECAST_DAYS {
            let date = NaiveDate::parse_from_str(&d.time[i], "%Y-%m-%d")
                .map_err(|e| WeatherError::Malformed(format!("bad date {:?}: {e}", d.time[i])))?;
            forecast.push(ForecastDay {
                day: date.format("%a").to_string(),
                temp_max: d.temperature_2m_max[i],
                temp_min: d.temperature_2m_min[i],
                code: d.weather_code[i],
            });
        }

        let c = self.current;
        Ok(WeatherReport {
            current: WeatherSnapshot {
                temp: c.temperature_2m,
                humidity: c.relative_humidity_2m,
                wind: c.wind_speed_10m,
                code: c.weather_code,
            },
            forecast,
        })
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Fetch current conditions and a five-day forecast.
pub async fn fetch(client: &reqwest::Client, cfg: &WeatherEntry) -> Result<WeatherReport, WeatherError> {
    let resp: ForecastResponse = client
        .get(&cfg.base_url)
        .query(&[
            ("latitude", cfg.latitude.to_string()),
            ("longitude", cfg.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("timezone", "auto".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    resp.into_report()
}

/// Fetch, substituting the static fallback on any failure.  Never errors.
pub async fn load(cfg: &WeatherEntry) -> (WeatherReport, WeatherSource) {
    let client = reqwest::Client::new();
    match fetch(&client, cfg).await {
        Ok(report) => {
            info!(
                temp = report.current.temp,
                humidity = report.current.humidity,
                code = report.current.code,
                "weather fetched"
            );
            (report, WeatherSource::Live)
        }
        Err(e) => {
            warn!("weather fetch failed, using fallback values: {e}");
            (WeatherReport::fallback(), WeatherSource::Fallback)
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use chrono::{TimeZone, Utc};
    use garden_sim::{default_seeds, Garden, Modes, ProfileTable, ResourceLedger};
    use tokio::net::TcpListener;

    const SAMPLE: &str = r#"{
        "latitude": 1.35,
        "current": {
            "time": "2025-06-02T10:00",
            "temperature_2m": 31.2,
            "relative_humidity_2m": 70,
            "wind_speed_10m": 11.5,
            "weather_code": 61
        },
        "daily": {
            "time": ["2025-06-02", "2025-06-03", "2025-06-04", "2025-06-05", "2025-06-06"],
            "weather_code": [61, 3, 0, 95, 2],
            "temperature_2m_max": [32.0, 31.5, 33.1, 30.0, 31.0],
            "temperature_2m_min": [25.0, 24.8, 25.5, 24.0, 24.9]
        }
    }"#;

    /// Serve `body` on an ephemeral local port and return the base URL.
    async fn serve_json(body: &'static str, status: u16) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let status = axum::http::StatusCode::from_u16(status).unwrap();
        let app = Router::new().route(
            "/v1/forecast",
            get(move || async move {
                (status, [(axum::http::header::CONTENT_TYPE, "application/json")], body)
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/forecast")
    }

    fn entry(base_url: String) -> WeatherEntry {
        WeatherEntry {
            base_url,
            ..WeatherEntry::default()
        }
    }

    // -- Payload mapping -------------------------------------------------

    #[test]
    fn sample_payload_maps_to_report() {
        let resp: ForecastResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = resp.into_report().unwrap();

        assert_eq!(report.current.temp, 31.2);
        assert_eq!(report.current.humidity, 70.0);
        assert_eq!(report.current.wind, 11.5);
        assert_eq!(report.current.code, 61);
        assert_eq!(report.forecast.len(), 5);
        // 2025-06-02 is a Monday.
        assert_eq!(report.forecast[0].day, "Mon");
        assert_eq!(report.forecast[4].day, "Fri");
        assert_eq!(report.forecast[3].code, 95);
        assert_eq!(report.forecast[2].temp_max, 33.1);
    }

    #[test]
    fn short_forecast_is_malformed() {
        let json = SAMPLE.replace(r#", "2025-06-06"]"#, "]");
        let resp: ForecastResponse = serde_json::from_str(&json).unwrap();
        let err = resp.into_report().unwrap_err();
        assert!(matches!(err, WeatherError::Malformed(_)), "{err}");
    }

    #[test]
    fn bad_date_is_malformed() {
        let json = SAMPLE.replace("2025-06-03", "tomorrow");
        let resp: ForecastResponse = serde_json::from_str(&json).unwrap();
        assert!(resp.into_report().is_err());
    }

    // -- Fetch + fallback ------------------------------------------------

    #[tokio::test]
    async fn load_returns_live_report() {
        let url = serve_json(SAMPLE, 200).await;
        let (report, source) = load(&entry(url)).await;
        assert_eq!(source, WeatherSource::Live);
        assert_eq!(report.current.temp, 31.2);
    }

    #[tokio::test]
    async fn load_falls_back_on_error_status() {
        let url = serve_json("{}", 503).await;
        let (report, source) = load(&entry(url)).await;
        assert_eq!(source, WeatherSource::Fallback);
        assert_eq!(report, WeatherReport::fallback());
    }

    #[tokio::test]
    async fn load_falls_back_on_malformed_payload() {
        let url = serve_json(r#"{"current": {}}"#, 200).await;
        let (_, source) = load(&entry(url)).await;
        assert_eq!(source, WeatherSource::Fallback);
    }

    #[tokio::test]
    async fn provider_failure_feeds_fallback_into_engine() {
        // Nothing listens on the discard port.
        let (report, source) = load(&entry("http://127.0.0.1:9/v1/forecast".into())).await;
        assert_eq!(source, WeatherSource::Fallback);
        assert_eq!(report.current.temp, 28.0);
        assert_eq!(report.current.humidity, 45.0);
        assert_eq!(report.current.code, 0);

        let manual = WeatherSnapshot {
            temp: 28.0,
            humidity: 45.0,
            wind: 9.0,
            code: 0,
        };
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let garden = || {
            Garden::new(
                &default_seeds(),
                &ProfileTable::builtin(),
                ResourceLedger::default(),
                Modes::default(),
                now,
            )
            .unwrap()
        };
        let mut a = garden();
        let mut b = garden();
        a.tick(Some(&report.current), now);
        b.tick(Some(&manual), now);
        for (pa, pb) in a.plants().iter().zip(b.plants()) {
            assert_eq!(pa.moisture, pb.moisture);
        }
    }
}
