use chrono::{DateTime, TimeZone, Utc};
use garden_sim::{
    Garden, LedgerSnapshot, Modes, OverrideReport, PlantState, TickReport, WateringKind,
    WeatherReport,
};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Maximum number of events retained in the ring buffer.
const MAX_EVENTS: usize = 200;

// ---------------------------------------------------------------------------
// Public type alias
// ---------------------------------------------------------------------------

pub type SharedState = Arc<RwLock<SystemState>>;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

pub struct SystemState {
    pub started_at: Instant,
    pub garden: Garden,
    pub weather: Option<WeatherReport>,
    pub weather_source: WeatherSource,
    pub ticks: u64,
    pub events: VecDeque<SystemEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    /// The startup fetch has not finished yet.
    Pending,
    Live,
    Fallback,
}

#[derive(Clone, Serialize)]
pub struct SystemEvent {
    pub ts: DateTime<Utc>,
    pub kind: EventKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Watering,
    Override,
    Mode,
    Weather,
    Error,
    System,
}

// ---------------------------------------------------------------------------
// JSON response (what the API returns)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    pub ticks: u64,
    pub modes: Modes,
    pub ledger: LedgerSnapshot,
    pub plants: Vec<PlantState>,
    pub weather: WeatherView,
    pub events: Vec<SystemEvent>,
}

#[derive(Serialize)]
pub struct WeatherView {
    pub source: WeatherSource,
    #[serde(flatten)]
    pub report: Option<WeatherReport>,
}

// ---------------------------------------------------------------------------
// Construction & mutation
// ---------------------------------------------------------------------------

impl SystemState {
    pub fn new(garden: Garden) -> Self {
        Self {
            started_at: Instant::now(),
            garden,
            weather: None,
            weather_source: WeatherSource::Pending,
            ticks: 0,
            events: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    /// Advance the garden one step using the latest known weather.
    pub fn tick<Tz: TimeZone>(&mut self, now: DateTime<Tz>) -> TickReport {
        let current = self.weather.as_ref().map(|w| w.current);
        let report = self.garden.tick(current.as_ref(), now);
        self.ticks += 1;

        for w in &report.watered {
            let detail = match w.kind {
                WateringKind::Auto => format!("{}: auto-watered", w.plant_id),
                WateringKind::Emergency => format!("{}: emergency watering (vacation)", w.plant_id),
            };
            self.push_event(EventKind::Watering, detail);
        }

        report
    }

    /// Run the manual "water all" override.
    pub fn water_all(&mut self, now: DateTime<Utc>) -> OverrideReport {
        let report = self.garden.water_all(now);
        self.push_event(
            EventKind::Override,
            format!(
                "watered all {} plants (tank {:.1}%)",
                report.plants_watered, report.ledger.tank_level
            ),
        );
        report
    }

    pub fn set_modes(&mut self, modes: Modes) {
        let before = self.garden.modes();
        self.garden.set_modes(modes);
        if before != modes {
            self.push_event(
                EventKind::Mode,
                format!(
                    "auto watering {}, vacation mode {}",
                    on_off(modes.auto_watering),
                    on_off(modes.vacation_mode)
                ),
            );
        }
    }

    pub fn set_weather(&mut self, report: WeatherReport, source: WeatherSource) {
        let detail = format!(
            "{} weather: {:.1}°C, {:.0}% humidity, code {}",
            match source {
                WeatherSource::Live => "live",
                _ => "fallback",
            },
            report.current.temp,
            report.current.humidity,
            report.current.code
        );
        self.weather = Some(report);
        self.weather_source = source;
        self.push_event(EventKind::Weather, detail);
    }

    /// Record an error event.
    pub fn record_error(&mut self, detail: String) {
        self.push_event(EventKind::Error, detail);
    }

    /// Record a generic system event.
    pub fn record_system(&mut self, detail: String) {
        self.push_event(EventKind::System, detail);
    }

    /// Build the JSON-serialisable status snapshot.
    pub fn to_status(&self) -> StatusResponse {
        StatusResponse {
            uptime_secs: self.started_at.elapsed().as_secs(),
            ticks: self.ticks,
            modes: self.garden.modes(),
            ledger: self.garden.ledger().snapshot(),
            plants: self.garden.plants().to_vec(),
            weather: WeatherView {
                source: self.weather_source,
                report: self.weather.clone(),
            },
            events: self.events.iter().rev().cloned().collect(),
        }
    }

    fn push_event(&mut self, kind: EventKind, detail: String) {
        if self.events.len() >= MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(SystemEvent {
            ts: Utc::now(),
            kind,
            detail,
        });
    }
}

fn on_off(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

// ===========================================================================
// Tests
// ===========================================================================
