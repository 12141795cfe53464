//! TOML config file loading and validation: tick cadence, starting modes,
//! starting ledger, weather location, extra species and the plant list.

use anyhow::{bail, Context, Result};
use garden_sim::{default_seeds, Modes, PlantProfile, PlantSeed, ProfileTable, ResourceLedger};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Upper bound on a seed's watering offset: one year.
const MAX_WATERED_HOURS_AGO: f64 = 24.0 * 365.0;

// ---------------------------------------------------------------------------
// Config file structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tick_interval_sec: i64,
    pub auto_watering: bool,
    pub vacation_mode: bool,
    pub ledger: LedgerEntry,
    pub weather: WeatherEntry,
    pub profiles: Vec<ProfileEntry>,
    /// Replaces the built-in seed list when non-empty.
    pub plants: Vec<PlantSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LedgerEntry {
    pub tank_level: f64,
    pub solar_charge: f64,
    pub water_saved: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileEntry {
    pub species: String,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub decay_rate: f64,
    pub water_absorption: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_sec: 5,
            auto_watering: true,
            vacation_mode: false,
            ledger: LedgerEntry::default(),
            weather: WeatherEntry::default(),
            profiles: Vec::new(),
            plants: Vec::new(),
        }
    }
}

impl Default for LedgerEntry {
    fn default() -> Self {
        let l = ResourceLedger::default();
        Self {
            tank_level: l.tank_level(),
            solar_charge: l.solar_charge(),
            water_saved: l.water_saved(),
        }
    }
}

impl Default for WeatherEntry {
    fn default() -> Self {
        Self {
            latitude: 1.3521,
            longitude: 103.8198,
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

impl ProfileEntry {
    fn profile(&self) -> PlantProfile {
        PlantProfile::new(
            self.optimal_min,
            self.optimal_max,
            self.decay_rate,
            self.water_absorption,
        )
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

impl Config {
    /// Built-in species plus (or overridden by) the configured ones.
    pub fn profile_table(&self) -> ProfileTable {
        let mut table = ProfileTable::builtin();
        for p in &self.profiles {
            table.insert(p.species.clone(), p.profile());
        }
        table
    }

    pub fn seeds(&self) -> Vec<PlantSeed> {
        if self.plants.is_empty() {
            default_seeds()
        } else {
            self.plants.clone()
        }
    }

    pub fn ledger(&self) -> ResourceLedger {
        ResourceLedger::new(
            self.ledger.tank_level,
            self.ledger.solar_charge,
            self.ledger.water_saved,
        )
    }

    pub fn modes(&self) -> Modes {
        Modes {
            auto_watering: self.auto_watering,
            vacation_mode: self.vacation_mode,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_sec.max(1) as u64)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Config {
    /// Validate all config entries. Returns `Ok(())` or an error describing
    /// every violation found (not just the first one).
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        self.validate_general(&mut errors);
        self.validate_profiles(&mut errors);
        self.validate_plants(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "config validation failed ({} error{}):\n  - {}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" },
                errors.join("\n  - ")
            );
        }
    }

    fn validate_general(&self, errors: &mut Vec<String>) {
        if self.tick_interval_sec <= 0 {
            errors.push(format!(
                "tick_interval_sec must be positive, got {}",
                self.tick_interval_sec
            ));
        }

        // ── Ledger ──────────────────────────────────────────
        let l = &self.ledger;
        if !(0.0..=100.0).contains(&l.tank_level) {
            errors.push(format!("ledger.tank_level {} out of range [0, 100]", l.tank_level));
        }
        if !(20.0..=100.0).contains(&l.solar_charge) {
            errors.push(format!(
                "ledger.solar_charge {} out of range [20, 100]",
                l.solar_charge
            ));
        }
        if l.water_saved < 0.0 {
            errors.push(format!("ledger.water_saved must not be negative, got {}", l.water_saved));
        }

        // ── Weather location ────────────────────────────────
        let w = &self.weather;
        if !(-90.0..=90.0).contains(&w.latitude) {
            errors.push(format!("weather.latitude {} out of range [-90, 90]", w.latitude));
        }
        if !(-180.0..=180.0).contains(&w.longitude) {
            errors.push(format!("weather.longitude {} out of range [-180, 180]", w.longitude));
        }
        if w.base_url.trim().is_empty() {
            errors.push("weather.base_url is empty".to_string());
        }
    }

    fn validate_profiles(&self, errors: &mut Vec<String>) {
        let mut seen: HashSet<&str> = HashSet::new();

        for (i, p) in self.profiles.iter().enumerate() {
            if p.species.trim().is_empty() {
                errors.push(format!("profiles[{i}]: species is empty"));
                continue;
            }
            if !seen.insert(&p.species) {
                errors.push(format!("profile '{}': duplicate species", p.species));
            }
            if let Err(e) = p.profile().validate(&p.species) {
                errors.push(e.to_string());
            }
        }
    }

    fn validate_plants(&self, errors: &mut Vec<String>) {
        let table = self.profile_table();
        let mut seen_ids: HashSet<&str> = HashSet::new();

        for (i, p) in self.plants.iter().enumerate() {
            let ctx = || {
                if p.id.is_empty() {
                    format!("plants[{i}]")
                } else {
                    format!("plant '{}'", p.id)
                }
            };

            // ── Identity ────────────────────────────────────────
            if p.id.trim().is_empty() {
                errors.push(format!("{}: id is empty", ctx()));
            } else if !seen_ids.insert(&p.id) {
                errors.push(format!("{}: duplicate id", ctx()));
            }

            if !table.contains(&p.species) {
                errors.push(format!(
                    "{}: no plant profile for species '{}'",
                    ctx(),
                    p.species
                ));
            }

            // ── Starting values ─────────────────────────────────
            if !(0.0..=100.0).contains(&p.moisture) {
                errors.push(format!(
                    "{}: moisture {} out of range [0, 100]",
                    ctx(),
                    p.moisture
                ));
            }
            if !p.last_watered_hours_ago.is_finite() {
                errors.push(format!(
                    "{}: last_watered_hours_ago must be a finite number, got {}",
                    ctx(),
                    p.last_watered_hours_ago
                ));
            } else if p.last_watered_hours_ago < 0.0 {
                errors.push(format!(
                    "{}: last_watered_hours_ago must not be negative, got {}",
                    ctx(),
                    p.last_watered_hours_ago
                ));
            } else if p.last_watered_hours_ago > MAX_WATERED_HOURS_AGO {
                errors.push(format!(
                    "{}: last_watered_hours_ago {} exceeds {MAX_WATERED_HOURS_AGO}",
                    ctx(),
                    p.last_watered_hours_ago
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read, parse, and validate a TOML config file.  A missing file yields the
/// built-in defaults.
pub fn load(path: &str) -> Result<Config> {
    if !Path::new(path).exists() {
        tracing::info!(path, "no config file, using built-in garden");
        return Ok(Config::default());
    }

    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config: {path}"))?;
    let config: Config =
        toml::from_str(&contents).with_context(|| format!("failed to parse config: {path}"))?;
    config
        .validate()
        .with_context(|| format!("invalid config: {path}"))?;

    tracing::info!(
        path,
        profiles = config.profiles.len(),
        plants = config.plants.len(),
        "config loaded"
    );

    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
