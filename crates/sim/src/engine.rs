//! The simulation context and its two mutators: the periodic tick and the
//! manual "water all" override.
//!
//! ## Per-plant watering decision (first match wins)
//!
//! ```text
//! candidate = moisture − decay
//!
//! auto ∧ ¬vacation ∧ candidate < optimal_min  ──▶ +absorption,       tank −5, saved +0.5
//! vacation ∧ candidate < 25                    ──▶ +absorption × 0.6, tank −3
//! otherwise                                    ──▶ moisture = candidate
//! ```
//!
//! Tank charges are summed over all plants and applied once per tick, then
//! rain and solar are updated independently of the plants.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::error::SimError;
use crate::ledger::{LedgerSnapshot, ResourceLedger};
use crate::plant::{clamp_moisture, PlantSeed, PlantState, MOISTURE_MAX};
use crate::profile::ProfileTable;
use crate::weather::{env_factor, WeatherSnapshot};

/// Scales the species decay rate down to a single tick.
const DECAY_SCALE: f64 = 0.5;

const AUTO_WATER_CHARGE: f64 = 5.0;
const AUTO_WATER_SAVED: f64 = 0.5;

/// Global moisture floor below which vacation mode waters any species.
const EMERGENCY_FLOOR: f64 = 25.0;
const EMERGENCY_ABSORPTION_SCALE: f64 = 0.6;
const EMERGENCY_WATER_CHARGE: f64 = 3.0;

const RAIN_REPLENISH: f64 = 0.3;

/// Local hours (inclusive) during which the panel charges.
const DAYLIGHT_START_HOUR: u32 = 6;
const DAYLIGHT_END_HOUR: u32 = 18;

const OVERRIDE_CHARGE_PER_PLANT: f64 = 5.0;
const OVERRIDE_SAVED: f64 = 3.0;

// ---------------------------------------------------------------------------
// Modes & reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    pub auto_watering: bool,
    pub vacation_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WateringKind {
    Auto,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Watering {
    pub plant_id: String,
    pub kind: WateringKind,
}

/// What a single tick did, for logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub watered: Vec<Watering>,
    pub tank_charge: f64,
    pub rained: bool,
    pub daylight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverrideReport {
    pub plants_watered: usize,
    pub tank_charge: f64,
    pub ledger: LedgerSnapshot,
}

// ---------------------------------------------------------------------------
// Garden
// ---------------------------------------------------------------------------

/// All simulated state: the plants, the shared resources and the mode
/// switches.  One owner mutates it at a time.
#[derive(Debug, Clone)]
pub struct Garden {
    plants: Vec<PlantState>,
    ledger: ResourceLedger,
    modes: Modes,
}

impl Garden {
    /// Build a garden from a seed list.  Every species must resolve in
    /// `profiles`; plant ids must be unique.
    pub fn new(
        seeds: &[PlantSeed],
        profiles: &ProfileTable,
        ledger: ResourceLedger,
        modes: Modes,
        now: DateTime<Utc>,
    ) -> Result<Self, SimError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut plants = Vec::with_capacity(seeds.len());

        for seed in seeds {
            if !seen.insert(&seed.id) {
                return Err(SimError::DuplicatePlantId(seed.id.clone()));
            }
            let profile = *profiles.get(&seed.species)?;
            plants.push(PlantState::from_seed(seed, profile, now));
        }

        Ok(Self {
            plants,
            ledger,
            modes,
        })
    }

    pub fn plants(&self) -> &[PlantState] {
        &self.plants
    }

    pub fn plant(&self, id: &str) -> Option<&PlantState> {
        self.plants.iter().find(|p| p.id == id)
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn modes(&self) -> Modes {
        self.modes
    }

    pub fn set_modes(&mut self, modes: Modes) {
        self.modes = modes;
    }

    /// Advance every plant and the ledger by one step.
    ///
    /// `now` supplies the timestamps written to plant state and the local
    /// hour used for the solar day/night decision; nothing else depends on
    /// it.
    pub fn tick<Tz: TimeZone>(
        &mut self,
        weather: Option<&WeatherSnapshot>,
        now: DateTime<Tz>,
    ) -> TickReport {
        let modes = self.modes;
        let factor = env_factor(weather);
        let stamp = now.with_timezone(&Utc);

        let mut watered = Vec::new();
        let mut tank_charge = 0.0;

        for plant in &mut self.plants {
            let profile = plant.profile;
            // The environment only ever dries the soil.
            let decay = (profile.decay_rate * factor * DECAY_SCALE).max(0.0);
            let candidate = plant.moisture - decay;

            let kind = if modes.auto_watering
                && !modes.vacation_mode
                && candidate < profile.optimal_min
            {
                plant.moisture = (plant.moisture + profile.water_absorption).min(MOISTURE_MAX);
                self.ledger.accumulate_saved(AUTO_WATER_SAVED);
                tank_charge += AUTO_WATER_CHARGE;
                Some(WateringKind::Auto)
            } else if modes.vacation_mode && candidate < EMERGENCY_FLOOR {
                plant.moisture = (plant.moisture
                    + profile.water_absorption * EMERGENCY_ABSORPTION_SCALE)
                    .min(MOISTURE_MAX);
                tank_charge += EMERGENCY_WATER_CHARGE;
                Some(WateringKind::Emergency)
            } else {
                plant.moisture = candidate;
                None
            };

            if let Some(kind) = kind {
                plant.last_watered_at = stamp;
                watered.push(Watering {
                    plant_id: plant.id.clone(),
                    kind,
                });
            }

            plant.moisture = clamp_moisture(plant.moisture);
            plant.record_history(stamp);
            plant.refresh_status();
        }

        self.ledger.charge_tank(tank_charge);

        let rained = weather.is_some_and(WeatherSnapshot::is_precipitating);
        if rained {
            self.ledger.replenish_tank(RAIN_REPLENISH);
        }

        let daylight = (DAYLIGHT_START_HOUR..=DAYLIGHT_END_HOUR).contains(&now.hour());
        self.ledger.update_solar(daylight, modes.auto_watering);

        debug!(
            env_factor = factor,
            watered = watered.len(),
            tank_charge,
            rained,
            daylight,
            "garden tick"
        );

        TickReport {
            watered,
            tank_charge,
            rained,
            daylight,
        }
    }

    /// Top up every plant immediately, ignoring thresholds and modes.
    pub fn water_all(&mut self, now: DateTime<Utc>) -> OverrideReport {
        for plant in &mut self.plants {
            plant.moisture =
                clamp_moisture((plant.moisture + plant.profile.water_absorption).min(MOISTURE_MAX));
            plant.last_watered_at = now;
            plant.refresh_status();
        }

        let tank_charge = OVERRIDE_CHARGE_PER_PLANT * self.plants.len() as f64;
        self.ledger.accumulate_saved(OVERRIDE_SAVED);
        self.ledger.charge_tank(tank_charge);

        OverrideReport {
            plants_watered: self.plants.len(),
            tank_charge,
            ledger: self.ledger.snapshot(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
