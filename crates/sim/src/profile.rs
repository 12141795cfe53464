//! Per-species watering constants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SimError;

/// Moisture band and water dynamics for one species.  All values are
/// percentages of full soil saturation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantProfile {
    pub optimal_min: f64,
    pub optimal_max: f64,
    /// Moisture lost per tick under a neutral environment.
    pub decay_rate: f64,
    /// Moisture gained per watering event.
    pub water_absorption: f64,
}

impl PlantProfile {
    pub const fn new(optimal_min: f64, optimal_max: f64, decay_rate: f64, water_absorption: f64) -> Self {
        Self {
            optimal_min,
            optimal_max,
            decay_rate,
            water_absorption,
        }
    }

    /// Check the profile invariants.  The engine never calls this; profiles
    /// are validated once where they enter the system.
    pub fn validate(&self, species: &str) -> Result<(), SimError> {
        let invalid = |reason: String| SimError::InvalidProfile {
            species: species.to_string(),
            reason,
        };

        if !(0.0..=100.0).contains(&self.optimal_min) || !(0.0..=100.0).contains(&self.optimal_max) {
            return Err(invalid(format!(
                "optimal band [{}, {}] outside [0, 100]",
                self.optimal_min, self.optimal_max
            )));
        }
        if self.optimal_min >= self.optimal_max {
            return Err(invalid(format!(
                "optimal_min ({}) must be less than optimal_max ({})",
                self.optimal_min, self.optimal_max
            )));
        }
        if self.decay_rate <= 0.0 {
            return Err(invalid(format!("decay_rate must be positive, got {}", self.decay_rate)));
        }
        if self.water_absorption <= 0.0 {
            return Err(invalid(format!(
                "water_absorption must be positive, got {}",
                self.water_absorption
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Built-in species
// ---------------------------------------------------------------------------

const BUILTIN: &[(&str, PlantProfile)] = &[
    ("Cabbage", PlantProfile::new(60.0, 80.0, 2.5, 25.0)),
    ("Jade Plant", PlantProfile::new(20.0, 40.0, 0.8, 15.0)),
    ("Aloe Vera", PlantProfile::new(15.0, 35.0, 0.6, 12.0)),
    ("Tomato", PlantProfile::new(60.0, 80.0, 3.0, 25.0)),
    ("Mint", PlantProfile::new(55.0, 75.0, 2.8, 22.0)),
    ("Rosemary", PlantProfile::new(25.0, 45.0, 1.2, 15.0)),
];

/// Species name → profile lookup.
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    profiles: HashMap<String, PlantProfile>,
}

impl ProfileTable {
    /// The six species of the default garden.
    pub fn builtin() -> Self {
        Self {
            profiles: BUILTIN
                .iter()
                .map(|(name, p)| (name.to_string(), *p))
                .collect(),
        }
    }

    /// Add a species, replacing any existing profile with the same name.
    pub fn insert(&mut self, species: impl Into<String>, profile: PlantProfile) {
        self.profiles.insert(species.into(), profile);
    }

    pub fn get(&self, species: &str) -> Result<&PlantProfile, SimError> {
        self.profiles
            .get(species)
            .ok_or_else(|| SimError::UnknownSpecies(species.to_string()))
    }

    pub fn contains(&self, species: &str) -> bool {
        self.profiles.contains_key(species)
    }
}
