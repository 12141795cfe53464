use serde::Serialize;
use std::fmt;

use crate::profile::PlantProfile;

/// Margin below `optimal_min` at which a plant is considered thirsty rather
/// than merely due.
const NEEDS_WATER_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlantStatus {
    NeedsWater,
    WaterSoon,
    TooWet,
    Healthy,
}

/// Derive a health label from moisture.  Guards are evaluated top to bottom
/// and the first match wins.
pub fn classify(moisture: f64, profile: &PlantProfile) -> PlantStatus {
    match moisture {
        m if m < profile.optimal_min - NEEDS_WATER_MARGIN => PlantStatus::NeedsWater,
        m if m < profile.optimal_min => PlantStatus::WaterSoon,
        m if m > profile.optimal_max => PlantStatus::TooWet,
        _ => PlantStatus::Healthy,
    }
}

impl fmt::Display for PlantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeedsWater => write!(f, "Needs Water"),
            Self::WaterSoon => write!(f, "Water Soon"),
            Self::TooWet => write!(f, "Too Wet"),
            Self::Healthy => write!(f, "Healthy"),
        }
    }
}
