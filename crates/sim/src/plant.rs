use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::profile::PlantProfile;
use crate::status::{classify, PlantStatus};

/// Number of ticks kept in each plant's moisture trail.
pub const HISTORY_CAPACITY: usize = 25;

pub(crate) const MOISTURE_MIN: f64 = 5.0;
pub(crate) const MOISTURE_MAX: f64 = 100.0;

/// Initial description of one plant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlantSeed {
    pub id: String,
    pub species: String,
    pub moisture: f64,
    pub last_watered_hours_ago: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub label: String,
    pub moisture: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlantState {
    pub id: String,
    pub species: String,
    pub moisture: f64,
    pub last_watered_at: DateTime<Utc>,
    pub history: VecDeque<HistoryEntry>,
    pub status: PlantStatus,
    #[serde(skip)]
    pub(crate) profile: PlantProfile,
}

impl PlantState {
    pub(crate) fn from_seed(seed: &PlantSeed, profile: PlantProfile, now: DateTime<Utc>) -> Self {
        let moisture = clamp_moisture(seed.moisture);
        // Offsets outside chrono's range leave the plant watered "now".
        let offset_ms = (seed.last_watered_hours_ago * 3_600_000.0) as i64;
        let last_watered_at = Duration::try_milliseconds(offset_ms)
            .and_then(|offset| now.checked_sub_signed(offset))
            .unwrap_or(now);
        Self {
            id: seed.id.clone(),
            species: seed.species.clone(),
            moisture,
            last_watered_at,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            status: classify(moisture, &profile),
            profile,
        }
    }

    /// Append to the trail, dropping the oldest entry once full.
    pub(crate) fn record_history(&mut self, timestamp: DateTime<Utc>) {
        if self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry {
            label: "0h".to_string(),
            moisture: self.moisture,
            timestamp,
        });
    }

    pub(crate) fn refresh_status(&mut self) {
        self.status = classify(self.moisture, &self.profile);
    }
}

pub(crate) fn clamp_moisture(m: f64) -> f64 {
    m.clamp(MOISTURE_MIN, MOISTURE_MAX)
}

/// The six plants every fresh session starts with.
pub fn default_seeds() -> Vec<PlantSeed> {
    let seed = |id: &str, species: &str, moisture: f64, hours: f64| PlantSeed {
        id: id.to_string(),
        species: species.to_string(),
        moisture,
        last_watered_hours_ago: hours,
    };

    vec![
        seed("cabbage", "Cabbage", 72.0, 6.0),
        seed("jade-plant", "Jade Plant", 34.0, 72.0),
        seed("aloe-vera", "Aloe Vera", 22.0, 120.0),
        seed("tomato", "Tomato", 58.0, 12.0),
        seed("mint", "Mint", 66.0, 8.0),
        seed("rosemary", "Rosemary", 40.0, 48.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn mint() -> PlantSeed {
        PlantSeed {
            id: "m".into(),
            species: "Mint".into(),
            moisture: 66.0,
            last_watered_hours_ago: 8.0,
        }
    }

    #[test]
    fn from_seed_backdates_last_watered() {
        let p = PlantState::from_seed(&mint(), PlantProfile::new(55.0, 75.0, 2.8, 22.0), t0());
        assert_eq!(p.last_watered_at, t0() - Duration::hours(8));
        assert_eq!(p.status, PlantStatus::Healthy);
        assert!(p.history.is_empty());
    }

    #[test]
    fn from_seed_survives_out_of_range_offset() {
        for hours in [1e10, f64::INFINITY, f64::NAN] {
            let seed = PlantSeed {
                last_watered_hours_ago: hours,
                ..mint()
            };
            let p = PlantState::from_seed(&seed, PlantProfile::new(55.0, 75.0, 2.8, 22.0), t0());
            assert!(p.last_watered_at <= t0(), "hours = {hours}");
        }
    }

    #[test]
    fn from_seed_clamps_moisture() {
        let seed = PlantSeed {
            moisture: 0.0,
            ..mint()
        };
        let p = PlantState::from_seed(&seed, PlantProfile::new(55.0, 75.0, 2.8, 22.0), t0());
        assert_eq!(p.moisture, 5.0);
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let mut p = PlantState::from_seed(&mint(), PlantProfile::new(55.0, 75.0, 2.8, 22.0), t0());
        for i in 0..40 {
            p.record_history(t0() + Duration::seconds(i));
            assert!(p.history.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(p.history.len(), HISTORY_CAPACITY);
        assert_eq!(p.history.front().unwrap().timestamp, t0() + Duration::seconds(15));
        assert_eq!(p.history.back().unwrap().label, "0h");
    }

    #[test]
    fn default_seed_species() {
        let species: Vec<String> = default_seeds().into_iter().map(|s| s.species).collect();
        assert_eq!(
            species,
            ["Cabbage", "Jade Plant", "Aloe Vera", "Tomato", "Mint", "Rosemary"]
        );
    }
}
