//! Shared garden resources: rainwater tank, solar battery, water-saved
//! counter.  Only the engine and the manual override mutate it.

use serde::Serialize;

const TANK_MIN: f64 = 0.0;
const TANK_MAX: f64 = 100.0;
const SOLAR_MIN: f64 = 20.0;
const SOLAR_MAX: f64 = 100.0;

/// Solar gain per daylight tick before the controller's own draw.
const SOLAR_GAIN: f64 = 0.5;
const SOLAR_USAGE_AUTO: f64 = 0.2;
const SOLAR_USAGE_IDLE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLedger {
    tank_level: f64,
    solar_charge: f64,
    water_saved: f64,
}

/// Read-only copy handed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub tank_level: f64,
    pub solar_charge: f64,
    pub water_saved: f64,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(68.0, 85.0, 0.0)
    }
}

impl ResourceLedger {
    pub fn new(tank_level: f64, solar_charge: f64, water_saved: f64) -> Self {
        Self {
            tank_level: tank_level.clamp(TANK_MIN, TANK_MAX),
            solar_charge: solar_charge.clamp(SOLAR_MIN, SOLAR_MAX),
            water_saved: water_saved.max(0.0),
        }
    }

    pub fn tank_level(&self) -> f64 {
        self.tank_level
    }

    pub fn solar_charge(&self) -> f64 {
        self.solar_charge
    }

    pub fn water_saved(&self) -> f64 {
        self.water_saved
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            tank_level: self.tank_level,
            solar_charge: self.solar_charge,
            water_saved: self.water_saved,
        }
    }

    /// Draw water from the tank.  The tank never goes below empty.
    pub(crate) fn charge_tank(&mut self, units: f64) {
        self.tank_level = (self.tank_level - units).clamp(TANK_MIN, TANK_MAX);
    }

    pub(crate) fn replenish_tank(&mut self, units: f64) {
        self.tank_level = (self.tank_level + units).clamp(TANK_MIN, TANK_MAX);
    }

    /// The counter only moves up; negative amounts are ignored.
    pub(crate) fn accumulate_saved(&mut self, units: f64) {
        self.water_saved += units.max(0.0);
    }

    pub(crate) fn update_solar(&mut self, daylight: bool, auto_watering: bool) {
        let usage = if auto_watering {
            SOLAR_USAGE_AUTO
        } else {
            SOLAR_USAGE_IDLE
        };
        let delta = if daylight { SOLAR_GAIN - usage } else { -usage };
        self.solar_charge = (self.solar_charge + delta).clamp(SOLAR_MIN, SOLAR_MAX);
    }
}
