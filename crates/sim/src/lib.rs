//! Moisture and resource simulation for a small automated garden.
//!
//! The crate owns everything that advances once per tick: per-plant soil
//! moisture, the rainwater tank, the solar battery and the water-saved
//! counter.  It does no I/O.  Weather arrives as an optional
//! [`WeatherSnapshot`] and the caller supplies the wall-clock instant for
//! each step, so the same inputs always produce the same moisture and ledger
//! values.
//!
//! ```text
//! weather ──▶ Garden::tick ──▶ plants' + ledger' ──▶ status (derived)
//!                  ▲
//!   modes ─────────┘        Garden::water_all (manual, between ticks)
//! ```

pub mod engine;
pub mod error;
pub mod ledger;
pub mod plant;
pub mod profile;
pub mod status;
pub mod weather;

pub use engine::{Garden, Modes, OverrideReport, TickReport, Watering, WateringKind};
pub use error::SimError;
pub use ledger::{LedgerSnapshot, ResourceLedger};
pub use plant::{default_seeds, HistoryEntry, PlantSeed, PlantState, HISTORY_CAPACITY};
pub use profile::{PlantProfile, ProfileTable};
pub use status::{classify, PlantStatus};
pub use weather::{ForecastDay, WeatherReport, WeatherSnapshot, FORECAST_DAYS};
