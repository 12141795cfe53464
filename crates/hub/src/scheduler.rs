//! Fixed-cadence simulation loop.
//!
//! Each tick takes the state write lock for its whole duration, so the
//! manual override and mode changes coming from the web API land strictly
//! between ticks.  The interval fires on schedule rather than chaining off
//! the previous tick's duration; a late tick is delayed, never doubled up.

use std::time::Duration;

use chrono::{Local, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the scheduler loop.  Never returns; main awaits it as its last step.
pub async fn run(shared: SharedState, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the garden first moves one full
    // interval after startup.
    ticker.tick().await;

    {
        let mut st = shared.write().await;
        let plants = st.garden.plants().len();
        info!(
            plants,
            tick_ms = interval.as_millis() as u64,
            modes = ?st.garden.modes(),
            "scheduler started"
        );
        st.record_system(format!(
            "scheduler started ({plants} plants, every {}s)",
            interval.as_secs_f64()
        ));
    }

    loop {
        ticker.tick().await;
        run_tick(&shared).await;
    }
}

/// Advance the simulation once against the wall clock.
async fn run_tick(shared: &SharedState) {
    let mut st = shared.write().await;
    // Local time decides day or night for the solar panel.
    let report = st.tick(Local::now());
    let ledger = st.garden.ledger().snapshot();

    for w in &report.watered {
        info!(plant = %w.plant_id, kind = ?w.kind, "scheduler: watered");
    }
    debug!(
        tick = st.ticks,
        tank = format!("{:.1}", ledger.tank_level),
        solar = format!("{:.1}", ledger.solar_charge),
        saved = format!("{:.1}", ledger.water_saved),
        rained = report.rained,
        "scheduler: tick complete"
    );

    if !report.watered.is_empty() && ledger.tank_level <= 0.0 {
        st.record_error(format!(
            "tank empty at {}",
            Utc::now().format("%H:%M:%S")
        ));
    }
}

// ===========================================================================
// Tests
// ===========================================================================
