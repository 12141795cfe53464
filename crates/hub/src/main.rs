mod config;
mod scheduler;
mod state;
mod weather;
mod web;

use anyhow::{Context, Result};
use chrono::Utc;
use garden_sim::Garden;
use std::{env, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use state::SystemState;

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ─────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ── Config file (profiles, plants, ledger, modes) ───────────────
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "garden.toml".to_string());
    let cfg = config::load(&config_path)?;

    let seeds = cfg.seeds();
    let garden = Garden::new(
        &seeds,
        &cfg.profile_table(),
        cfg.ledger(),
        cfg.modes(),
        Utc::now(),
    )
    .context("failed to build garden")?;

    info!(
        config = %config_path,
        plants = seeds.len(),
        auto_watering = cfg.auto_watering,
        vacation_mode = cfg.vacation_mode,
        "garden ready"
    );

    // ── Shared state (ephemeral, for the dashboard) ─────────────────
    let shared = Arc::new(RwLock::new(SystemState::new(garden)));
    {
        let mut st = shared.write().await;
        st.record_system("hub started".to_string());
    }

    // ── Weather (single fetch, fallback on failure) ─────────────────
    let weather_state = Arc::clone(&shared);
    let weather_cfg = cfg.weather.clone();
    tokio::spawn(async move {
        let (report, source) = weather::load(&weather_cfg).await;
        weather_state.write().await.set_weather(report, source);
    });

    // ── Web server ──────────────────────────────────────────────────
    let web_state = Arc::clone(&shared);
    tokio::spawn(async move {
        if let Err(e) = web::serve(web_state).await {
            error!("web server stopped: {e:#}");
        }
    });

    // ── Simulation loop ─────────────────────────────────────────────
    scheduler::run(shared, cfg.tick_interval()).await;
    Ok(())
}
