use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post, put};
use axum::Router;
use chrono::Utc;
use garden_sim::Modes;
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::state::SharedState;

/// Partial mode update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct ModesUpdate {
    pub auto_watering: Option<bool>,
    pub vacation_mode: Option<bool>,
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/status", get(api_status))
        .route("/api/water-all", post(api_water_all))
        .route("/api/modes", put(api_modes))
        .with_state(state)
}

async fn api_status(State(state): State<SharedState>) -> impl IntoResponse {
    let st = state.read().await;
    Json(st.to_status())
}

async fn api_water_all(State(state): State<SharedState>) -> impl IntoResponse {
    let mut st = state.write().await;
    let report = st.water_all(Utc::now());
    tracing::info!(
        plants = report.plants_watered,
        tank = format!("{:.1}", report.ledger.tank_level),
        "manual override: watered all plants"
    );
    Json(report)
}

async fn api_modes(
    State(state): State<SharedState>,
    Json(update): Json<ModesUpdate>,
) -> impl IntoResponse {
    let mut st = state.write().await;
    let current = st.garden.modes();
    let modes = Modes {
        auto_watering: update.auto_watering.unwrap_or(current.auto_watering),
        vacation_mode: update.vacation_mode.unwrap_or(current.vacation_mode),
    };
    st.set_modes(modes);
    tracing::info!(?modes, "modes updated");
    Json(modes)
}

// ---------------------------------------------------------------------------
// Server entry-point
// ---------------------------------------------------------------------------

pub async fn serve(state: SharedState) -> Result<()> {
    let port: u16 = env::var("WEB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind web port {port}"))?;

    tracing::info!("api listening on http://{addr}");

    axum::serve(listener, router(state))
        .await
        .context("web server error")
}

// ===========================================================================
// Tests
// ===========================================================================
