use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::pooling::{CarView, EngineStats, JourneyView};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub engine: EngineStats,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        engine: state.engine.stats(),
    })
}

pub async fn get_fleet(State(state): State<AppState>) -> Json<Vec<CarView>> {
    Json(state.engine.fleet())
}

pub async fn get_journeys(State(state): State<AppState>) -> Json<Vec<JourneyView>> {
    Json(state.engine.journeys())
}
