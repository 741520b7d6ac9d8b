//! Read-only introspection of the engine state.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/fleet", get(get_fleet))
        .route("/admin/journeys", get(get_journeys))
}
