//! Endpoint handlers. Each performs exactly one engine call.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request::{FormBody, JourneyIdForm, JsonBody};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::pooling::{Assignment, CarSpec, JourneyId, JourneySpec};

/// Liveness probe.
pub async fn status() -> StatusCode {
    StatusCode::OK
}

/// `PUT /cars`: replace the fleet.
pub async fn put_cars(
    State(state): State<AppState>,
    JsonBody(cars): JsonBody<Vec<CarSpec>>,
) -> Result<StatusCode, ApiError> {
    state.engine.reset_fleet(cars)?;
    Ok(StatusCode::OK)
}

/// `POST /journey`: register a group.
pub async fn post_journey(
    State(state): State<AppState>,
    JsonBody(journey): JsonBody<JourneySpec>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = state.engine.request_journey(journey)?;
    if let Assignment::Assigned(car) = assignment {
        tracing::debug!(journey = journey.id, car = %car, "Journey seated on arrival");
    }
    Ok((StatusCode::ACCEPTED, "New journey created"))
}

/// `POST /dropoff`: release a group, then offer the freed seats to the queue.
pub async fn post_dropoff(
    State(state): State<AppState>,
    FormBody(form): FormBody<JourneyIdForm>,
) -> Result<StatusCode, ApiError> {
    let id = JourneyId::try_from(form.id)?;
    if let Some(promoted) = state.engine.dropoff_and_reassign(id)? {
        tracing::debug!(journey = %id, promoted = %promoted, "Freed seats reassigned");
    }
    Ok(StatusCode::OK)
}

/// `POST /locate`: car snapshot, or 204 while the group is still waiting.
pub async fn post_locate(
    State(state): State<AppState>,
    FormBody(form): FormBody<JourneyIdForm>,
) -> Result<Response, ApiError> {
    let id = JourneyId::try_from(form.id)?;
    Ok(match state.engine.locate(id)? {
        Some(car) => (StatusCode::OK, Json(car)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
