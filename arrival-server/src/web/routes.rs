//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::domain::{DelayResult, VehicleObservation};
use crate::evaluator::EvalError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/vehicle_positions", get(vehicle_positions))
        .route("/api/arrival_status", get(arrival_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.positions.snapshot();
    Json(HealthResponse {
        status: "ok",
        scheduled_stops: state.schedule.len(),
        vehicles: snapshot.len(),
        refreshed_at: snapshot.refreshed_at().map(|t| t.to_rfc3339()),
    })
}

/// Every observation in the current snapshot.
async fn vehicle_positions(State(state): State<AppState>) -> Json<Vec<VehicleObservation>> {
    let snapshot = state.positions.snapshot();
    Json(snapshot.observations().to_vec())
}

/// Delay of a trip at a stop.
async fn arrival_status(
    State(state): State<AppState>,
    Query(req): Query<ArrivalStatusRequest>,
) -> Result<Json<DelayResult>, AppError> {
    let (trip_id, stop_id) = req.keys().ok_or(AppError::MissingParameter)?;

    let result = state.evaluator.evaluate(trip_id, stop_id)?;
    debug!(
        trip_id,
        stop_id,
        delay_sec = result.delay_sec,
        status = result.status.as_str(),
        "evaluated arrival"
    );

    Ok(Json(result))
}

/// Application error type.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// trip_id or stop_id missing from the query
    MissingParameter,
    NotFound { message: String },
}

impl From<EvalError> for AppError {
    fn from(e: EvalError) -> Self {
        AppError::NotFound {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingParameter => {
                (StatusCode::BAD_REQUEST, "trip_id & stop_id needed".to_string())
            }
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        debug!(%status, %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
