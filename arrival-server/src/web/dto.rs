//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query parameters for arrival status.
///
/// Both are optional here so a missing parameter can be reported with
/// the documented error body instead of axum's default rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ArrivalStatusRequest {
    pub trip_id: Option<String>,
    pub stop_id: Option<String>,
}

impl ArrivalStatusRequest {
    /// Both parameters, if both are present and non-empty.
    pub fn keys(&self) -> Option<(&str, &str)> {
        let trip = self.trip_id.as_deref().filter(|s| !s.is_empty())?;
        let stop = self.stop_id.as_deref().filter(|s| !s.is_empty())?;
        Some((trip, stop))
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub scheduled_stops: usize,
    pub vehicles: usize,
    /// RFC 3339 time of the last successful refresh
    pub refreshed_at: Option<String>,
}
