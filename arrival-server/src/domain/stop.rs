//! Scheduled stop times.

use serde::Serialize;

use super::DepartureTime;

/// One row of the timetable: a trip departing a stop at a time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledStop {
    pub trip_id: String,
    pub stop_id: String,
    pub departure_time: DepartureTime,
}

impl ScheduledStop {
    /// Create a new scheduled stop.
    pub fn new(
        trip_id: impl Into<String>,
        stop_id: impl Into<String>,
        departure_time: DepartureTime,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
            departure_time,
        }
    }
}
