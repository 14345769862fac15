//! Arrival evaluation.
//!
//! Joins the static schedule with the latest live observation for a trip
//! to work out how late (or early) it is at a stop.
//!
//! Timetables carry no date, so the departure time is placed on the
//! current day in the server's local time zone. A trip scheduled just
//! before midnight and observed just after it will therefore look almost a
//! day early. Callers that know the service day can use
//! [`ArrivalEvaluator::evaluate_on`].

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::domain::{DelayResult, DepartureTime};
use crate::live::LivePositionStore;
use crate::schedule::ScheduleStore;

/// Reasons an arrival cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The timetable has no row for the trip at the stop
    #[error("no schedule")]
    NoSchedule,

    /// No vehicle is currently reporting the trip
    #[error("no live data")]
    NoLiveData,
}

/// Computes delays from the schedule and live positions.
#[derive(Clone)]
pub struct ArrivalEvaluator {
    schedule: Arc<ScheduleStore>,
    positions: LivePositionStore,
}

impl ArrivalEvaluator {
    /// Create an evaluator reading from the given stores.
    pub fn new(schedule: Arc<ScheduleStore>, positions: LivePositionStore) -> Self {
        Self {
            schedule,
            positions,
        }
    }

    /// Evaluate a trip at a stop against today's schedule.
    pub fn evaluate(&self, trip_id: &str, stop_id: &str) -> Result<DelayResult, EvalError> {
        self.evaluate_on(trip_id, stop_id, Local::now().date_naive())
    }

    /// Evaluate a trip at a stop, treating the schedule as running on
    /// `service_date`.
    pub fn evaluate_on(
        &self,
        trip_id: &str,
        stop_id: &str,
        service_date: NaiveDate,
    ) -> Result<DelayResult, EvalError> {
        let scheduled = self
            .schedule
            .lookup(trip_id, stop_id)
            .ok_or(EvalError::NoSchedule)?;
        let scheduled_at = scheduled_instant(scheduled.departure_time, service_date);

        let observation = self
            .positions
            .latest_for(trip_id)
            .ok_or(EvalError::NoLiveData)?;

        let delay = observation.recorded_at_time.with_timezone(&Utc) - scheduled_at;
        let delay_sec = delay.num_milliseconds() as f64 / 1000.0;

        Ok(DelayResult::new(trip_id, stop_id, delay_sec))
    }
}

/// Place a departure time on a date in the local time zone.
fn scheduled_instant(time: DepartureTime, date: NaiveDate) -> DateTime<Utc> {
    let naive = time.on(date);
    Local
        .from_local_datetime(&naive)
        .earliest()
        // Wall-clock times skipped by a DST change have no local reading.
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
        .with_timezone(&Utc)
}
