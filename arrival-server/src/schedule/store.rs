//! Schedule store.

use std::collections::HashMap;
use std::future::Future;

use tracing::info;

use crate::domain::ScheduledStop;

use super::error::{ScheduleError, TimetableError};

/// A source of scheduled stop times.
///
/// Rows must be returned in the provider's own order; that order decides
/// which row wins when a (trip, stop) pair appears more than once.
pub trait TimetableProvider {
    /// Fetch every scheduled stop time.
    fn fetch_stop_times(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduledStop>, TimetableError>> + Send;
}

/// Immutable table of scheduled stop times.
///
/// Built once and never modified, so it can be shared behind an `Arc`
/// without locking.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    stops: Vec<ScheduledStop>,
    /// trip_id → stop_id → index of the first matching row.
    index: HashMap<String, HashMap<String, usize>>,
}

impl ScheduleStore {
    /// Load the schedule from a provider.
    ///
    /// Fails with `ProviderUnavailable` if the provider cannot deliver.
    pub async fn load<P: TimetableProvider>(provider: &P) -> Result<Self, ScheduleError> {
        let stops = provider.fetch_stop_times().await?;
        let store = Self::from_stops(stops);
        info!(
            rows = store.len(),
            trips = store.index.len(),
            "loaded schedule"
        );
        Ok(store)
    }

    /// Build a store from rows in load order.
    pub fn from_stops(stops: Vec<ScheduledStop>) -> Self {
        let mut index: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (i, stop) in stops.iter().enumerate() {
            index
                .entry(stop.trip_id.clone())
                .or_default()
                .entry(stop.stop_id.clone())
                .or_insert(i);
        }
        Self { stops, index }
    }

    /// Find the scheduled stop for a trip at a stop.
    ///
    /// When the timetable lists the pair more than once, the first row in
    /// load order is returned.
    pub fn lookup(&self, trip_id: &str, stop_id: &str) -> Option<&ScheduledStop> {
        let i = *self.index.get(trip_id)?.get(stop_id)?;
        self.stops.get(i)
    }

    /// Number of rows loaded.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether no rows were loaded.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
