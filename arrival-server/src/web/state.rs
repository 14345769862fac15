//! Application state for the web layer.

use std::sync::Arc;

use crate::evaluator::ArrivalEvaluator;
use crate::live::LivePositionStore;
use crate::schedule::ScheduleStore;

/// Shared application state.
///
/// Handlers only read from the stores; the live position store is
/// written by the refresh scheduler.
#[derive(Clone)]
pub struct AppState {
    /// Timetable loaded at startup
    pub schedule: Arc<ScheduleStore>,

    /// Latest vehicle positions
    pub positions: LivePositionStore,

    /// Delay evaluation over the two stores
    pub evaluator: ArrivalEvaluator,
}

impl AppState {
    /// Create a new app state.
    pub fn new(schedule: Arc<ScheduleStore>, positions: LivePositionStore) -> Self {
        let evaluator = ArrivalEvaluator::new(Arc::clone(&schedule), positions.clone());
        Self {
            schedule,
            positions,
            evaluator,
        }
    }
}
