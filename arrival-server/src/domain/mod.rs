//! Domain types for the arrival status server.
//!
//! These are the values that flow between the schedule store, the live
//! position store and the arrival evaluator. Parsing and validation happen
//! at construction, so code holding one of these can trust it.

mod delay;
mod observation;
mod stop;
mod time;

pub use delay::{DelayResult, DelayStatus, EARLY_THRESHOLD_SECS, LATE_THRESHOLD_SECS};
pub use observation::VehicleObservation;
pub use stop::ScheduledStop;
pub use time::{DepartureTime, TimeError};
