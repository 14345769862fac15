//! Live vehicle observations.
//!
//! The vehicle feed describes each vehicle with many provider-defined
//! fields (vehicle ref, position, bearing, line, ...). Only the trip
//! reference and the recording time are interpreted here; the rest is
//! carried through untouched so `/api/vehicle_positions` can return it.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single position report for a vehicle running a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleObservation {
    /// Trip the vehicle reports it is running.
    pub trip_id: String,

    /// When the vehicle recorded this observation.
    pub recorded_at_time: DateTime<FixedOffset>,

    /// Provider fields passed through without interpretation.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl VehicleObservation {
    /// Create an observation with no passthrough fields.
    pub fn new(trip_id: impl Into<String>, recorded_at_time: DateTime<FixedOffset>) -> Self {
        Self {
            trip_id: trip_id.into(),
            recorded_at_time,
            fields: Map::new(),
        }
    }

    /// Add a passthrough field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}
