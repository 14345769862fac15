//! Vehicle position feeds.
//!
//! The refresh scheduler polls a [`VehicleFeed`] for the current set of
//! observations. In production this is the Bus Open Data Service SIRI-VM
//! datafeed; for development a JSON file can stand in for it.

mod bods;
mod error;
mod mock;
mod siri;

use std::future::Future;

use crate::domain::VehicleObservation;

pub use bods::{BodsClient, BodsConfig};
pub use error::FeedError;
pub use mock::MockVehicleFeed;
pub use siri::{SiriDelivery, parse_siri_vm};

/// A source of live vehicle observations.
pub trait VehicleFeed: Send + Sync + 'static {
    /// Fetch the current observations, in feed order.
    fn fetch_observations(
        &self,
    ) -> impl Future<Output = Result<Vec<VehicleObservation>, FeedError>> + Send;
}
