//! Mock vehicle feed for running without BODS access.
//!
//! Serves observations from a JSON file (an array of observation records).
//! The file is re-read on every poll, so it can be edited while the server
//! is running.

use std::path::{Path, PathBuf};

use crate::domain::VehicleObservation;

use super::VehicleFeed;
use super::error::FeedError;

/// Vehicle feed that serves data from a JSON file.
#[derive(Debug, Clone)]
pub struct MockVehicleFeed {
    path: PathBuf,
}

impl MockVehicleFeed {
    /// Create a mock feed reading from `path`.
    ///
    /// The file is read once here so a bad path fails at startup.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let feed = Self {
            path: path.as_ref().to_path_buf(),
        };
        feed.load()?;
        Ok(feed)
    }

    fn load(&self) -> Result<Vec<VehicleObservation>, FeedError> {
        let json = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|e| FeedError::Json {
            message: format!("{}: {e}", self.path.display()),
        })
    }
}

impl VehicleFeed for MockVehicleFeed {
    async fn fetch_observations(&self) -> Result<Vec<VehicleObservation>, FeedError> {
        self.load()
    }
}
