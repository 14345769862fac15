//! Periodic refresh of the live position store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::feed::{FeedError, VehicleFeed};

use super::store::LivePositionStore;

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between polls.
    pub interval: Duration,

    /// Longest a single poll may take before it is abandoned.
    pub timeout: Duration,
}

impl RefreshConfig {
    /// Create a new configuration.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Errors from a single refresh. None of these touch the store.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// The feed returned an error
    #[error("refresh failed: {0}")]
    Failed(#[from] FeedError),

    /// The feed did not answer in time
    #[error("refresh timed out after {0:?}")]
    TimedOut(Duration),
}

/// Polls a vehicle feed and swaps each result into the store.
pub struct RefreshScheduler<F> {
    feed: F,
    store: LivePositionStore,
    config: RefreshConfig,
}

impl<F: VehicleFeed> RefreshScheduler<F> {
    /// Create a scheduler writing into `store`.
    pub fn new(feed: F, store: LivePositionStore, config: RefreshConfig) -> Self {
        Self {
            feed,
            store,
            config,
        }
    }

    /// Poll the feed once.
    ///
    /// On success the store is replaced and the new observation count
    /// returned. On failure the store keeps its previous snapshot.
    pub async fn refresh_once(&self) -> Result<usize, RefreshError> {
        let observations = tokio::time::timeout(self.config.timeout, self.feed.fetch_observations())
            .await
            .map_err(|_| RefreshError::TimedOut(self.config.timeout))??;

        let count = observations.len();
        self.store.replace(observations);
        Ok(count)
    }

    /// Poll the feed once and log the outcome.
    async fn refresh_and_log(&self) {
        match self.refresh_once().await {
            Ok(count) => info!(count, "refreshed vehicle positions"),
            Err(e) => warn!(error = %e, "keeping previous vehicle positions"),
        }
    }

    /// Poll forever.
    ///
    /// The first poll happens immediately. At most one poll is in flight:
    /// a tick that comes due while the previous poll is still running is
    /// skipped, not queued.
    pub async fn run(self) {
        let this = Arc::new(self);
        let gate = Arc::new(Semaphore::new(1));

        let mut interval = tokio::time::interval(this.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let Ok(permit) = Arc::clone(&gate).try_acquire_owned() else {
                debug!("previous refresh still running, skipping tick");
                continue;
            };

            let scheduler = Arc::clone(&this);
            tokio::spawn(async move {
                let _permit = permit;
                scheduler.refresh_and_log().await;
            });
        }
    }

    /// Run on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
