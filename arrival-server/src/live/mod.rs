//! Live vehicle positions.
//!
//! The store holds the latest snapshot of observations; the refresh
//! scheduler is the only thing that replaces it.

mod refresh;
mod store;

pub use refresh::{RefreshConfig, RefreshError, RefreshScheduler};
pub use store::{LivePositionStore, Snapshot};
