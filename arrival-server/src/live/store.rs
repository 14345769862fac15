//! Live position store.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::domain::VehicleObservation;

/// One complete set of observations from a single refresh.
#[derive(Debug, Default)]
pub struct Snapshot {
    observations: Vec<VehicleObservation>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Observations in the order the feed returned them.
    pub fn observations(&self) -> &[VehicleObservation] {
        &self.observations
    }

    /// When this snapshot was stored. `None` for the initial empty one.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Thread-safe holder of the current snapshot.
///
/// The snapshot itself is immutable; replacing it swaps the `Arc` under a
/// write lock held only for the assignment. Readers clone the `Arc` and
/// release the lock straight away, so a reader sees either the old or the
/// new snapshot in full and never waits on a fetch.
#[derive(Clone, Default)]
pub struct LivePositionStore {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl LivePositionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot.
    ///
    /// Only the refresh scheduler should call this.
    pub fn replace(&self, observations: Vec<VehicleObservation>) {
        let next = Arc::new(Snapshot {
            observations,
            refreshed_at: Some(Utc::now()),
        });
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// The most recently received observation for a trip.
    ///
    /// "Most recent" means last in snapshot order, which is the order the
    /// feed listed them. It is not necessarily the one with the latest
    /// `recorded_at_time`.
    pub fn latest_for(&self, trip_id: &str) -> Option<VehicleObservation> {
        self.snapshot()
            .observations
            .iter()
            .rev()
            .find(|o| o.trip_id == trip_id)
            .cloned()
    }

    /// When the current snapshot was stored.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot().refreshed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn obs(trip: &str, time: &str, vehicle: &str) -> VehicleObservation {
        VehicleObservation::new(trip, at(time)).with_field("vehicle_ref", vehicle)
    }

    #[test]
    fn starts_empty() {
        let store = LivePositionStore::new();

        assert!(store.snapshot().is_empty());
        assert!(store.refreshed_at().is_none());
        assert!(store.latest_for("T1").is_none());
    }

    #[test]
    fn replace_swaps_whole_snapshot() {
        let store = LivePositionStore::new();
        store.replace(vec![
            obs("T1", "2024-03-15T08:00:00Z", "V1"),
            obs("T2", "2024-03-15T08:00:00Z", "V2"),
        ]);
        assert_eq!(store.snapshot().len(), 2);
        assert!(store.refreshed_at().is_some());

        store.replace(vec![obs("T3", "2024-03-15T08:01:00Z", "V3")]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.observations()[0].trip_id, "T3");
        assert!(store.latest_for("T1").is_none());
    }

    #[test]
    fn held_snapshot_is_unaffected_by_replace() {
        let store = LivePositionStore::new();
        store.replace(vec![obs("T1", "2024-03-15T08:00:00Z", "V1")]);

        let held = store.snapshot();
        store.replace(Vec::new());

        assert_eq!(held.len(), 1);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn latest_for_no_match() {
        let store = LivePositionStore::new();
        store.replace(vec![obs("T1", "2024-03-15T08:00:00Z", "V1")]);

        assert!(store.latest_for("T2").is_none());
    }

    #[test]
    fn latest_for_picks_last_inserted_not_latest_timestamp() {
        let store = LivePositionStore::new();
        store.replace(vec![
            obs("T1", "2024-03-15T08:10:00Z", "V1"),
            obs("T2", "2024-03-15T08:20:00Z", "V9"),
            obs("T1", "2024-03-15T08:05:00Z", "V2"),
        ]);

        let latest = store.latest_for("T1").unwrap();
        assert_eq!(latest.fields["vehicle_ref"], "V2");
        assert_eq!(latest.recorded_at_time, at("2024-03-15T08:05:00Z"));
    }

    #[test]
    fn clones_share_state() {
        let store = LivePositionStore::new();
        let other = store.clone();

        store.replace(vec![obs("T1", "2024-03-15T08:00:00Z", "V1")]);
        assert!(other.latest_for("T1").is_some());
    }

    /// Readers running alongside a writer must only ever see a snapshot
    /// produced by a single `replace` call.
    #[test]
    fn concurrent_readers_never_see_partial_snapshot() {
        const SIZE: usize = 50;
        const GENERATIONS: usize = 200;

        let store = LivePositionStore::new();
        let generation = |n: usize| -> Vec<VehicleObservation> {
            (0..SIZE)
                .map(|i| obs(&format!("G{n}"), "2024-03-15T08:00:00Z", &format!("V{i}")))
                .collect()
        };
        store.replace(generation(0));

        std::thread::scope(|s| {
            let writer = store.clone();
            s.spawn(move || {
                for n in 1..=GENERATIONS {
                    writer.replace(generation(n));
                }
            });

            for _ in 0..4 {
                let reader = store.clone();
                s.spawn(move || {
                    for _ in 0..GENERATIONS {
                        let snapshot = reader.snapshot();
                        let observations = snapshot.observations();
                        assert_eq!(observations.len(), SIZE);
                        let trip = &observations[0].trip_id;
                        assert!(observations.iter().all(|o| &o.trip_id == trip));
                    }
                });
            }
        });

        assert_eq!(store.snapshot().observations()[0].trip_id, format!("G{GENERATIONS}"));
    }
}
