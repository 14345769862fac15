//! Delay classification.

use serde::Serialize;

/// Delays below this many seconds count as early.
pub const EARLY_THRESHOLD_SECS: f64 = -60.0;

/// Delays above this many seconds count as late.
pub const LATE_THRESHOLD_SECS: f64 = 299.0;

/// How an observed arrival compares to its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DelayStatus {
    Early,
    #[serde(rename = "On time")]
    OnTime,
    Late,
}

impl DelayStatus {
    /// Classify a signed delay in seconds.
    ///
    /// `delay < -60` is early, `-60 <= delay <= 299` is on time and
    /// anything later is late.
    ///
    /// ```
    /// use arrival_server::domain::DelayStatus;
    ///
    /// assert_eq!(DelayStatus::classify(-61.0), DelayStatus::Early);
    /// assert_eq!(DelayStatus::classify(-60.0), DelayStatus::OnTime);
    /// assert_eq!(DelayStatus::classify(299.0), DelayStatus::OnTime);
    /// assert_eq!(DelayStatus::classify(300.0), DelayStatus::Late);
    /// ```
    pub fn classify(delay_sec: f64) -> Self {
        if delay_sec < EARLY_THRESHOLD_SECS {
            DelayStatus::Early
        } else if delay_sec <= LATE_THRESHOLD_SECS {
            DelayStatus::OnTime
        } else {
            DelayStatus::Late
        }
    }

    /// The label used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayStatus::Early => "Early",
            DelayStatus::OnTime => "On time",
            DelayStatus::Late => "Late",
        }
    }
}

/// Outcome of evaluating a trip at a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayResult {
    pub trip_id: String,
    pub stop_id: String,
    /// Observed minus scheduled, in seconds. Negative means early.
    pub delay_sec: f64,
    pub status: DelayStatus,
}

impl DelayResult {
    /// Build a result, classifying the delay.
    pub fn new(trip_id: impl Into<String>, stop_id: impl Into<String>, delay_sec: f64) -> Self {
        Self {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
            delay_sec,
            status: DelayStatus::classify(delay_sec),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn below_early_threshold_is_early(delay in -100_000.0f64..-60.0) {
            prop_assume!(delay < EARLY_THRESHOLD_SECS);
            prop_assert_eq!(DelayStatus::classify(delay), DelayStatus::Early);
        }

        #[test]
        fn inside_window_is_on_time(delay in -60.0f64..=299.0) {
            prop_assert_eq!(DelayStatus::classify(delay), DelayStatus::OnTime);
        }

        #[test]
        fn above_late_threshold_is_late(delay in 299.0f64..100_000.0) {
            prop_assume!(delay > LATE_THRESHOLD_SECS);
            prop_assert_eq!(DelayStatus::classify(delay), DelayStatus::Late);
        }

        /// Every delay lands in exactly one bucket, and buckets are ordered.
        #[test]
        fn classification_is_monotonic(a in -10_000.0f64..10_000.0, b in -10_000.0f64..10_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank = |s: DelayStatus| match s {
                DelayStatus::Early => 0,
                DelayStatus::OnTime => 1,
                DelayStatus::Late => 2,
            };
            prop_assert!(rank(DelayStatus::classify(lo)) <= rank(DelayStatus::classify(hi)));
        }
    }
}
