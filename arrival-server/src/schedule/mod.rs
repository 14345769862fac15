//! Static timetable loading and lookup.
//!
//! The schedule is fetched once at startup. If that fails the server must
//! not start, since every arrival query depends on it. After loading, the
//! store is shared read-only between request handlers.

mod error;
mod gtfs;
mod store;

pub use error::{ScheduleError, TimetableError};
pub use gtfs::{GtfsTimetable, GtfsTimetableConfig, TimetableSource, parse_gtfs_zip};
pub use store::{ScheduleStore, TimetableProvider};
