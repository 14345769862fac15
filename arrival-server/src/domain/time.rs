//! Timetable time handling.
//!
//! Timetables provide departure times as "HH:MM:SS" strings with no date.
//! GTFS allows the hour to run past 23 for trips that continue after
//! midnight on the same service day, so a departure time is stored as an
//! offset from midnight rather than as a `NaiveTime`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// Latest hour accepted in a departure time.
const MAX_HOUR: u32 = 47;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A scheduled departure time, relative to the start of its service day.
///
/// # Examples
///
/// ```
/// use arrival_server::domain::DepartureTime;
/// use chrono::NaiveDate;
///
/// let time = DepartureTime::parse_hhmmss("08:00:00").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(time.on(date).to_string(), "2024-03-15 08:00:00");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartureTime {
    secs: u32,
}

impl DepartureTime {
    /// Create a departure time from hours, minutes and seconds.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, TimeError> {
        if hour > MAX_HOUR {
            return Err(TimeError::new("hour must be 0-47"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        Ok(Self {
            secs: hour * 3600 + minute * 60 + second,
        })
    }

    /// Parse a time from "HH:MM:SS" format.
    ///
    /// A single-digit hour ("8:00:00") is accepted, since some GTFS
    /// producers omit the leading zero.
    ///
    /// ```
    /// use arrival_server::domain::DepartureTime;
    ///
    /// assert!(DepartureTime::parse_hhmmss("00:00:00").is_ok());
    /// assert!(DepartureTime::parse_hhmmss("23:59:59").is_ok());
    /// assert!(DepartureTime::parse_hhmmss("25:10:00").is_ok());
    ///
    /// assert!(DepartureTime::parse_hhmmss("08:00").is_err());
    /// assert!(DepartureTime::parse_hhmmss("08:60:00").is_err());
    /// assert!(DepartureTime::parse_hhmmss("ab:cd:ef").is_err());
    /// ```
    pub fn parse_hhmmss(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 2 {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hour = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        let second =
            parse_two_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;

        Self::from_hms(hour, minute, second)
    }

    /// Seconds after midnight of the service day.
    pub fn seconds_from_midnight(&self) -> u32 {
        self.secs
    }

    /// Returns the hour (0-47).
    pub fn hour(&self) -> u32 {
        self.secs / 3600
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        (self.secs / 60) % 60
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.secs % 60
    }

    /// Place this time on a calendar date.
    ///
    /// Hours past 23 roll into the following day.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::seconds(i64::from(self.secs))
    }
}

impl fmt::Debug for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepartureTime({self})")
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl Serialize for DepartureTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse two ASCII digits into a u32.
fn parse_two_digits(s: &str) -> Option<u32> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s)
}

fn parse_digits(s: &str) -> Option<u32> {
    s.chars()
        .try_fold(0u32, |acc, c| Some(acc * 10 + c.to_digit(10)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        let t = DepartureTime::parse_hhmmss("00:00:00").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (0, 0, 0));

        let t = DepartureTime::parse_hhmmss("23:59:59").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (23, 59, 59));

        let t = DepartureTime::parse_hhmmss("08:04:30").unwrap();
        assert_eq!(t.seconds_from_midnight(), 8 * 3600 + 4 * 60 + 30);
    }

    #[test]
    fn parse_single_digit_hour() {
        let t = DepartureTime::parse_hhmmss("8:15:00").unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.to_string(), "08:15:00");
    }

    #[test]
    fn parse_invalid_format() {
        assert!(DepartureTime::parse_hhmmss("").is_err());
        assert!(DepartureTime::parse_hhmmss("08:00").is_err());
        assert!(DepartureTime::parse_hhmmss("08:00:00:00").is_err());
        assert!(DepartureTime::parse_hhmmss("08-00-00").is_err());
        assert!(DepartureTime::parse_hhmmss("080:00:00").is_err());
        assert!(DepartureTime::parse_hhmmss("08:0:00").is_err());
        assert!(DepartureTime::parse_hhmmss("08:00:0x").is_err());
    }

    #[test]
    fn parse_out_of_range() {
        assert!(DepartureTime::parse_hhmmss("48:00:00").is_err());
        assert!(DepartureTime::parse_hhmmss("12:60:00").is_err());
        assert!(DepartureTime::parse_hhmmss("12:00:60").is_err());
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let t = DepartureTime::parse_hhmmss(" 09:30:00 ").unwrap();
        assert_eq!(t.to_string(), "09:30:00");
    }

    #[test]
    fn on_date_same_day() {
        let t = DepartureTime::parse_hhmmss("08:00:00").unwrap();
        let dt = t.on(date(2024, 3, 15));
        assert_eq!(dt, date(2024, 3, 15).and_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn on_date_past_midnight_rolls_over() {
        let t = DepartureTime::parse_hhmmss("25:10:00").unwrap();
        let dt = t.on(date(2024, 3, 15));
        assert_eq!(dt, date(2024, 3, 16).and_hms_opt(1, 10, 0).unwrap());
    }

    #[test]
    fn display_round_trips() {
        let t = DepartureTime::from_hms(7, 5, 9).unwrap();
        assert_eq!(t.to_string(), "07:05:09");
        assert_eq!(DepartureTime::parse_hhmmss(&t.to_string()).unwrap(), t);
    }

    #[test]
    fn serializes_as_string() {
        let t = DepartureTime::from_hms(8, 0, 0).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"08:00:00\"");
    }
}
