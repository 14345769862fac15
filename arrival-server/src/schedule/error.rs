//! Timetable error types.

/// Errors from fetching or parsing a timetable.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Reading a local timetable failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive could not be opened or is missing a file
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A GTFS file could not be parsed
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },
}

/// Errors from building the schedule store.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The timetable provider could not supply a schedule
    #[error("timetable provider unavailable: {0}")]
    ProviderUnavailable(#[from] TimetableError),
}
