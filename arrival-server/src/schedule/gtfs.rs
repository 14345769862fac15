//! GTFS timetable provider.
//!
//! Reads scheduled departures from a GTFS zip, either downloaded from the
//! Bus Open Data Service or opened from disk. Only trips run by the
//! configured operator are kept.

use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::domain::{DepartureTime, ScheduledStop};

use super::error::TimetableError;
use super::store::TimetableProvider;

/// Where the GTFS archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimetableSource {
    Url(String),
    Path(PathBuf),
}

impl TimetableSource {
    /// Interpret a configured location: anything with an http(s) scheme is
    /// a URL, everything else a local path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            TimetableSource::Url(location.to_string())
        } else {
            TimetableSource::Path(PathBuf::from(location))
        }
    }
}

/// Configuration for the GTFS timetable provider.
#[derive(Debug, Clone)]
pub struct GtfsTimetableConfig {
    /// Archive location
    pub source: TimetableSource,
    /// API key, sent as the `api_key` query parameter
    pub api_key: Option<String>,
    /// Agency name to keep; empty keeps every agency
    pub operator: String,
    /// Download timeout in seconds
    pub timeout_secs: u64,
}

impl GtfsTimetableConfig {
    /// Create a new config reading from the given source.
    pub fn new(source: TimetableSource) -> Self {
        Self {
            source,
            api_key: None,
            operator: String::new(),
            timeout_secs: 120,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Restrict the timetable to one operator.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Set the download timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Timetable provider backed by a GTFS archive.
#[derive(Debug, Clone)]
pub struct GtfsTimetable {
    http: reqwest::Client,
    config: GtfsTimetableConfig,
}

impl GtfsTimetable {
    /// Create a new provider.
    pub fn new(config: GtfsTimetableConfig) -> Result<Self, TimetableError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    async fn fetch_archive(&self) -> Result<Vec<u8>, TimetableError> {
        match &self.config.source {
            TimetableSource::Path(path) => {
                info!(path = %path.display(), "reading GTFS archive");
                Ok(std::fs::read(path)?)
            }
            TimetableSource::Url(url) => {
                info!(%url, "downloading GTFS archive");
                let mut request = self.http.get(url);
                if let Some(key) = &self.config.api_key {
                    request = request.query(&[("api_key", key)]);
                }

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(TimetableError::Api {
                        status: status.as_u16(),
                        message: body,
                    });
                }

                let bytes = response.bytes().await?;
                debug!(bytes = bytes.len(), "downloaded GTFS archive");
                Ok(bytes.to_vec())
            }
        }
    }
}

impl TimetableProvider for GtfsTimetable {
    async fn fetch_stop_times(&self) -> Result<Vec<ScheduledStop>, TimetableError> {
        let bytes = self.fetch_archive().await?;
        parse_gtfs_zip(&bytes, &self.config.operator)
    }
}

#[derive(Debug, Deserialize)]
struct AgencyRow {
    #[serde(default)]
    agency_id: Option<String>,
    agency_name: String,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    route_id: String,
    #[serde(default)]
    agency_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    route_id: String,
    trip_id: String,
}

#[derive(Debug, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    stop_id: String,
    #[serde(default)]
    departure_time: String,
}

/// Parse scheduled stops out of a GTFS zip.
///
/// Rows come back in `stop_times.txt` order. Rows with a blank departure
/// time (untimed stops) or an unparseable one are skipped.
pub fn parse_gtfs_zip(bytes: &[u8], operator: &str) -> Result<Vec<ScheduledStop>, TimetableError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let operator = operator.trim();
    let trips = if operator.is_empty() {
        None
    } else {
        Some(operator_trips(&mut archive, operator)?)
    };

    let mut stops = Vec::new();
    let mut skipped = 0usize;
    let mut rdr = csv::Reader::from_reader(archive.by_name("stop_times.txt")?);
    for row in rdr.deserialize::<StopTimeRow>() {
        let row = row.map_err(|source| TimetableError::Csv {
            file: "stop_times.txt",
            source,
        })?;

        if trips.as_ref().is_some_and(|t| !t.contains(&row.trip_id)) {
            continue;
        }

        if row.departure_time.trim().is_empty() {
            skipped += 1;
            continue;
        }

        match DepartureTime::parse_hhmmss(&row.departure_time) {
            Ok(time) => stops.push(ScheduledStop::new(row.trip_id, row.stop_id, time)),
            Err(e) => {
                debug!(trip_id = %row.trip_id, stop_id = %row.stop_id, error = %e, "skipping stop time");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped stop times without a usable departure time");
    }

    Ok(stops)
}

/// Collect the trip ids run by agencies whose name matches `operator`.
fn operator_trips<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    operator: &str,
) -> Result<HashSet<String>, TimetableError> {
    let agencies: Vec<AgencyRow> = read_rows(archive, "agency.txt")?;

    let matching: HashSet<String> = agencies
        .iter()
        .filter(|a| a.agency_name.trim().eq_ignore_ascii_case(operator))
        .map(|a| a.agency_id.clone().unwrap_or_default())
        .collect();

    if matching.is_empty() {
        warn!(operator, "no agency matches the operator filter");
        return Ok(HashSet::new());
    }

    // A feed with a single agency may leave agency_id blank everywhere.
    let sole_agency_matches = agencies.len() == 1;

    let routes: HashSet<String> = read_rows::<_, RouteRow>(archive, "routes.txt")?
        .into_iter()
        .filter(|r| match r.agency_id.as_deref() {
            Some(id) if !id.is_empty() => matching.contains(id),
            _ => sole_agency_matches,
        })
        .map(|r| r.route_id)
        .collect();

    let trips: HashSet<String> = read_rows::<_, TripRow>(archive, "trips.txt")?
        .into_iter()
        .filter(|t| routes.contains(&t.route_id))
        .map(|t| t.trip_id)
        .collect();

    debug!(
        agencies = matching.len(),
        routes = routes.len(),
        trips = trips.len(),
        "resolved operator trips"
    );

    Ok(trips)
}

fn read_rows<R, T>(archive: &mut ZipArchive<R>, file: &'static str) -> Result<Vec<T>, TimetableError>
where
    R: Read + Seek,
    T: for<'de> Deserialize<'de>,
{
    let mut rdr = csv::Reader::from_reader(archive.by_name(file)?);
    rdr.deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| TimetableError::Csv { file, source })
}
