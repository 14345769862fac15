//! Server configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::live::RefreshConfig;
use crate::schedule::TimetableSource;

/// Default BODS GTFS download for Wales, where First Cymru operates.
const DEFAULT_TIMETABLE_SOURCE: &str =
    "https://data.bus-data.dft.gov.uk/timetable/download/gtfs-file/wales/";

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to something unusable
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// BODS API key (`BODS_API_KEY`)
    pub api_key: String,
    /// Listening port (`PORT`)
    pub port: u16,
    /// Agency name kept from the timetable (`BODS_OPERATOR`)
    pub operator: String,
    /// Operator reference polled on the vehicle feed (`BODS_SUBSCRIPTION`)
    pub subscription: String,
    /// Cap on observations per poll (`BODS_MAX_RECORDS`)
    pub max_records: usize,
    /// GTFS archive URL or path (`TIMETABLE_SOURCE`)
    pub timetable: TimetableSource,
    /// Poll interval and timeout (`REFRESH_INTERVAL_SECS`, `REFRESH_TIMEOUT_SECS`)
    pub refresh: RefreshConfig,
    /// JSON file served instead of the live feed (`MOCK_VEHICLES`)
    pub mock_vehicles: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            port: 5000,
            operator: "First Cymru".to_string(),
            subscription: "FCYM".to_string(),
            max_records: 1000,
            timetable: TimetableSource::parse(DEFAULT_TIMETABLE_SOURCE),
            refresh: RefreshConfig::default(),
            mock_vehicles: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset or empty variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let interval = match var("REFRESH_INTERVAL_SECS") {
            Some(v) => Duration::from_secs(parse_positive("REFRESH_INTERVAL_SECS", &v)?),
            None => defaults.refresh.interval,
        };
        let timeout = match var("REFRESH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("REFRESH_TIMEOUT_SECS", &v)?),
            None => defaults.refresh.timeout,
        };

        Ok(Self {
            api_key: var("BODS_API_KEY").unwrap_or(defaults.api_key),
            port: match var("PORT") {
                Some(v) => parse("PORT", &v)?,
                None => defaults.port,
            },
            operator: var("BODS_OPERATOR").unwrap_or(defaults.operator),
            subscription: var("BODS_SUBSCRIPTION").unwrap_or(defaults.subscription),
            max_records: match var("BODS_MAX_RECORDS") {
                Some(v) => parse_positive("BODS_MAX_RECORDS", &v)?,
                None => defaults.max_records,
            },
            timetable: var("TIMETABLE_SOURCE")
                .map(|v| TimetableSource::parse(v.trim()))
                .unwrap_or(defaults.timetable),
            refresh: RefreshConfig::new(interval, timeout),
            mock_vehicles: var("MOCK_VEHICLES").map(PathBuf::from),
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: "not a number",
    })
}

fn parse_positive<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let parsed: T = parse(name, value)?;
    if parsed == T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be greater than zero",
        });
    }
    Ok(parsed)
}
