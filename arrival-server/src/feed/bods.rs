//! Bus Open Data Service SIRI-VM client.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::domain::VehicleObservation;

use super::VehicleFeed;
use super::error::FeedError;
use super::siri::parse_siri_vm;

/// Default base URL for the BODS API.
const DEFAULT_BASE_URL: &str = "https://data.bus-data.dft.gov.uk/api/v1";

/// Default cap on observations kept per poll.
const DEFAULT_MAX_RECORDS: usize = 1000;

/// Configuration for the BODS client.
#[derive(Debug, Clone)]
pub struct BodsConfig {
    /// API key, sent as the `api_key` query parameter
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Operator reference to subscribe to (e.g. "FCYM")
    pub subscription: String,
    /// Maximum observations kept from one poll
    pub max_records: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BodsConfig {
    /// Create a new config with the given API key and operator reference.
    pub fn new(api_key: impl Into<String>, subscription: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            subscription: subscription.into(),
            max_records: DEFAULT_MAX_RECORDS,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-poll record cap.
    pub fn with_max_records(mut self, n: usize) -> Self {
        self.max_records = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the BODS vehicle monitoring datafeed.
#[derive(Debug, Clone)]
pub struct BodsClient {
    http: reqwest::Client,
    config: BodsConfig,
}

impl BodsClient {
    /// Create a new BODS client.
    pub fn new(config: BodsConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    fn datafeed_url(&self) -> String {
        format!("{}/datafeed/", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch the raw SIRI-VM document.
    pub async fn fetch_raw(&self) -> Result<String, FeedError> {
        let response = self
            .http
            .get(self.datafeed_url())
            .query(&[
                ("operatorRef", self.config.subscription.as_str()),
                ("api_key", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.text().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

/// Map a non-success status to a feed error.
fn status_error(status: StatusCode, body: &str) -> FeedError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return FeedError::Unauthorized;
    }
    FeedError::Api {
        status: status.as_u16(),
        message: body.chars().take(500).collect(),
    }
}

/// Keep at most `max` observations, in feed order.
fn cap_records(observations: &mut Vec<VehicleObservation>, max: usize) {
    if observations.len() > max {
        debug!(
            received = observations.len(),
            max_records = max,
            "truncating vehicle feed"
        );
        observations.truncate(max);
    }
}

impl VehicleFeed for BodsClient {
    async fn fetch_observations(&self) -> Result<Vec<VehicleObservation>, FeedError> {
        let xml = self.fetch_raw().await?;
        let mut observations = parse_siri_vm(&xml)?;
        cap_records(&mut observations, self.config.max_records);
        Ok(observations)
    }
}
