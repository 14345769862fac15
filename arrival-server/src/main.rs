use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use arrival_server::config::ServerConfig;
use arrival_server::feed::{BodsClient, BodsConfig, MockVehicleFeed};
use arrival_server::live::{LivePositionStore, RefreshScheduler};
use arrival_server::schedule::{GtfsTimetable, GtfsTimetableConfig, ScheduleStore};
use arrival_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if config.api_key.is_empty() && config.mock_vehicles.is_none() {
        warn!("BODS_API_KEY not set, API calls will fail");
    }

    // Load the timetable (fail fast if unavailable)
    info!(source = ?config.timetable, operator = %config.operator, "loading timetable");
    let mut timetable_config =
        GtfsTimetableConfig::new(config.timetable.clone()).with_operator(&config.operator);
    if !config.api_key.is_empty() {
        timetable_config = timetable_config.with_api_key(&config.api_key);
    }
    let schedule = match GtfsTimetable::new(timetable_config) {
        Ok(timetable) => ScheduleStore::load(&timetable).await,
        Err(e) => Err(e.into()),
    };
    let schedule = match schedule {
        Ok(schedule) => Arc::new(schedule),
        Err(e) => {
            error!(error = %e, "failed to load timetable");
            return ExitCode::FAILURE;
        }
    };

    // Poll vehicle positions in the background
    let positions = LivePositionStore::new();
    let refresh = match &config.mock_vehicles {
        Some(path) => {
            info!(path = %path.display(), "serving vehicle positions from file");
            MockVehicleFeed::new(path)
                .map(|feed| RefreshScheduler::new(feed, positions.clone(), config.refresh.clone()).spawn())
        }
        None => {
            let bods_config = BodsConfig::new(&config.api_key, &config.subscription)
                .with_max_records(config.max_records);
            BodsClient::new(bods_config)
                .map(|feed| RefreshScheduler::new(feed, positions.clone(), config.refresh.clone()).spawn())
        }
    };
    if let Err(e) = refresh {
        error!(error = %e, "failed to create vehicle feed");
        return ExitCode::FAILURE;
    }

    let state = AppState::new(schedule, positions);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(
        %addr,
        interval = ?config.refresh.interval,
        "arrival server listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
