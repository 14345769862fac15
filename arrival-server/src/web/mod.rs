//! Web layer for the arrival status server.
//!
//! Provides HTTP endpoints for live vehicle positions and arrival status.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
