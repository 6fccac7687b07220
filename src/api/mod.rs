//! REST API over one evaluated schedule run.
//!
//! Provides four GET endpoints:
//! - `/forecast`: forecast rows the run was computed against
//! - `/schedule`: per-task outcomes and the footprint report
//! - `/optimize`: best/worst start for an ad-hoc duration and power draw
//! - `/impact`: footprint of an ad-hoc start, duration and power draw

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::forecast::ForecastTable;
use crate::runner::ScheduleRun;
use crate::schedule::{FootprintReport, TaskOutcome};

pub use types::{
    ErrorResponse, ImpactQuery, ImpactResponse, OptimizeQuery, ScheduleResponse, error_response,
    query_rejection_response,
};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the run completes and wrapped in `Arc`; no locks
/// are needed since all data is read-only. A new forecast means a new state.
pub struct AppState {
    /// Forecast snapshot.
    pub forecast: Arc<ForecastTable>,
    /// Per-task outcomes.
    pub outcomes: Vec<TaskOutcome>,
    /// Aggregate report.
    pub report: FootprintReport,
}

impl AppState {
    pub fn from_run(run: ScheduleRun) -> Self {
        Self {
            forecast: run.forecast,
            outcomes: run.outcomes,
            report: run.report,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forecast", get(handlers::get_forecast))
        .route("/schedule", get(handlers::get_schedule))
        .route("/optimize", get(handlers::get_optimize))
        .route("/impact", get(handlers::get_impact))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
