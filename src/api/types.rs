//! API response and query types.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::schedule::{FootprintReport, TaskOutcome};

/// Per-task outcomes plus the aggregate report.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    /// Aggregate footprint report.
    pub report: FootprintReport,
    /// Outcomes in configuration order.
    pub outcomes: Vec<TaskOutcome>,
}

/// Query parameters for `/optimize`.
#[derive(Debug, Deserialize)]
pub struct OptimizeQuery {
    /// Task duration in hours.
    pub duration_hours: u32,
    /// Power draw in kW.
    pub power_kw: f64,
}

/// Query parameters for `/impact`.
#[derive(Debug, Deserialize)]
pub struct ImpactQuery {
    /// Start timestamp (RFC 3339), must match a forecast row.
    pub start: DateTime<Utc>,
    /// Task duration in hours.
    pub duration_hours: u32,
    /// Power draw in kW.
    pub power_kw: f64,
}

/// Footprint of an ad-hoc placement.
#[derive(Debug, Serialize)]
pub struct ImpactResponse {
    pub start: DateTime<Utc>,
    pub duration_hours: u32,
    pub power_kw: f64,
    /// Impact in grams of CO2.
    pub impact_g: f64,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Maps a schedule error to its HTTP status and JSON body.
///
/// - `NotFound` → 404
/// - `InsufficientHorizon` → 422
/// - everything else → 400
pub fn error_response(err: &ScheduleError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        ScheduleError::NotFound { .. } => StatusCode::NOT_FOUND,
        ScheduleError::InsufficientHorizon { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ScheduleError::InvalidForecast { .. }
        | ScheduleError::InvalidDuration { .. }
        | ScheduleError::InvalidPower { .. }
        | ScheduleError::PowerRequired { .. } => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Maps a missing or malformed query string to a JSON error body, keeping
/// axum's status code (400 for deserialization failures).
pub fn query_rejection_response(rejection: &QueryRejection) -> (StatusCode, Json<ErrorResponse>) {
    (
        rejection.status(),
        Json(ErrorResponse {
            error: rejection.body_text(),
        }),
    )
}
