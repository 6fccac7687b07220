//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{
    ErrorResponse, ImpactQuery, ImpactResponse, OptimizeQuery, ScheduleResponse, error_response,
    query_rejection_response,
};
use crate::forecast::ForecastPoint;
use crate::schedule::{ScheduleOptimum, calculate_impact, optimize_schedule};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Returns the forecast rows.
///
/// `GET /forecast` → 200 + `Vec<ForecastPoint>` JSON
pub async fn get_forecast(State(state): State<Arc<AppState>>) -> Json<Vec<ForecastPoint>> {
    Json(state.forecast.points().to_vec())
}

/// Returns per-task outcomes and the aggregate report.
///
/// `GET /schedule` → 200 + `ScheduleResponse` JSON
pub async fn get_schedule(State(state): State<Arc<AppState>>) -> Json<ScheduleResponse> {
    Json(ScheduleResponse {
        report: state.report.clone(),
        outcomes: state.outcomes.clone(),
    })
}

/// Finds the best and worst start for an ad-hoc task.
///
/// `GET /optimize?duration_hours=2&power_kw=1.35` → 200 + `ScheduleOptimum`
/// `GET /optimize?duration_hours=999&power_kw=1` → 422 + `ErrorResponse`
/// Missing or malformed parameters → 400 + `ErrorResponse`
pub async fn get_optimize(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OptimizeQuery>, QueryRejection>,
) -> Result<Json<ScheduleOptimum>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection_response(&e))?;
    optimize_schedule(query.duration_hours, query.power_kw, &state.forecast)
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// Computes the footprint of an ad-hoc placement.
///
/// `GET /impact?start=<rfc3339>&duration_hours=2&power_kw=1.35` → 200 + `ImpactResponse`
/// Unknown `start` → 404 + `ErrorResponse`
pub async fn get_impact(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ImpactQuery>, QueryRejection>,
) -> Result<Json<ImpactResponse>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection_response(&e))?;
    let impact_g = calculate_impact(
        query.start,
        query.duration_hours,
        query.power_kw,
        &state.forecast,
    )
    .map_err(|e| error_response(&e))?;

    Ok(Json(ImpactResponse {
        start: query.start,
        duration_hours: query.duration_hours,
        power_kw: query.power_kw,
        impact_g,
    }))
}
