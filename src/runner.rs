//! Config-driven evaluation of a task list against one forecast.

use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, ScheduleConfig};
use crate::error::ScheduleError;
use crate::forecast::ForecastTable;
use crate::io::forecast_csv::{CsvError, read_forecast_csv};
use crate::schedule::{FootprintReport, TaskOutcome, evaluate_task};

/// Errors that abort a schedule run.
#[derive(Debug, Error)]
pub enum RunError {
    /// One or more configuration fields are invalid.
    #[error("{} invalid configuration field(s): {}", .0.len(), join_errors(.0))]
    Config(Vec<ConfigError>),

    #[error("failed to load forecast: {0}")]
    Forecast(#[from] CsvError),

    #[error("failed to build synthetic forecast: {0}")]
    Synthetic(#[source] ScheduleError),

    /// A task could not be evaluated; no partial totals are reported.
    #[error("task \"{task}\": {source}")]
    Task {
        task: String,
        #[source]
        source: ScheduleError,
    },
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of evaluating every configured task against one forecast.
///
/// Serializes as `{ forecast, outcomes, report }` with the forecast as its
/// list of points.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRun {
    /// Forecast snapshot the outcomes were computed against.
    #[serde(serialize_with = "serialize_forecast_points")]
    pub forecast: Arc<ForecastTable>,
    pub outcomes: Vec<TaskOutcome>,
    pub report: FootprintReport,
}

fn serialize_forecast_points<S: Serializer>(
    forecast: &Arc<ForecastTable>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(forecast.points())
}

/// Builds the forecast described by `config`.
///
/// `forecast_override` takes precedence over `config.forecast.csv`; with
/// neither set the synthetic generator is used.
///
/// # Errors
///
/// Returns [`RunError::Forecast`] for unreadable or invalid CSV input and
/// [`RunError::Synthetic`] if the synthetic horizon is empty.
pub fn build_forecast(
    config: &ScheduleConfig,
    forecast_override: Option<&Path>,
) -> Result<ForecastTable, RunError> {
    let f = &config.forecast;
    match forecast_override.or(f.csv.as_deref()) {
        Some(path) => Ok(read_forecast_csv(path, f.interval())?),
        None => {
            let table = f
                .synthetic()
                .table(f.start, f.interval(), f.horizon_samples())
                .map_err(RunError::Synthetic)?;
            info!(
                rows = table.len(),
                start = %table.start(),
                seed = f.seed,
                "generated synthetic forecast"
            );
            Ok(table)
        }
    }
}

/// Evaluates each task independently against `forecast`.
///
/// # Errors
///
/// Returns [`RunError::Task`] for the first task that fails; the error names
/// the task so the caller can fix its start or duration.
pub fn evaluate_all(
    config: &ScheduleConfig,
    forecast: &ForecastTable,
) -> Result<Vec<TaskOutcome>, RunError> {
    let mut outcomes = Vec::with_capacity(config.tasks.len());
    for tc in &config.tasks {
        let with_name = |source| RunError::Task {
            task: tc.name.clone(),
            source,
        };
        let task = tc.to_task().map_err(with_name)?;
        let impact = match evaluate_task(&task, forecast) {
            Ok(impact) => impact,
            Err(e) => {
                warn!(task = %task.name, error = %e, "task evaluation failed");
                return Err(with_name(e));
            }
        };
        if impact.selected_clipped {
            warn!(
                task = %task.name,
                start = %task.chosen_start,
                "chosen window runs past the forecast horizon; impact covers available rows only"
            );
        }
        outcomes.push(TaskOutcome { task, impact });
    }
    Ok(outcomes)
}

/// Validates `config`, builds the forecast, and evaluates every task.
///
/// # Errors
///
/// Returns [`RunError::Config`] listing every invalid field, or the first
/// forecast or task error encountered.
pub fn run_schedule(
    config: &ScheduleConfig,
    forecast_override: Option<&Path>,
) -> Result<ScheduleRun, RunError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(RunError::Config(errors));
    }

    let forecast = Arc::new(build_forecast(config, forecast_override)?);
    let outcomes = evaluate_all(config, &forecast)?;
    let report = FootprintReport::from_outcomes(&outcomes);

    info!(
        tasks = report.task_count,
        selected_g = report.selected_g,
        optimal_g = report.optimal_g,
        "schedule evaluated"
    );

    Ok(ScheduleRun {
        forecast,
        outcomes,
        report,
    })
}
