//! Forecast table import from CSV.
//!
//! Expected columns are `timestamp` and `co2_g_per_kwh`. The prediction
//! pipeline's `time_axis` / `co2_predictions` column names are accepted as
//! aliases; any other columns are ignored.
//!
//! Timestamps are RFC 3339, or naive `YYYY-MM-DD HH:MM:SS` /
//! `YYYY-MM-DDTHH:MM:SS` values (as written by the pipeline) read as UTC.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::info;

use crate::error::ScheduleError;
use crate::forecast::{ForecastPoint, ForecastTable};

/// Errors raised while loading a forecast CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed forecast CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Forecast(#[from] ScheduleError),
}

#[derive(Debug, Deserialize)]
struct ForecastRow {
    #[serde(alias = "time_axis", deserialize_with = "deserialize_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(alias = "co2_predictions")]
    co2_g_per_kwh: f64,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp \"{raw}\"")))
}

/// Reads and validates a forecast CSV file.
///
/// # Errors
///
/// Returns [`CsvError::Io`] if the file cannot be opened, [`CsvError::Csv`]
/// for malformed rows, and [`CsvError::Forecast`] when the rows violate the
/// forecast table invariants.
pub fn read_forecast_csv(path: &Path, interval: Duration) -> Result<ForecastTable, CsvError> {
    let file = File::open(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_forecast_csv(file, interval)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        start = %table.start(),
        "loaded forecast"
    );
    Ok(table)
}

/// Parses forecast rows from any reader.
///
/// # Errors
///
/// Same as [`read_forecast_csv`], minus file access.
pub fn parse_forecast_csv(reader: impl Read, interval: Duration) -> Result<ForecastTable, CsvError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for row in rdr.deserialize::<ForecastRow>() {
        let row = row?;
        points.push(ForecastPoint::new(row.timestamp, row.co2_g_per_kwh));
    }

    Ok(ForecastTable::new(points, interval)?)
}
