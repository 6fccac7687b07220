//! Validated, immutable forecast table.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};

/// One forecast sample: CO2 intensity expected over `[timestamp, timestamp + interval)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Start of the sample period (UTC).
    pub timestamp: DateTime<Utc>,
    /// Forecast carbon intensity (g CO2 / kWh).
    pub co2_g_per_kwh: f64,
}

impl ForecastPoint {
    pub fn new(timestamp: DateTime<Utc>, co2_g_per_kwh: f64) -> Self {
        Self {
            timestamp,
            co2_g_per_kwh,
        }
    }
}

/// Ordered series of forecast samples at a fixed sampling interval.
///
/// Construction is the only place invariants are checked:
/// - at least one row
/// - timestamps strictly ascending and exactly `interval` apart
/// - intensities finite and non-negative
///
/// A table is never mutated after construction. Callers that receive a new
/// prediction build a new table and swap the `Arc` holding it, so in-flight
/// calculations keep a consistent snapshot.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use co2_scheduler::forecast::ForecastTable;
///
/// let start = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap();
/// let table = ForecastTable::hourly_from_intensities(start, &[100.0, 50.0, 200.0]).unwrap();
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.dt_hours(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    points: Vec<ForecastPoint>,
    intensities: Vec<f64>,
    interval: Duration,
}

impl ForecastTable {
    /// Validates `points` against `interval` and builds a table.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidForecast`] when the table is empty, the
    /// interval is not a positive whole number of seconds, timestamps are
    /// duplicated, unsorted or unevenly spaced, or an intensity is negative or
    /// not finite.
    pub fn new(points: Vec<ForecastPoint>, interval: Duration) -> Result<Self> {
        let interval_secs = interval.num_seconds();
        if interval_secs < 1 || interval != Duration::seconds(interval_secs) {
            return Err(ScheduleError::invalid_forecast(
                0,
                format!("sampling interval must be a positive whole number of seconds, got {interval}"),
            ));
        }

        if points.is_empty() {
            return Err(ScheduleError::invalid_forecast(0, "forecast is empty"));
        }

        for (index, point) in points.iter().enumerate() {
            if !point.co2_g_per_kwh.is_finite() || point.co2_g_per_kwh < 0.0 {
                return Err(ScheduleError::invalid_forecast(
                    index,
                    format!(
                        "intensity must be finite and >= 0, got {}",
                        point.co2_g_per_kwh
                    ),
                ));
            }
        }

        for (offset, pair) in points.windows(2).enumerate() {
            let index = offset + 1;
            let step = pair[1].timestamp - pair[0].timestamp;
            if step == Duration::zero() {
                return Err(ScheduleError::invalid_forecast(
                    index,
                    format!("duplicate timestamp {}", pair[1].timestamp),
                ));
            }
            if step < Duration::zero() {
                return Err(ScheduleError::invalid_forecast(
                    index,
                    format!(
                        "timestamp {} is before previous row {}",
                        pair[1].timestamp, pair[0].timestamp
                    ),
                ));
            }
            if step != interval {
                return Err(ScheduleError::invalid_forecast(
                    index,
                    format!(
                        "spacing of {}s does not match sampling interval of {interval_secs}s",
                        step.num_seconds()
                    ),
                ));
            }
        }

        debug!(
            rows = points.len(),
            interval_secs,
            start = %points[0].timestamp,
            "forecast table validated"
        );

        let intensities = points.iter().map(|p| p.co2_g_per_kwh).collect();
        Ok(Self {
            points,
            intensities,
            interval,
        })
    }

    /// Builds a table with the common 1-hour sampling interval.
    ///
    /// # Errors
    ///
    /// Same as [`ForecastTable::new`].
    pub fn hourly(points: Vec<ForecastPoint>) -> Result<Self> {
        Self::new(points, Duration::hours(1))
    }

    /// Builds a table from bare intensities laid out from `start` every `interval`.
    ///
    /// # Errors
    ///
    /// Same as [`ForecastTable::new`].
    pub fn from_intensities(
        start: DateTime<Utc>,
        interval: Duration,
        intensities: &[f64],
    ) -> Result<Self> {
        let points = intensities
            .iter()
            .enumerate()
            .map(|(i, &co2)| {
                slot_timestamp(start, interval, i).map(|ts| ForecastPoint::new(ts, co2))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points, interval)
    }

    /// Hourly variant of [`ForecastTable::from_intensities`].
    ///
    /// # Errors
    ///
    /// Same as [`ForecastTable::new`].
    pub fn hourly_from_intensities(start: DateTime<Utc>, intensities: &[f64]) -> Result<Self> {
        Self::from_intensities(start, Duration::hours(1), intensities)
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for a constructed table; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sampling interval in hours (1.0 for hourly tables).
    pub fn dt_hours(&self) -> f64 {
        self.interval.num_seconds() as f64 / 3600.0
    }

    /// Timestamp of the first row.
    pub fn start(&self) -> DateTime<Utc> {
        self.points[0].timestamp
    }

    /// Exclusive end of the horizon: last timestamp plus one interval.
    pub fn end(&self) -> DateTime<Utc> {
        self.points[self.points.len() - 1].timestamp + self.interval
    }

    /// Timestamp of row `index`, if it exists.
    pub fn timestamp_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.points.get(index).map(|p| p.timestamp)
    }

    /// Intensity column in row order.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Row index whose timestamp equals `timestamp` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when no row matches; no
    /// interpolation between rows is attempted.
    pub fn index_of(&self, timestamp: DateTime<Utc>) -> Result<usize> {
        self.points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
            .map_err(|_| ScheduleError::NotFound { start: timestamp })
    }

    /// Number of rows covered by a task lasting `duration_hours`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidDuration`] when `duration_hours` is zero
    /// or not a whole multiple of the sampling interval.
    pub fn samples_for(&self, duration_hours: u32) -> Result<usize> {
        if duration_hours == 0 {
            return Err(ScheduleError::InvalidDuration {
                hours: duration_hours,
                reason: "must be at least 1 hour".to_string(),
            });
        }

        let span_secs = i64::from(duration_hours) * 3600;
        let step_secs = self.interval.num_seconds();
        if span_secs % step_secs != 0 {
            return Err(ScheduleError::InvalidDuration {
                hours: duration_hours,
                reason: format!("not a whole number of {step_secs}s forecast samples"),
            });
        }

        Ok((span_secs / step_secs) as usize)
    }
}

/// Timestamp of row `index` on a grid starting at `start` with spacing `interval`.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidForecast`] when the row offset does not
/// fit chrono's timestamp range.
pub fn slot_timestamp(
    start: DateTime<Utc>,
    interval: Duration,
    index: usize,
) -> Result<DateTime<Utc>> {
    i32::try_from(index)
        .ok()
        .and_then(|n| interval.checked_mul(n))
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            ScheduleError::invalid_forecast(
                index,
                format!(
                    "timestamp {index} x {}s after {start} is out of range",
                    interval.num_seconds()
                ),
            )
        })
}
