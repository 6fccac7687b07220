//! Schedule optimizer: lowest- and highest-impact start over the horizon.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::impact::{check_power, grams_co2};
use super::window::window_sums;
use crate::error::{Result, ScheduleError};
use crate::forecast::ForecastTable;

/// Best and worst placements of a single task within the forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleOptimum {
    /// Minimum impact over all full windows (g CO2).
    pub best_impact_g: f64,
    /// Start timestamp of the earliest minimum-impact window.
    pub best_start: DateTime<Utc>,
    /// Row index of `best_start`.
    pub best_index: usize,
    /// Maximum impact over the same windows (g CO2).
    pub worst_impact_g: f64,
    /// Number of candidate windows searched.
    pub candidates: usize,
}

/// Finds the start that minimizes the CO2 impact of a task.
///
/// Every start index `i` in `[0, N - samples]` is a candidate, where `N` is
/// the forecast length and `samples` the number of rows the task spans. The
/// best start is the first index reaching the minimum, so ties resolve to
/// the earliest time. The worst impact is the maximum over the same
/// candidates and is reported for normalization.
///
/// Each window is summed directly, which is `O(N × samples)`; for forecasts
/// of a few hundred rows this is negligible and keeps equal windows bitwise
/// equal.
///
/// # Arguments
///
/// * `duration_hours` - Task duration (>= 1)
/// * `power_kw` - Constant power draw while running (> 0)
/// * `forecast` - Validated forecast table
///
/// # Errors
///
/// - [`ScheduleError::InvalidPower`] if `power_kw` is not finite and positive
/// - [`ScheduleError::InvalidDuration`] if `duration_hours` is zero or not a
///   whole number of samples
/// - [`ScheduleError::InsufficientHorizon`] if the task spans more rows than
///   the forecast holds
pub fn optimize_schedule(
    duration_hours: u32,
    power_kw: f64,
    forecast: &ForecastTable,
) -> Result<ScheduleOptimum> {
    check_power(power_kw)?;
    let samples = forecast.samples_for(duration_hours)?;
    let insufficient = || ScheduleError::InsufficientHorizon {
        required: samples,
        available: forecast.len(),
    };
    if samples > forecast.len() {
        return Err(insufficient());
    }

    let sums = window_sums(forecast.intensities(), samples);
    let Some((&first, rest)) = sums.split_first() else {
        return Err(insufficient());
    };

    let mut best_index = 0;
    let mut best_sum = first;
    let mut worst_sum = first;
    for (offset, &sum) in rest.iter().enumerate() {
        // strict comparison keeps the earliest minimum
        if sum < best_sum {
            best_sum = sum;
            best_index = offset + 1;
        }
        if sum > worst_sum {
            worst_sum = sum;
        }
    }

    let dt_hours = forecast.dt_hours();
    let best_start = forecast.points()[best_index].timestamp;
    let optimum = ScheduleOptimum {
        best_impact_g: grams_co2(best_sum, power_kw, dt_hours),
        best_start,
        best_index,
        worst_impact_g: grams_co2(worst_sum, power_kw, dt_hours),
        candidates: sums.len(),
    };

    debug!(
        duration_hours,
        power_kw,
        candidates = optimum.candidates,
        best_start = %optimum.best_start,
        best_impact_g = optimum.best_impact_g,
        worst_impact_g = optimum.worst_impact_g,
        "optimized schedule"
    );
    Ok(optimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap()
    }

    fn forecast() -> ForecastTable {
        ForecastTable::hourly_from_intensities(t0(), &[100.0, 50.0, 200.0, 30.0, 60.0]).unwrap()
    }

    #[test]
    fn finds_lowest_and_highest_window() {
        // window sums [150, 250, 230, 90] -> impacts [300, 500, 460, 180]
        let opt = optimize_schedule(2, 2.0, &forecast()).unwrap();
        assert_eq!(opt.best_impact_g, 180.0);
        assert_eq!(opt.best_index, 3);
        assert_eq!(opt.best_start, t0() + Duration::hours(3));
        assert_eq!(opt.worst_impact_g, 500.0);
        assert_eq!(opt.candidates, 4);
    }

    #[test]
    fn full_horizon_has_single_candidate() {
        let opt = optimize_schedule(5, 2.0, &forecast()).unwrap();
        assert_eq!(opt.candidates, 1);
        assert_eq!(opt.best_start, t0());
        assert_eq!(opt.best_impact_g, 880.0);
        assert_eq!(opt.worst_impact_g, 880.0);
    }

    #[test]
    fn duration_beyond_horizon_is_insufficient() {
        assert_eq!(
            optimize_schedule(6, 2.0, &forecast()),
            Err(ScheduleError::InsufficientHorizon {
                required: 6,
                available: 5
            })
        );
    }

    #[test]
    fn ties_resolve_to_earliest_start() {
        let table =
            ForecastTable::hourly_from_intensities(t0(), &[5.0, 1.0, 9.0, 1.0, 5.0]).unwrap();
        let opt = optimize_schedule(1, 1.0, &table).unwrap();
        assert_eq!(opt.best_index, 1);
        assert_eq!(opt.best_start, t0() + Duration::hours(1));
    }

    #[test]
    fn flat_forecast_picks_first_row() {
        let table = ForecastTable::hourly_from_intensities(t0(), &[42.0; 24]).unwrap();
        let opt = optimize_schedule(3, 1.35, &table).unwrap();
        assert_eq!(opt.best_index, 0);
        assert_eq!(opt.best_impact_g, opt.worst_impact_g);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            optimize_schedule(0, 1.0, &forecast()),
            Err(ScheduleError::InvalidDuration { .. })
        ));
        assert!(matches!(
            optimize_schedule(1, 0.0, &forecast()),
            Err(ScheduleError::InvalidPower { .. })
        ));
    }
}
