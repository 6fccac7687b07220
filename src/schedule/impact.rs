//! Impact calculator: grams of CO2 for one task at a user-chosen start.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::window::clipped_sum;
use crate::error::{Result, ScheduleError};
use crate::forecast::ForecastTable;

/// Computes the CO2 mass (grams) of drawing `power_kw` for `duration_hours`
/// starting at `start`.
///
/// Impact is `power_kw × dt_hours × Σ intensity` over the rows
/// `[i, i + samples)`, where `i` is the row whose timestamp equals `start`
/// and `samples` is the number of forecast rows in `duration_hours`. A window
/// that runs past the end of the forecast is clipped to the rows available.
///
/// # Arguments
///
/// * `start` - Start timestamp; must equal a forecast timestamp exactly
/// * `duration_hours` - Task duration (>= 1)
/// * `power_kw` - Constant power draw while running (> 0)
/// * `forecast` - Validated forecast table
///
/// # Errors
///
/// - [`ScheduleError::InvalidPower`] if `power_kw` is not finite and positive
/// - [`ScheduleError::InvalidDuration`] if `duration_hours` is zero or not a
///   whole number of samples
/// - [`ScheduleError::NotFound`] if `start` is not a forecast timestamp
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use co2_scheduler::forecast::ForecastTable;
/// use co2_scheduler::schedule::calculate_impact;
///
/// let start = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap();
/// let forecast =
///     ForecastTable::hourly_from_intensities(start, &[100.0, 50.0, 200.0, 30.0, 60.0]).unwrap();
/// assert_eq!(calculate_impact(start, 2, 2.0, &forecast), Ok(300.0));
/// ```
pub fn calculate_impact(
    start: DateTime<Utc>,
    duration_hours: u32,
    power_kw: f64,
    forecast: &ForecastTable,
) -> Result<f64> {
    check_power(power_kw)?;
    let samples = forecast.samples_for(duration_hours)?;
    let index = forecast.index_of(start)?;

    let sum = clipped_sum(forecast.intensities(), index, samples);
    let grams = grams_co2(sum, power_kw, forecast.dt_hours());

    debug!(%start, duration_hours, power_kw, grams, "calculated task impact");
    Ok(grams)
}

/// Converts a window's summed intensity into grams of CO2.
///
/// Shared by the calculator and the optimizer so a given window yields the
/// same value from both.
pub(crate) fn grams_co2(intensity_sum: f64, power_kw: f64, dt_hours: f64) -> f64 {
    intensity_sum * power_kw * dt_hours
}

pub(crate) fn check_power(power_kw: f64) -> Result<()> {
    if power_kw.is_finite() && power_kw > 0.0 {
        Ok(())
    } else {
        Err(ScheduleError::InvalidPower { power_kw })
    }
}
