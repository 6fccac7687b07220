use chrono::{DateTime, Duration, Timelike, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::table::{ForecastPoint, ForecastTable, slot_timestamp};
use crate::error::Result;

/// A stand-in forecaster producing a daily carbon-intensity pattern.
///
/// `SyntheticIntensity` combines a baseline intensity, a sinusoidal daily
/// swing and Gaussian noise. It replaces the external forecasting pipeline in
/// demos and tests; it makes no claim about real grid behaviour.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use co2_scheduler::forecast::SyntheticIntensity;
///
/// let mut source = SyntheticIntensity::new(
///     380.0, // baseline_g_per_kwh - average intensity
///     120.0, // amplitude_g_per_kwh - daily swing
///     0.0,   // phase_rad - no phase shift
///     15.0,  // noise_std - sample noise
///     42,    // seed - for reproducible noise
/// );
///
/// let start = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap();
/// let table = source.table(start, Duration::hours(1), 72).unwrap();
/// assert_eq!(table.len(), 72);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticIntensity {
    /// Mean intensity (g CO2 / kWh)
    pub baseline_g_per_kwh: f64,

    /// Amplitude of the daily sinusoid (g CO2 / kWh)
    pub amplitude_g_per_kwh: f64,

    /// Phase offset of the daily sinusoid in radians
    pub phase_rad: f64,

    /// Standard deviation of the Gaussian noise (g CO2 / kWh)
    pub noise_std: f64,

    rng: StdRng,
}

impl SyntheticIntensity {
    /// Creates a generator with the given shape parameters and noise seed.
    pub fn new(
        baseline_g_per_kwh: f64,
        amplitude_g_per_kwh: f64,
        phase_rad: f64,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        Self {
            baseline_g_per_kwh,
            amplitude_g_per_kwh,
            phase_rad,
            noise_std,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Intensity for the sample starting at `timestamp`.
    ///
    /// The daily position is taken from the UTC wall-clock time, so the
    /// pattern repeats every 24 hours regardless of sampling interval. The
    /// result is clamped at zero.
    pub fn intensity_at(&mut self, timestamp: DateTime<Utc>) -> f64 {
        let seconds_into_day = f64::from(timestamp.num_seconds_from_midnight());
        let day_pos = seconds_into_day / 86_400.0; // [0,1)
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;

        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        let g = self.baseline_g_per_kwh + self.amplitude_g_per_kwh * angle.sin() + noise;
        g.max(0.0)
    }

    /// Generates `samples` rows starting at `start`, spaced by `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ScheduleError::InvalidForecast`] if `samples`
    /// is zero, `interval` is not a positive whole number of seconds, or a
    /// row timestamp falls outside chrono's range.
    pub fn table(
        &mut self,
        start: DateTime<Utc>,
        interval: Duration,
        samples: usize,
    ) -> Result<ForecastTable> {
        let points = (0..samples)
            .map(|i| -> Result<ForecastPoint> {
                let ts = slot_timestamp(start, interval, i)?;
                Ok(ForecastPoint::new(ts, self.intensity_at(ts)))
            })
            .collect::<Result<Vec<_>>>()?;
        ForecastTable::new(points, interval)
    }
}

/// Gaussian noise via the Box-Muller transform; zero when `std_dev <= 0`.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
