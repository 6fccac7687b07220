//! Shared test fixtures for integration tests.

use chrono::{DateTime, TimeZone, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use co2_scheduler::forecast::ForecastTable;

/// Intensities of the reference scenario (g CO2 / kWh, hourly).
pub const SCENARIO_INTENSITIES: [f64; 5] = [100.0, 50.0, 200.0, 30.0, 60.0];

/// First timestamp of every fixture forecast (2024-02-20 00:00 UTC).
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap()
}

/// Hourly forecast `[100, 50, 200, 30, 60]` starting at [`t0`].
pub fn scenario_forecast() -> ForecastTable {
    ForecastTable::hourly_from_intensities(t0(), &SCENARIO_INTENSITIES).unwrap()
}

/// Hourly forecast of `len` uniform random intensities in `[0, 800)`.
pub fn random_forecast(seed: u64, len: usize) -> ForecastTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..len).map(|_| rng.random_range(0.0..800.0)).collect();
    ForecastTable::hourly_from_intensities(t0(), &values).unwrap()
}

/// Hourly forecast drawn from a handful of integer levels, so equal windows
/// (ties) are common.
pub fn coarse_forecast(seed: u64, len: usize) -> ForecastTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..len)
        .map(|_| f64::from(rng.random_range(0..4_u32)) * 100.0)
        .collect();
    ForecastTable::hourly_from_intensities(t0(), &values).unwrap()
}
