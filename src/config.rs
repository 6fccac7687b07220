//! TOML-based schedule configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::error::ScheduleError;
use crate::forecast::SyntheticIntensity;
use crate::schedule::{Appliance, Task};

/// 2024-02-20T00:00:00Z, the default forecast start.
const DEFAULT_START_UNIX: i64 = 1_708_387_200;

/// Longest accepted sampling interval (one day).
pub const MAX_INTERVAL_MINUTES: u32 = 1_440;

/// Longest accepted synthetic horizon.
pub const MAX_HORIZON_HOURS: u32 = 10_000;

/// Top-level schedule configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`ScheduleConfig::from_toml_file`] or use [`ScheduleConfig::demo`] for the
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Forecast source and horizon.
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Tasks to evaluate, one `[[task]]` table each.
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskConfig>,
}

/// Forecast source: a CSV file, or the synthetic generator when `csv` is unset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Path to a forecast CSV (`timestamp,co2_g_per_kwh`).
    pub csv: Option<PathBuf>,
    /// First timestamp of the synthetic horizon.
    pub start: DateTime<Utc>,
    /// Sampling interval in minutes (must be > 0).
    pub interval_minutes: u32,
    /// Synthetic horizon length in hours (must be > 0).
    pub horizon_hours: u32,
    /// Mean synthetic intensity (g CO2 / kWh).
    pub baseline_g_per_kwh: f64,
    /// Daily swing of the synthetic intensity (g CO2 / kWh).
    pub amplitude_g_per_kwh: f64,
    /// Phase of the daily swing (radians); pi/2 puts the minimum at noon.
    pub phase_rad: f64,
    /// Noise standard deviation (g CO2 / kWh).
    pub noise_std: f64,
    /// Noise seed.
    pub seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            csv: None,
            start: DateTime::<Utc>::default() + Duration::seconds(DEFAULT_START_UNIX),
            interval_minutes: 60,
            horizon_hours: 72,
            baseline_g_per_kwh: 380.0,
            amplitude_g_per_kwh: 120.0,
            phase_rad: std::f64::consts::FRAC_PI_2,
            noise_std: 15.0,
            seed: 42,
        }
    }
}

impl ForecastConfig {
    pub fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.interval_minutes))
    }

    /// Number of synthetic samples in the horizon.
    pub fn horizon_samples(&self) -> usize {
        if self.interval_minutes == 0 {
            return 0;
        }
        (u64::from(self.horizon_hours) * 60 / u64::from(self.interval_minutes)) as usize
    }

    /// Synthetic generator configured from these parameters.
    pub fn synthetic(&self) -> SyntheticIntensity {
        SyntheticIntensity::new(
            self.baseline_g_per_kwh,
            self.amplitude_g_per_kwh,
            self.phase_rad,
            self.noise_std,
            self.seed,
        )
    }
}

/// One task entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Display name (must be unique and non-empty).
    pub name: String,
    /// Appliance kind, e.g. `"dishwasher"` or `"custom"`.
    pub appliance: Appliance,
    /// Power draw override (kW); required for `"custom"`.
    #[serde(default)]
    pub power_kw: Option<f64>,
    /// Run time in whole hours.
    #[serde(default = "default_duration_hours")]
    pub duration_hours: u32,
    /// Chosen start time (RFC 3339).
    pub start: DateTime<Utc>,
}

fn default_duration_hours() -> u32 {
    2
}

impl TaskConfig {
    /// Explicit power draw, falling back to the appliance's typical draw.
    pub fn resolved_power_kw(&self) -> Option<f64> {
        self.power_kw.or_else(|| self.appliance.typical_power_kw())
    }

    /// Builds the domain task.
    ///
    /// # Errors
    ///
    /// Returns a `ScheduleError` if the power or duration is invalid.
    pub fn to_task(&self) -> Result<Task, ScheduleError> {
        match self.power_kw {
            Some(power_kw) => Task::new(
                self.name.clone(),
                self.appliance,
                power_kw,
                self.duration_hours,
                self.start,
            ),
            None => Task::from_appliance(
                self.name.clone(),
                self.appliance,
                self.duration_hours,
                self.start,
            ),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"forecast.interval_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScheduleConfig {
    /// Returns the demo preset: one appliance of each catalogue kind over a
    /// 3-day synthetic horizon.
    pub fn demo() -> Self {
        let forecast = ForecastConfig::default();
        let day0 = forecast.start;
        Self {
            tasks: vec![
                task("laundry", Appliance::WashingMachine, None, 2, day0 + Duration::hours(8)),
                task("dishes", Appliance::Dishwasher, None, 3, day0 + Duration::hours(19)),
                task("roast", Appliance::Oven, None, 1, day0 + Duration::hours(36)),
                task("training run", Appliance::A100Gpu, None, 8, day0 + Duration::hours(9)),
            ],
            forecast,
        }
    }

    /// Returns the overnight preset: long compute jobs started in the
    /// evening on a 2-day half-hourly horizon.
    pub fn overnight() -> Self {
        let forecast = ForecastConfig {
            interval_minutes: 30,
            horizon_hours: 48,
            noise_std: 25.0,
            seed: 7,
            ..ForecastConfig::default()
        };
        let day0 = forecast.start;
        Self {
            tasks: vec![
                task("fine-tune", Appliance::A100Gpu, None, 12, day0 + Duration::hours(20)),
                task(
                    "render farm",
                    Appliance::Custom,
                    Some(3.2),
                    6,
                    day0 + Duration::hours(22),
                ),
                task("laundry", Appliance::WashingMachine, None, 2, day0 + Duration::hours(21)),
            ],
            forecast,
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "overnight"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "overnight" => Ok(Self::overnight()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    ///
    /// A relative `forecast.csv` path is resolved against the directory of
    /// `path`, not the working directory.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let (Some(csv), Some(dir)) = (cfg.forecast.csv.as_mut(), path.parent()) {
            if csv.is_relative() {
                *csv = dir.join(&*csv);
            }
        }
        Ok(cfg)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Start-time
    /// alignment against the forecast is left to the schedule computations,
    /// since a CSV forecast is only known once loaded.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let f = &self.forecast;

        if f.interval_minutes == 0 {
            errors.push(ConfigError::new("forecast.interval_minutes", "must be > 0"));
        } else if f.interval_minutes > MAX_INTERVAL_MINUTES {
            errors.push(ConfigError::new(
                "forecast.interval_minutes",
                format!("must be <= {MAX_INTERVAL_MINUTES}"),
            ));
        }
        if f.csv.is_none() {
            if f.horizon_hours == 0 {
                errors.push(ConfigError::new("forecast.horizon_hours", "must be > 0"));
            } else if f.horizon_hours > MAX_HORIZON_HOURS {
                errors.push(ConfigError::new(
                    "forecast.horizon_hours",
                    format!("must be <= {MAX_HORIZON_HOURS}"),
                ));
            } else if f.interval_minutes > 0
                && (u64::from(f.horizon_hours) * 60) % u64::from(f.interval_minutes) != 0
            {
                errors.push(ConfigError::new(
                    "forecast.horizon_hours",
                    "must be a whole number of forecast.interval_minutes",
                ));
            }
            if !(f.baseline_g_per_kwh.is_finite() && f.baseline_g_per_kwh >= 0.0) {
                errors.push(ConfigError::new("forecast.baseline_g_per_kwh", "must be >= 0"));
            }
            if !(f.amplitude_g_per_kwh.is_finite() && f.amplitude_g_per_kwh >= 0.0) {
                errors.push(ConfigError::new("forecast.amplitude_g_per_kwh", "must be >= 0"));
            }
            if !(f.noise_std.is_finite() && f.noise_std >= 0.0) {
                errors.push(ConfigError::new("forecast.noise_std", "must be >= 0"));
            }
        }

        let mut names = HashSet::new();
        for (i, t) in self.tasks.iter().enumerate() {
            if t.name.trim().is_empty() {
                errors.push(ConfigError::new(format!("task[{i}].name"), "must not be empty"));
            } else if !names.insert(t.name.as_str()) {
                errors.push(ConfigError::new(
                    format!("task[{i}].name"),
                    format!("duplicate task name \"{}\"", t.name),
                ));
            }

            if t.duration_hours == 0 {
                errors.push(ConfigError::new(
                    format!("task[{i}].duration_hours"),
                    "must be >= 1",
                ));
            }

            match t.resolved_power_kw() {
                None => errors.push(ConfigError::new(
                    format!("task[{i}].power_kw"),
                    "required for appliance \"custom\"",
                )),
                Some(p) if !(p.is_finite() && p > 0.0) => errors.push(ConfigError::new(
                    format!("task[{i}].power_kw"),
                    format!("must be > 0, got {p}"),
                )),
                Some(_) => {}
            }
        }

        errors
    }
}

fn task(
    name: &str,
    appliance: Appliance,
    power_kw: Option<f64>,
    duration_hours: u32,
    start: DateTime<Utc>,
) -> TaskConfig {
    TaskConfig {
        name: name.to_string(),
        appliance,
        power_kw,
        duration_hours,
        start,
    }
}
