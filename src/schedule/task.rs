//! Task definitions and per-task impact evaluation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::impact::calculate_impact;
use super::optimizer::optimize_schedule;
use crate::error::{Result, ScheduleError};
use crate::forecast::ForecastTable;

/// Household and compute appliances with a typical power draw.
///
/// Draws follow common appliance consumption tables; `Custom` has no
/// default and needs an explicit power draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Appliance {
    WashingMachine,
    Dishwasher,
    Oven,
    #[serde(rename = "a100_gpu")]
    A100Gpu,
    Custom,
}

impl Appliance {
    /// Catalogue entries with a known typical draw.
    pub const CATALOGUE: &[Appliance] = &[
        Appliance::WashingMachine,
        Appliance::Dishwasher,
        Appliance::Oven,
        Appliance::A100Gpu,
    ];

    /// Typical power draw in kW, `None` for [`Appliance::Custom`].
    pub fn typical_power_kw(self) -> Option<f64> {
        match self {
            Appliance::WashingMachine => Some(0.5),
            Appliance::Dishwasher => Some(1.35),
            Appliance::Oven => Some(2.15),
            Appliance::A100Gpu => Some(0.5),
            Appliance::Custom => None,
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Appliance::WashingMachine => "Washing Machine",
            Appliance::Dishwasher => "Dishwasher",
            Appliance::Oven => "Oven",
            Appliance::A100Gpu => "A100 GPU",
            Appliance::Custom => "Custom",
        }
    }
}

impl fmt::Display for Appliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A power-consuming task the user wants to place on the forecast horizon.
///
/// Tasks are owned by the caller; evaluation only borrows them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Display name, unique within a session by convention.
    pub name: String,
    pub appliance: Appliance,
    /// Constant power draw while running (kW, > 0).
    pub power_kw: f64,
    /// Run time in whole hours (>= 1).
    pub duration_hours: u32,
    /// Start time chosen by the user.
    pub chosen_start: DateTime<Utc>,
}

impl Task {
    /// Creates a task with an explicit power draw.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidPower`] if `power_kw` is not finite
    /// and positive, or [`ScheduleError::InvalidDuration`] if
    /// `duration_hours` is zero.
    pub fn new(
        name: impl Into<String>,
        appliance: Appliance,
        power_kw: f64,
        duration_hours: u32,
        chosen_start: DateTime<Utc>,
    ) -> Result<Self> {
        if !(power_kw.is_finite() && power_kw > 0.0) {
            return Err(ScheduleError::InvalidPower { power_kw });
        }
        if duration_hours == 0 {
            return Err(ScheduleError::InvalidDuration {
                hours: 0,
                reason: "must be at least 1 hour".to_string(),
            });
        }

        Ok(Self {
            name: name.into(),
            appliance,
            power_kw,
            duration_hours,
            chosen_start,
        })
    }

    /// Creates a task drawing the appliance's typical power.
    ///
    /// # Errors
    ///
    /// Same as [`Task::new`]; [`Appliance::Custom`] has no typical draw and is
    /// rejected with [`ScheduleError::PowerRequired`].
    pub fn from_appliance(
        name: impl Into<String>,
        appliance: Appliance,
        duration_hours: u32,
        chosen_start: DateTime<Utc>,
    ) -> Result<Self> {
        let Some(power_kw) = appliance.typical_power_kw() else {
            return Err(ScheduleError::PowerRequired {
                appliance: appliance.label().to_string(),
            });
        };
        Self::new(name, appliance, power_kw, duration_hours, chosen_start)
    }

    /// Energy consumed over the full run (kWh).
    pub fn energy_kwh(&self) -> f64 {
        self.power_kw * f64::from(self.duration_hours)
    }

    /// Sample timestamps this task occupies when started at `chosen_start`.
    pub fn covered_slots(&self, interval: Duration) -> Vec<DateTime<Utc>> {
        covered_slots(self.chosen_start, self.duration_hours, interval)
    }
}

/// Expands a run of `duration_hours` from `start` into the `interval`-spaced
/// slots it touches.
///
/// A trailing partial interval still counts as a slot. Returns no slots for a
/// non-positive interval; slots past chrono's range are cut off.
pub fn covered_slots(
    start: DateTime<Utc>,
    duration_hours: u32,
    interval: Duration,
) -> Vec<DateTime<Utc>> {
    let step_secs = interval.num_seconds();
    if step_secs <= 0 {
        return Vec::new();
    }

    let span_secs = i64::from(duration_hours) * 3600;
    let count = (span_secs + step_secs - 1) / step_secs;
    (0..count)
        .map_while(|i| start.checked_add_signed(Duration::seconds(i * step_secs)))
        .collect()
}

/// Footprint of one task: at its chosen start, at its best start, and at its
/// worst start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactResult {
    /// Impact at the user-chosen start (g CO2).
    pub selected_impact_g: f64,
    /// Earliest start with minimum impact.
    pub optimal_start: DateTime<Utc>,
    /// Minimum impact over all full windows (g CO2).
    pub optimal_impact_g: f64,
    /// Maximum impact over all full windows (g CO2).
    pub worst_impact_g: f64,
    /// Whether the chosen window ran past the forecast end and was clipped.
    pub selected_clipped: bool,
}

impl ImpactResult {
    /// Grams saved by moving from the chosen start to the optimal one.
    ///
    /// Negative only when the chosen window was clipped at the horizon.
    pub fn savings_g(&self) -> f64 {
        self.selected_impact_g - self.optimal_impact_g
    }

    /// Position of the chosen start between best (0.0) and worst (1.0).
    ///
    /// Returns 0.0 when every window has the same impact.
    pub fn normalized_score(&self) -> f64 {
        let span = self.worst_impact_g - self.optimal_impact_g;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.selected_impact_g - self.optimal_impact_g) / span).clamp(0.0, 1.0)
    }
}

/// Evaluates one task against the forecast.
///
/// Runs the impact calculator for the chosen start and the optimizer for the
/// task's duration and power. Tasks are evaluated independently; no joint
/// placement across tasks is attempted.
///
/// # Errors
///
/// Propagates [`ScheduleError::NotFound`] when the chosen start is not a
/// forecast timestamp and [`ScheduleError::InsufficientHorizon`] when the
/// task is longer than the forecast.
pub fn evaluate_task(task: &Task, forecast: &ForecastTable) -> Result<ImpactResult> {
    let selected_impact_g =
        calculate_impact(task.chosen_start, task.duration_hours, task.power_kw, forecast)?;
    let optimum = optimize_schedule(task.duration_hours, task.power_kw, forecast)?;

    let samples = forecast.samples_for(task.duration_hours)?;
    let index = forecast.index_of(task.chosen_start)?;

    Ok(ImpactResult {
        selected_impact_g,
        optimal_start: optimum.best_start,
        optimal_impact_g: optimum.best_impact_g,
        worst_impact_g: optimum.worst_impact_g,
        selected_clipped: index + samples > forecast.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap()
    }

    fn forecast() -> ForecastTable {
        ForecastTable::hourly_from_intensities(t0(), &[100.0, 50.0, 200.0, 30.0, 60.0]).unwrap()
    }

    #[test]
    fn catalogue_draws() {
        assert_eq!(Appliance::Dishwasher.typical_power_kw(), Some(1.35));
        assert_eq!(Appliance::Oven.typical_power_kw(), Some(2.15));
        assert_eq!(Appliance::Custom.typical_power_kw(), None);
        assert!(
            Appliance::CATALOGUE
                .iter()
                .all(|a| a.typical_power_kw().is_some())
        );
    }

    #[test]
    fn appliance_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: Appliance,
        }
        let w: Wrapper = toml::from_str("kind = \"a100_gpu\"").unwrap();
        assert_eq!(w.kind, Appliance::A100Gpu);
        let w: Wrapper = toml::from_str("kind = \"washing_machine\"").unwrap();
        assert_eq!(w.kind, Appliance::WashingMachine);
    }

    #[test]
    fn task_validation() {
        assert!(Task::new("x", Appliance::Custom, 0.0, 1, t0()).is_err());
        assert!(Task::new("x", Appliance::Custom, 1.0, 0, t0()).is_err());
        assert_eq!(
            Task::from_appliance("x", Appliance::Custom, 1, t0()),
            Err(ScheduleError::PowerRequired {
                appliance: "Custom".to_string()
            })
        );
        let task = Task::from_appliance("wash", Appliance::WashingMachine, 2, t0()).unwrap();
        assert_eq!(task.power_kw, 0.5);
        assert_eq!(task.energy_kwh(), 1.0);
    }

    #[test]
    fn covered_slots_hourly_and_sub_hourly() {
        let task = Task::new("x", Appliance::Custom, 1.0, 2, t0()).unwrap();
        assert_eq!(
            task.covered_slots(Duration::hours(1)),
            vec![t0(), t0() + Duration::hours(1)]
        );
        assert_eq!(task.covered_slots(Duration::minutes(30)).len(), 4);
        // 3 h in 2 h slots: partial trailing slot counts
        assert_eq!(task.covered_slots(Duration::hours(2)).len(), 1);
        assert_eq!(covered_slots(t0(), 3, Duration::hours(2)).len(), 2);
        assert!(task.covered_slots(Duration::zero()).is_empty());
    }

    #[test]
    fn evaluate_combines_calculator_and_optimizer() {
        let task = Task::new("x", Appliance::Custom, 2.0, 2, t0()).unwrap();
        let result = evaluate_task(&task, &forecast()).unwrap();
        assert_eq!(result.selected_impact_g, 300.0);
        assert_eq!(result.optimal_impact_g, 180.0);
        assert_eq!(result.optimal_start, t0() + Duration::hours(3));
        assert_eq!(result.worst_impact_g, 500.0);
        assert_eq!(result.savings_g(), 120.0);
        assert!(!result.selected_clipped);
        // (300 - 180) / (500 - 180)
        assert!((result.normalized_score() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn evaluate_flags_clipped_selection() {
        let task = Task::new("x", Appliance::Custom, 2.0, 2, t0() + Duration::hours(4)).unwrap();
        let result = evaluate_task(&task, &forecast()).unwrap();
        assert!(result.selected_clipped);
        assert_eq!(result.selected_impact_g, 120.0);
        assert!(result.savings_g() < 0.0);
        assert_eq!(result.normalized_score(), 0.0);
    }

    #[test]
    fn evaluate_propagates_errors() {
        let late = Task::new("x", Appliance::Custom, 1.0, 1, t0() + Duration::hours(9)).unwrap();
        assert!(matches!(
            evaluate_task(&late, &forecast()),
            Err(ScheduleError::NotFound { .. })
        ));
        let long = Task::new("x", Appliance::Custom, 1.0, 6, t0()).unwrap();
        assert!(matches!(
            evaluate_task(&long, &forecast()),
            Err(ScheduleError::InsufficientHorizon { .. })
        ));
    }
}
