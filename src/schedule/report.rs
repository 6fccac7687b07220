//! Post-hoc footprint aggregation across independently evaluated tasks.

use std::fmt;

use serde::Serialize;

use super::task::{ImpactResult, Task};

/// A task paired with its evaluated impact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub task: Task,
    pub impact: ImpactResult,
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.task;
        let i = &self.impact;
        write!(
            f,
            "{:<16} {:<15} {:>5.2} kW x {:>2} h | chosen {} = {:>8.1} g | best {} = {:>8.1} g \
             | worst {:>8.1} g | score={:.2}{}",
            t.name,
            t.appliance.label(),
            t.power_kw,
            t.duration_hours,
            t.chosen_start.format("%Y-%m-%d %H:%M"),
            i.selected_impact_g,
            i.optimal_start.format("%Y-%m-%d %H:%M"),
            i.optimal_impact_g,
            i.worst_impact_g,
            i.normalized_score(),
            if i.selected_clipped { " (clipped)" } else { "" },
        )
    }
}

/// Aggregate footprint of a task list, as shown next to the per-task rows.
///
/// Computed from `&[TaskOutcome]` so totals always match the rows they
/// summarize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootprintReport {
    /// Number of tasks aggregated.
    pub task_count: usize,
    /// Total energy of all tasks (kWh).
    pub energy_kwh: f64,
    /// Sum of impacts at the chosen starts (g CO2).
    pub selected_g: f64,
    /// Sum of impacts at the optimal starts (g CO2).
    pub optimal_g: f64,
    /// Sum of impacts at the worst starts (g CO2).
    pub worst_g: f64,
    /// `selected_g - optimal_g`.
    pub savings_g: f64,
    /// Share of the chosen footprint avoidable by optimal placement (%).
    pub reduction_pct: Option<f64>,
    /// Tasks whose chosen window was clipped at the forecast end.
    pub clipped_task_count: usize,
}

impl FootprintReport {
    /// Sums all outcomes into a report.
    ///
    /// # Arguments
    ///
    /// * `outcomes` - Evaluated tasks, in display order
    ///
    /// # Returns
    ///
    /// A `FootprintReport`; all totals are zero and `reduction_pct` is `None`
    /// for an empty task list.
    pub fn from_outcomes(outcomes: &[TaskOutcome]) -> Self {
        let mut energy_kwh = 0.0_f64;
        let mut selected_g = 0.0_f64;
        let mut optimal_g = 0.0_f64;
        let mut worst_g = 0.0_f64;
        let mut clipped = 0_usize;

        for o in outcomes {
            energy_kwh += o.task.energy_kwh();
            selected_g += o.impact.selected_impact_g;
            optimal_g += o.impact.optimal_impact_g;
            worst_g += o.impact.worst_impact_g;
            if o.impact.selected_clipped {
                clipped += 1;
            }
        }

        Self {
            task_count: outcomes.len(),
            energy_kwh,
            selected_g,
            optimal_g,
            worst_g,
            savings_g: selected_g - optimal_g,
            reduction_pct: reduction_pct(selected_g, optimal_g),
            clipped_task_count: clipped,
        }
    }
}

/// Percentage of `selected_g` removed by moving to `optimal_g`:
/// `100 × (selected − optimal) / selected`.
///
/// Returns `None` when `selected_g` is not positive, since a zero footprint
/// has no meaningful relative reduction. With every chosen window inside the
/// horizon the result lies in `[0, 100]`.
pub fn reduction_pct(selected_g: f64, optimal_g: f64) -> Option<f64> {
    if selected_g > 0.0 {
        Some(100.0 * (selected_g - optimal_g) / selected_g)
    } else {
        None
    }
}

impl fmt::Display for FootprintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Footprint Report ---")?;
        writeln!(f, "Tasks:                 {}", self.task_count)?;
        writeln!(f, "Energy:                {:.2} kWh", self.energy_kwh)?;
        writeln!(f, "Selected footprint:    {:.1} g CO2", self.selected_g)?;
        writeln!(f, "Optimized footprint:   {:.1} g CO2", self.optimal_g)?;
        writeln!(f, "Worst-case footprint:  {:.1} g CO2", self.worst_g)?;
        match self.reduction_pct {
            Some(pct) => writeln!(
                f,
                "Possible savings:      {:.1} g CO2 ({pct:.1}%)",
                self.savings_g
            )?,
            None => writeln!(f, "Possible savings:      {:.1} g CO2", self.savings_g)?,
        }
        write!(f, "Clipped selections:    {}", self.clipped_task_count)
    }
}
