//! CSV export for evaluated task outcomes.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::forecast::ForecastTable;
use crate::schedule::TaskOutcome;
use crate::schedule::task::covered_slots;

/// Column header for the per-task outcome export.
const OUTCOME_HEADER: &str = "task,appliance,power_kw,duration_hours,selected_start,\
                              selected_g,optimal_start,optimal_g,worst_g,savings_g,\
                              normalized_score,clipped";

/// Column header for the per-slot timeline export.
const TIMELINE_HEADER: &str = "timestamp,task,placement,co2_g_per_kwh,co2_g";

/// Exports task outcomes to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_outcomes_csv(outcomes: &[TaskOutcome], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_outcomes_csv(outcomes, buf)
}

/// Writes one row per task outcome to any writer.
///
/// Output is deterministic for identical inputs.
///
/// # Arguments
///
/// * `outcomes` - Evaluated tasks
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_outcomes_csv(outcomes: &[TaskOutcome], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(OUTCOME_HEADER.split(',').map(str::trim))?;

    for o in outcomes {
        let t = &o.task;
        let i = &o.impact;
        wtr.write_record(&[
            t.name.clone(),
            t.appliance.label().to_string(),
            format!("{:.3}", t.power_kw),
            t.duration_hours.to_string(),
            t.chosen_start.to_rfc3339(),
            format!("{:.3}", i.selected_impact_g),
            i.optimal_start.to_rfc3339(),
            format!("{:.3}", i.optimal_impact_g),
            format!("{:.3}", i.worst_impact_g),
            format!("{:.3}", i.savings_g()),
            format!("{:.4}", i.normalized_score()),
            i.selected_clipped.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the slot-by-slot timeline to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_timeline_csv(
    outcomes: &[TaskOutcome],
    forecast: &ForecastTable,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_timeline_csv(outcomes, forecast, buf)
}

/// Writes every forecast slot each task occupies, once for its chosen start
/// (`selected`) and once for its optimal start (`optimal`).
///
/// Slots that fall outside the forecast are omitted, matching the clipping
/// applied by the impact calculator.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_timeline_csv(
    outcomes: &[TaskOutcome],
    forecast: &ForecastTable,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TIMELINE_HEADER.split(','))?;

    let dt_hours = forecast.dt_hours();
    for o in outcomes {
        let placements = [
            ("selected", o.task.chosen_start),
            ("optimal", o.impact.optimal_start),
        ];
        for (placement, start) in placements {
            for slot in covered_slots(start, o.task.duration_hours, forecast.interval()) {
                let Ok(index) = forecast.index_of(slot) else {
                    continue;
                };
                let intensity = forecast.intensities()[index];
                wtr.write_record(&[
                    slot.to_rfc3339(),
                    o.task.name.clone(),
                    placement.to_string(),
                    format!("{intensity:.3}"),
                    format!("{:.3}", intensity * o.task.power_kw * dt_hours),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
