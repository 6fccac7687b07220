/// CO2 impact of running a task from a chosen start.
pub mod impact;
/// Best/worst start search over the forecast horizon.
pub mod optimizer;
/// Cross-task footprint aggregation.
pub mod report;
/// Task definitions, appliance catalogue, and per-task evaluation.
pub mod task;
/// Sliding-window aggregation over intensity series.
pub mod window;

pub use impact::calculate_impact;
pub use optimizer::{ScheduleOptimum, optimize_schedule};
pub use report::{FootprintReport, TaskOutcome};
pub use task::{Appliance, ImpactResult, Task, evaluate_task};
