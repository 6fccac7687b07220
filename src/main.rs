//! co2-scheduler entry point: CLI wiring and config-driven schedule evaluation.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use co2_scheduler::config::{ConfigError, ScheduleConfig};
use co2_scheduler::io::export::{export_outcomes_csv, export_timeline_csv};
use co2_scheduler::runner::run_schedule;

/// Carbon-aware task scheduler: finds the lowest-CO2 start for each task.
#[derive(Debug, Parser)]
#[command(name = "co2-scheduler", version)]
#[command(after_help = "If neither --config nor --preset is given, the demo preset is used.")]
struct Args {
    /// Load forecast settings and tasks from a TOML file
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Use a built-in preset (demo, overnight)
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,

    /// Forecast CSV to use instead of the configured source
    #[arg(long, value_name = "PATH")]
    forecast: Option<PathBuf>,

    /// Export per-task outcomes to CSV
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Export the slot-by-slot timeline to CSV
    #[arg(long, value_name = "PATH")]
    timeline_out: Option<PathBuf>,

    /// Print outcomes and report as JSON
    #[arg(long)]
    json: bool,

    /// Start the REST API after evaluation
    #[cfg(feature = "api")]
    #[arg(long)]
    serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("co2_scheduler=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the configuration: `--config` first, then `--preset`, then demo.
fn load_config(args: &Args) -> Result<ScheduleConfig, ConfigError> {
    if let Some(path) = &args.config {
        ScheduleConfig::from_toml_file(path)
    } else if let Some(name) = &args.preset {
        ScheduleConfig::from_preset(name)
    } else {
        Ok(ScheduleConfig::demo())
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let run = match run_schedule(&config, args.forecast.as_deref()) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&run) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize run: {e}");
                process::exit(1);
            }
        }
    } else {
        for o in &run.outcomes {
            println!("{o}");
        }
        println!("\n{}", run.report);
    }

    if let Some(path) = &args.out {
        if let Err(e) = export_outcomes_csv(&run.outcomes, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "outcomes written");
    }

    if let Some(path) = &args.timeline_out {
        if let Err(e) = export_timeline_csv(&run.outcomes, &run.forecast, path) {
            eprintln!("error: failed to write timeline CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "timeline written");
    }

    #[cfg(feature = "api")]
    if args.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(co2_scheduler::api::AppState::from_run(run));
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(co2_scheduler::api::serve(state, addr)) {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
