use std::process::Command;

use serde_json::Value;

#[test]
fn presets_run_via_cli_and_never_beat_the_optimum() {
    for preset in ["demo", "overnight"] {
        let run = run_json(&["--preset", preset, "--json"]);
        let outcomes = run["outcomes"].as_array().expect("outcomes array");
        assert!(!outcomes.is_empty(), "preset {preset} has no tasks");

        for o in outcomes {
            let impact = &o["impact"];
            let optimal = impact["optimal_impact_g"].as_f64().unwrap();
            let selected = impact["selected_impact_g"].as_f64().unwrap();
            let worst = impact["worst_impact_g"].as_f64().unwrap();
            assert!(
                optimal <= selected && selected <= worst,
                "preset {preset} task {}: {optimal} / {selected} / {worst}",
                o["task"]["name"]
            );
        }

        let report = &run["report"];
        assert_eq!(report["task_count"].as_u64(), Some(outcomes.len() as u64));
        let pct = report["reduction_pct"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&pct), "preset {preset}: {pct}");
    }
}

#[test]
fn sample_config_against_sample_forecast_csv() {
    let run = run_json(&[
        "--config",
        "scenarios/sample.toml",
        "--forecast",
        "scenarios/sample_forecast.csv",
        "--json",
    ]);

    let report = &run["report"];
    assert_eq!(report["task_count"], 2);
    assert_eq!(report["selected_g"].as_f64(), Some(570.0));
    assert_eq!(report["optimal_g"].as_f64(), Some(220.5));
    assert_eq!(report["clipped_task_count"], 0);

    assert_eq!(run["forecast"].as_array().map(Vec::len), Some(5));
    assert_eq!(run["forecast"][3]["co2_g_per_kwh"].as_f64(), Some(30.0));

    let heat_pump = &run["outcomes"][0];
    assert_eq!(heat_pump["task"]["name"], "heat pump");
    assert_eq!(heat_pump["impact"]["optimal_impact_g"].as_f64(), Some(180.0));
    assert_eq!(heat_pump["impact"]["worst_impact_g"].as_f64(), Some(500.0));
}

#[test]
fn config_csv_path_is_relative_to_config_file() {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let config = manifest.join("scenarios/sample.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_co2-scheduler"))
        .current_dir(std::env::temp_dir())
        .arg("--config")
        .arg(&config)
        .arg("--json")
        .output()
        .expect("co2-scheduler process should run");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let run: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(run["report"]["selected_g"].as_f64(), Some(570.0));
}

#[test]
fn overnight_scenario_file_runs_half_hourly() {
    let run = run_json(&["--config", "scenarios/overnight.toml", "--json"]);

    let forecast = run["forecast"].as_array().expect("forecast array");
    assert_eq!(forecast.len(), 96);

    let names: Vec<&str> = run["outcomes"]
        .as_array()
        .expect("outcomes array")
        .iter()
        .filter_map(|o| o["task"]["name"].as_str())
        .collect();
    assert_eq!(names, ["fine-tune", "laundry"]);
    assert_eq!(run["report"]["clipped_task_count"], 0);

    let optimal = run["outcomes"][0]["impact"]["optimal_impact_g"].as_f64().unwrap();
    let selected = run["outcomes"][0]["impact"]["selected_impact_g"].as_f64().unwrap();
    assert!(optimal <= selected);
}

#[test]
fn csv_exports_are_written() {
    let dir = std::env::temp_dir().join(format!("co2-scheduler-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("outcomes.csv");
    let timeline = dir.join("timeline.csv");

    let output = Command::new(env!("CARGO_BIN_EXE_co2-scheduler"))
        .args(["--config", "scenarios/sample.toml", "--out"])
        .arg(&out)
        .arg("--timeline-out")
        .arg(&timeline)
        .output()
        .expect("co2-scheduler process should run");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let outcomes = std::fs::read_to_string(&out).unwrap();
    assert_eq!(outcomes.lines().count(), 3);
    assert!(outcomes.starts_with("task,appliance,power_kw"));

    let rows = std::fs::read_to_string(&timeline).unwrap();
    assert!(rows.starts_with("timestamp,task,placement"));
    assert!(rows.lines().count() > 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_preset_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_co2-scheduler"))
        .args(["--preset", "bogus"])
        .output()
        .expect("co2-scheduler process should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"), "stderr={stderr}");
}

fn run_json(args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_co2-scheduler"))
        .args(args)
        .output()
        .expect("co2-scheduler process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}
