use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ev-load-sim"))
        .args(args)
        .output()
        .expect("ev-load-sim process should run")
}

fn run_and_parse_stdout(args: &[&str]) -> String {
    let output = run_cli(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing report line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid report format for line `{line}`"));

    let numeric = raw.strip_suffix(unit).unwrap_or(raw).trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from report line `{line}`"))
}

#[test]
fn scenario_files_report_their_theoretical_peak() {
    let depot = run_and_parse_stdout(&["--scenario", "scenarios/small_depot.toml"]);
    let hub = run_and_parse_stdout(&["--scenario", "scenarios/busy_hub.toml"]);

    assert_eq!(parse_metric(&depot, "Theoretical max:", "kW"), 44.0);
    assert_eq!(parse_metric(&hub, "Theoretical max:", "kW"), 720.0);

    for out in [&depot, &hub] {
        let cf = parse_metric(out, "Concurrency factor:", "");
        assert!((0.0..=1.0).contains(&cf), "concurrency factor {cf} out of range");
    }
}

#[test]
fn seed_override_is_deterministic() {
    let a = run_and_parse_stdout(&["--preset", "small_depot", "--seed", "7"]);
    let b = run_and_parse_stdout(&["--preset", "small_depot", "--seed", "7"]);
    assert_eq!(a, b);
}

#[test]
fn csv_exports_are_written() {
    let dir = std::env::temp_dir().join(format!("ev-load-sim-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let series = dir.join("series.csv");
    let histogram = dir.join("histogram.csv");

    run_and_parse_stdout(&[
        "--preset",
        "small_depot",
        "--series-out",
        series.to_str().expect("utf-8 path"),
        "--histogram-out",
        histogram.to_str().expect("utf-8 path"),
    ]);

    let series_csv = std::fs::read_to_string(&series).expect("series CSV should exist");
    // 1 header + 30 days of 15-minute intervals
    assert_eq!(series_csv.lines().count(), 1 + 30 * 96);
    let histogram_csv = std::fs::read_to_string(&histogram).expect("histogram CSV should exist");
    assert_eq!(histogram_csv.lines().count(), 1 + 20);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn runs_flag_prints_distribution() {
    let out = run_and_parse_stdout(&["--preset", "small_depot", "--runs", "4"]);
    assert!(out.contains("Concurrency Factor over 4 Runs"));
}

#[test]
fn fleet_sweep_flag_prints_one_row_per_size() {
    let out = run_and_parse_stdout(&[
        "--preset",
        "small_depot",
        "--fleet-sweep",
        "3",
        "--fleet-power",
        "22",
    ]);
    assert!(out.contains("Concurrency Factor by Fleet Size (22 kW each)"));
    let rows: Vec<&str> = out
        .lines()
        .skip_while(|l| !l.contains("by Fleet Size"))
        .skip(2)
        .take_while(|l| !l.trim().is_empty())
        .collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[2].trim_start().starts_with('3'));
}

#[test]
fn fleet_sweep_rejects_zero() {
    let output = run_cli(&["--fleet-sweep", "0"]);
    assert!(!output.status.success());
}

#[test]
fn unknown_preset_fails() {
    let output = run_cli(&["--preset", "nonexistent"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}
