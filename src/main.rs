//! EV charging station load simulator entry point: CLI wiring and config-driven runs.

use std::path::Path;
use std::process;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use ev_load_sim::config::ScenarioConfig;
use ev_load_sim::io::export::{export_histogram_csv, export_series_csv};
use ev_load_sim::logging;
use ev_load_sim::sim::report::simulate;
use ev_load_sim::sim::sweep::{concurrency_by_fleet_size, concurrency_distribution};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    runs: Option<usize>,
    fleet_sweep: Option<u32>,
    fleet_power_kw: f64,
    series_out: Option<String>,
    histogram_out: Option<String>,
    verbose: bool,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("ev-load-sim: EV charging station load simulator");
    eprintln!();
    eprintln!("Usage: ev-load-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --runs <n>               Also sweep the concurrency factor over n seeded runs");
    eprintln!("  --fleet-sweep <n>        Also sweep the concurrency factor over fleets of 1..=n chargepoints");
    eprintln!("  --fleet-power <kW>       Rating used by --fleet-sweep (default: 11)");
    eprintln!("  --series-out <path>      Export the power series to CSV");
    eprintln!("  --histogram-out <path>   Export the power histogram to CSV");
    eprintln!("  --verbose                Log at debug level");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after simulation");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the default preset is used.");
}

/// Returns the value following a flag, or exits with an error.
fn flag_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("error: {flag} requires a {what} argument");
            process::exit(1);
        }
    }
}

/// Parses a flag value, or exits with an error naming the expected type.
fn parse_value<T: std::str::FromStr>(value: &str, flag: &str, what: &str) -> T {
    match value.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("error: {flag} value \"{value}\" is not a valid {what}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        runs: None,
        fleet_sweep: None,
        fleet_power_kw: 11.0,
        series_out: None,
        histogram_out: None,
        verbose: false,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(flag_value(&args, i, "--scenario", "path"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, "--preset", "name"));
            }
            "--seed" => {
                i += 1;
                let value = flag_value(&args, i, "--seed", "u64");
                cli.seed_override = Some(parse_value(&value, "--seed", "u64"));
            }
            "--runs" => {
                i += 1;
                let value = flag_value(&args, i, "--runs", "count");
                let runs: usize = parse_value(&value, "--runs", "positive count");
                if runs == 0 {
                    eprintln!("error: --runs must be > 0");
                    process::exit(1);
                }
                cli.runs = Some(runs);
            }
            "--fleet-sweep" => {
                i += 1;
                let value = flag_value(&args, i, "--fleet-sweep", "count");
                let max_count: u32 = parse_value(&value, "--fleet-sweep", "positive count");
                if max_count == 0 {
                    eprintln!("error: --fleet-sweep must be > 0");
                    process::exit(1);
                }
                cli.fleet_sweep = Some(max_count);
            }
            "--fleet-power" => {
                i += 1;
                let value = flag_value(&args, i, "--fleet-power", "kW");
                cli.fleet_power_kw = parse_value(&value, "--fleet-power", "power in kW");
            }
            "--series-out" => {
                i += 1;
                cli.series_out = Some(flag_value(&args, i, "--series-out", "path"));
            }
            "--histogram-out" => {
                i += 1;
                cli.histogram_out = Some(flag_value(&args, i, "--histogram-out", "path"));
            }
            "--verbose" | "-v" => {
                cli.verbose = true;
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let value = flag_value(&args, i, "--port", "u16");
                cli.port = parse_value(&value, "--port", "u16");
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();
    logging::init(cli.verbose);

    // Load config: --scenario takes priority, then --preset, then the default station
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::default_station())
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let params = scenario.to_parameters().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let seed = scenario.simulation.seed;
    info!(seed, "running scenario");

    let mut rng = StdRng::seed_from_u64(seed);
    let (run, result) = simulate(&params, scenario.histogram_options(), &mut rng)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });

    println!("{params}");
    println!("\n{result}");

    if let Some(runs) = cli.runs {
        match concurrency_distribution(&params, runs, seed) {
            Ok(distribution) => println!("\n{distribution}"),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    }

    if let Some(max_count) = cli.fleet_sweep {
        match concurrency_by_fleet_size(&params, max_count, cli.fleet_power_kw, seed) {
            Ok(curve) => println!("\n{curve}"),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    }

    if let Some(ref path) = cli.series_out {
        if let Err(e) = export_series_csv(
            run.power_series.as_slice(),
            params.interval_minutes,
            Path::new(path),
        ) {
            eprintln!("error: failed to write series CSV: {e}");
            process::exit(1);
        }
        info!(path = %path, "power series written");
    }

    if let Some(ref path) = cli.histogram_out {
        if let Err(e) = export_histogram_csv(&result.power_histogram, Path::new(path)) {
            eprintln!("error: failed to write histogram CSV: {e}");
            process::exit(1);
        }
        info!(path = %path, "power histogram written");
    }

    // Start API server if requested, seeded with this run
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        use ev_load_sim::api::{AppState, serve};
        use ev_load_sim::store::{InMemoryStore, ParameterStore, find_or_insert};

        let mut store = InMemoryStore::new();
        let (parameter_id, _) = find_or_insert(&mut store, &params);
        store.save_result(parameter_id, result);

        let state = Arc::new(AppState::with_store(store));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
