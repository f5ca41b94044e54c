//! Result bundle of a simulation run and the top-level entry point.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::error::Result;

use super::daily::{AggregatedDailyData, aggregate_daily};
use super::distributions::UniformSource;
use super::engine::{Engine, SimulationRun};
use super::histogram::{DEFAULT_BINS, HistogramScale, PowerHistogramDataPoint, power_histogram};
use super::types::SimulationParameters;
use super::utilization::{ChargepointUtilization, StationSummary, group_by_power, summarize};

/// How the power histogram of a result is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramOptions {
    pub bins: usize,
    pub scale: HistogramScale,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            scale: HistogramScale::Theoretical,
        }
    }
}

/// Everything a run reports, derived post-hoc from the power series and the
/// final chargepoint states.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Energy delivered across all chargepoints (kWh).
    pub total_energy_kwh: f64,
    /// Highest interval power (kW).
    pub max_power_kw: f64,
    /// Sum of all chargepoint ratings (kW).
    pub max_theoretical_power_kw: f64,
    /// `max_power_kw / max_theoretical_power_kw`, in `[0, 1]`.
    pub concurrency_factor: f64,
    pub aggregated_daily_data: AggregatedDailyData,
    pub power_histogram: Vec<PowerHistogramDataPoint>,
    /// One entry per physical chargepoint, in configuration order.
    pub chargepoint_utilizations: Vec<ChargepointUtilization>,
}

impl SimulationResult {
    /// Reduces a finished run into a result bundle.
    ///
    /// With [`HistogramScale::Observed`] and a series that never drew power,
    /// the bins fall back to the theoretical maximum.
    ///
    /// # Errors
    ///
    /// Propagates aggregation and binning errors (empty series, zero bins).
    pub fn from_run(
        params: &SimulationParameters,
        run: &SimulationRun,
        histogram: HistogramOptions,
    ) -> Result<Self> {
        let series = run.power_series.as_slice();
        let max_power_kw = run.power_series.peak_kw();
        let max_theoretical_power_kw = params.max_theoretical_power_kw();
        let concurrency_factor = if max_theoretical_power_kw > 0.0 {
            max_power_kw / max_theoretical_power_kw
        } else {
            0.0
        };

        let mut bin_span_kw = histogram
            .scale
            .max_power_kw(max_theoretical_power_kw, max_power_kw);
        if bin_span_kw <= 0.0 {
            bin_span_kw = max_theoretical_power_kw;
        }

        Ok(Self {
            total_energy_kwh: run.total_energy_kwh,
            max_power_kw,
            max_theoretical_power_kw,
            concurrency_factor,
            aggregated_daily_data: aggregate_daily(series, params.interval_minutes)?,
            power_histogram: power_histogram(series, bin_span_kw, histogram.bins)?,
            chargepoint_utilizations: summarize(&run.chargepoints, series.len(), params.days),
        })
    }

    /// Utilization collapsed to one entry per power rating.
    pub fn utilization_by_power(&self) -> Vec<ChargepointUtilization> {
        group_by_power(&self.chargepoint_utilizations)
    }

    /// Station-wide utilization headline figures.
    pub fn station_summary(&self) -> StationSummary {
        StationSummary::from_utilizations(&self.chargepoint_utilizations)
    }
}

/// Runs a simulation with the default histogram (20 bins over the theoretical maximum).
///
/// # Errors
///
/// Returns [`crate::error::SimError::InvalidInput`] for invalid parameters.
pub fn run_simulation(
    params: &SimulationParameters,
    rng: &mut impl UniformSource,
) -> Result<SimulationResult> {
    run_simulation_with(params, HistogramOptions::default(), rng)
}

/// Runs a simulation and reduces it with the given histogram options.
///
/// # Errors
///
/// Returns [`crate::error::SimError::InvalidInput`] for invalid parameters and
/// [`crate::error::SimError::DegenerateInput`] for zero bins.
pub fn run_simulation_with(
    params: &SimulationParameters,
    histogram: HistogramOptions,
    rng: &mut impl UniformSource,
) -> Result<SimulationResult> {
    simulate(params, histogram, rng).map(|(_, result)| result)
}

/// Runs a simulation and returns the raw run alongside its reduced result.
///
/// Callers that export the power series use this instead of
/// [`run_simulation_with`].
///
/// # Errors
///
/// Same as [`run_simulation_with`].
pub fn simulate(
    params: &SimulationParameters,
    histogram: HistogramOptions,
    rng: &mut impl UniformSource,
) -> Result<(SimulationRun, SimulationResult)> {
    let run = Engine::new(params.clone())?.run(rng)?;
    let result = SimulationResult::from_run(params, &run, histogram)?;
    info!(
        total_energy_kwh = result.total_energy_kwh,
        max_power_kw = result.max_power_kw,
        concurrency_factor = result.concurrency_factor,
        "simulation finished"
    );
    Ok((run, result))
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let daily = &self.aggregated_daily_data.daily_stats;
        writeln!(f, "--- Simulation Report ---")?;
        writeln!(f, "Total energy:          {:.1} kWh", self.total_energy_kwh)?;
        writeln!(f, "Peak power:            {:.1} kW", self.max_power_kw)?;
        writeln!(
            f,
            "Theoretical max:       {:.1} kW",
            self.max_theoretical_power_kw
        )?;
        writeln!(f, "Concurrency factor:    {:.3}", self.concurrency_factor)?;
        writeln!(
            f,
            "Daily energy:          avg {:.1} / max {:.1} / min {:.1} kWh",
            daily.avg, daily.max, daily.min
        )?;

        writeln!(f, "\n--- Power Distribution ---")?;
        for bin in &self.power_histogram {
            writeln!(
                f,
                "<= {:>7.1} kW  {:>7}  {:>6.2}%",
                bin.max_power_kw, bin.count, bin.percentage
            )?;
        }

        writeln!(f, "\n--- Utilization by Power Rating ---")?;
        for u in self.utilization_by_power() {
            writeln!(
                f,
                "{:>6.1} kW  util {:>5.1}%  {:>5.2} events/day  {:>7.1} kWh/day  \
                 {:>6.1} events/month  {:>8.1} kWh/month",
                u.power_kw,
                u.utilization,
                u.avg_daily_events,
                u.avg_daily_energy_kwh,
                u.avg_monthly_events,
                u.avg_monthly_energy_kwh
            )?;
        }

        let summary = self.station_summary();
        write!(
            f,
            "Station:    avg util {:.1}%  {:.1} events/day  {:.1} kWh/day",
            summary.average_utilization, summary.total_daily_events, summary.total_daily_energy_kwh
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::sim::distributions::ConstantSource;
    use crate::sim::engine::PowerSeries;
    use crate::sim::types::ChargepointTypeConfig;

    fn small_params() -> SimulationParameters {
        SimulationParameters {
            days: 7,
            ..SimulationParameters::default()
        }
    }

    #[test]
    fn result_respects_power_bounds() {
        let result = run_simulation(&small_params(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(result.max_theoretical_power_kw, 171.0);
        assert!((0.0..=171.0).contains(&result.max_power_kw));
        assert!((0.0..=1.0).contains(&result.concurrency_factor));
        assert_eq!(result.chargepoint_utilizations.len(), 9);
    }

    #[test]
    fn idle_run_reports_zeroes() {
        let result = run_simulation(&small_params(), &mut ConstantSource(0.999_999)).unwrap();
        assert_eq!(result.total_energy_kwh, 0.0);
        assert_eq!(result.max_power_kw, 0.0);
        assert_eq!(result.concurrency_factor, 0.0);
        assert_eq!(result.power_histogram[0].percentage, 100.0);
    }

    #[test]
    fn observed_scale_falls_back_when_idle() {
        let params = small_params();
        let run = SimulationRun {
            power_series: PowerSeries::from(vec![0.0; 7 * 96]),
            chargepoints: Vec::new(),
            total_energy_kwh: 0.0,
        };
        let options = HistogramOptions {
            bins: 10,
            scale: HistogramScale::Observed,
        };
        let result = SimulationResult::from_run(&params, &run, options).unwrap();
        let last_edge = result.power_histogram.last().unwrap().max_power_kw;
        assert!((last_edge - 171.0).abs() < 1e-9);
    }

    #[test]
    fn observed_scale_uses_series_peak() {
        let params = SimulationParameters {
            chargepoints: vec![ChargepointTypeConfig::new(4, 25.0)],
            days: 1,
            interval_minutes: 60,
            ..SimulationParameters::default()
        };
        let mut samples = vec![0.0; 24];
        samples[10] = 50.0;
        let run = SimulationRun {
            power_series: PowerSeries::from(samples),
            chargepoints: Vec::new(),
            total_energy_kwh: 50.0,
        };
        let options = HistogramOptions {
            bins: 5,
            scale: HistogramScale::Observed,
        };
        let result = SimulationResult::from_run(&params, &run, options).unwrap();
        assert_eq!(result.concurrency_factor, 0.5);
        let last = result.power_histogram.last().unwrap();
        assert_eq!((last.max_power_kw, last.count), (50.0, 1));
    }

    #[test]
    fn simulate_keeps_series_consistent_with_result() {
        let (run, result) = simulate(
            &small_params(),
            HistogramOptions::default(),
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();
        assert_eq!(run.power_series.len(), 7 * 96);
        assert_eq!(run.power_series.peak_kw(), result.max_power_kw);
        assert_eq!(run.total_energy_kwh, result.total_energy_kwh);
    }

    #[test]
    fn report_display_does_not_panic() {
        let result = run_simulation(&small_params(), &mut StdRng::seed_from_u64(5)).unwrap();
        let text = result.to_string();
        assert!(text.contains("Concurrency factor"));
        assert!(text.contains("Utilization by Power Rating"));
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let result = run_simulation(&small_params(), &mut StdRng::seed_from_u64(5)).unwrap();
        let json = serde_json::to_value(result).unwrap();
        for key in [
            "totalEnergyKwh",
            "maxPowerKw",
            "maxTheoreticalPowerKw",
            "concurrencyFactor",
            "aggregatedDailyData",
            "powerHistogram",
            "chargepointUtilizations",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["aggregatedDailyData"].get("dailyStats").is_some());
    }
}
