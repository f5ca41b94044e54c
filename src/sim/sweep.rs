//! Concurrency factor sweeps: over independently seeded runs of one station,
//! and over growing fleets of identical chargepoints.

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::{Result, SimError};

use super::engine::Engine;
use super::types::{ChargepointTypeConfig, SimulationParameters};

/// How many runs landed on one (rounded) concurrency factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcurrencyBucket {
    /// Concurrency factor rounded to two decimals.
    pub concurrency_factor: f64,
    pub count: usize,
    /// Share of all runs (%).
    pub percentage: f64,
}

/// Distribution of the concurrency factor over a batch of runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcurrencyDistribution {
    pub runs: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Ascending by concurrency factor.
    pub buckets: Vec<ConcurrencyBucket>,
}

/// Runs `runs` simulations in parallel and collects their concurrency factors.
///
/// Run `i` is seeded with `base_seed + i` (wrapping), so the result does not
/// depend on thread scheduling.
///
/// # Errors
///
/// Returns [`SimError::InvalidInput`] if `runs` is zero or `params` fail
/// validation.
pub fn concurrency_distribution(
    params: &SimulationParameters,
    runs: usize,
    base_seed: u64,
) -> Result<ConcurrencyDistribution> {
    if runs == 0 {
        return Err(SimError::InvalidInput("sweep needs at least one run".into()));
    }
    params.validate()?;
    let theoretical = params.max_theoretical_power_kw();

    let factors: Vec<f64> = (0..runs)
        .into_par_iter()
        .map(|i| -> Result<f64> {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let run = Engine::new(params.clone())?.run(&mut rng)?;
            Ok(run.power_series.peak_kw() / theoretical)
        })
        .collect::<Result<Vec<f64>>>()?;

    let distribution = summarize_factors(&factors);
    info!(
        runs,
        mean = distribution.mean,
        min = distribution.min,
        max = distribution.max,
        "concurrency sweep finished"
    );
    Ok(distribution)
}

fn summarize_factors(factors: &[f64]) -> ConcurrencyDistribution {
    let n = factors.len();
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &f in factors {
        *counts.entry((f * 100.0).round() as i64).or_default() += 1;
    }

    let buckets = counts
        .into_iter()
        .map(|(key, count)| ConcurrencyBucket {
            concurrency_factor: key as f64 / 100.0,
            count,
            percentage: 100.0 * count as f64 / n as f64,
        })
        .collect();

    ConcurrencyDistribution {
        runs: n,
        mean: factors.iter().sum::<f64>() / n as f64,
        min: factors.iter().copied().fold(f64::INFINITY, f64::min),
        max: factors.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        buckets,
    }
}

/// One fleet size of a [`FleetSizeCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSizePoint {
    pub chargepoint_count: u32,
    pub max_power_kw: f64,
    pub max_theoretical_power_kw: f64,
    pub concurrency_factor: f64,
}

/// Concurrency factor as a function of how many identical chargepoints a
/// station has.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSizeCurve {
    /// Rating shared by every chargepoint (kW).
    pub power_kw: f64,
    /// One point per fleet size, `1..=max_count`, ascending.
    pub points: Vec<FleetSizePoint>,
}

/// Simulates fleets of `1..=max_count` chargepoints rated `power_kw`, one run
/// per size, in parallel.
///
/// Every run keeps the horizon and demand settings of `params` and replaces
/// its fleet. Fleet size `n` is seeded with `seed + n` (wrapping).
///
/// # Errors
///
/// Returns [`SimError::InvalidInput`] if `max_count` is zero or any fleet
/// fails validation.
pub fn concurrency_by_fleet_size(
    params: &SimulationParameters,
    max_count: u32,
    power_kw: f64,
    seed: u64,
) -> Result<FleetSizeCurve> {
    if max_count == 0 {
        return Err(SimError::InvalidInput(
            "fleet sweep needs at least one chargepoint".into(),
        ));
    }
    let largest = SimulationParameters {
        chargepoints: vec![ChargepointTypeConfig::new(max_count, power_kw)],
        ..params.clone()
    };
    largest.validate()?;

    let points = (1..=max_count)
        .into_par_iter()
        .map(|count| -> Result<FleetSizePoint> {
            let fleet = SimulationParameters {
                chargepoints: vec![ChargepointTypeConfig::new(count, power_kw)],
                ..largest.clone()
            };
            let theoretical = fleet.max_theoretical_power_kw();
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(u64::from(count)));
            let run = Engine::new(fleet)?.run(&mut rng)?;
            let max_power_kw = run.power_series.peak_kw();
            Ok(FleetSizePoint {
                chargepoint_count: count,
                max_power_kw,
                max_theoretical_power_kw: theoretical,
                concurrency_factor: max_power_kw / theoretical,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(max_count, power_kw, "fleet size sweep finished");
    Ok(FleetSizeCurve { power_kw, points })
}

impl fmt::Display for FleetSizeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- Concurrency Factor by Fleet Size ({} kW each) ---",
            self.power_kw
        )?;
        write!(f, "{:>6}  {:>9}  {:>9}  {:>6}", "count", "peak kW", "max kW", "factor")?;
        for point in &self.points {
            write!(
                f,
                "\n{:>6}  {:>9.1}  {:>9.1}  {:>6.2}",
                point.chargepoint_count,
                point.max_power_kw,
                point.max_theoretical_power_kw,
                point.concurrency_factor
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ConcurrencyDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Concurrency Factor over {} Runs ---", self.runs)?;
        writeln!(
            f,
            "mean {:.3}  min {:.3}  max {:.3}",
            self.mean, self.min, self.max
        )?;
        for (i, bucket) in self.buckets.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:>5.2}  {:>6}  {:>6.2}%",
                bucket.concurrency_factor, bucket.count, bucket.percentage
            )?;
        }
        Ok(())
    }
}
