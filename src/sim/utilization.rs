//! Chargepoint utilization figures derived from final runtime states.

use serde::Serialize;

use super::chargepoint::ChargepointState;

/// Fixed month length used for monthly averages (days).
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Usage figures of one chargepoint (or one power rating after grouping).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargepointUtilization {
    /// Rated power (kW).
    pub power_kw: f64,
    /// Share of intervals spent delivering energy (%).
    pub utilization: f64,
    pub avg_daily_events: f64,
    pub avg_daily_energy_kwh: f64,
    pub avg_monthly_events: f64,
    pub avg_monthly_energy_kwh: f64,
}

/// Reduces final chargepoint states into one utilization entry per instance.
///
/// Entries keep the input order; nothing is grouped. A zero `total_intervals`
/// or `total_days` yields zero for the figures that divide by it.
pub fn summarize(
    instances: &[ChargepointState],
    total_intervals: usize,
    total_days: u32,
) -> Vec<ChargepointUtilization> {
    let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
    let intervals = total_intervals as f64;
    let days = f64::from(total_days);

    instances
        .iter()
        .map(|cp| {
            let avg_daily_events = ratio(cp.charging_events as f64, days);
            let avg_daily_energy_kwh = ratio(cp.total_energy_delivered_kwh, days);
            ChargepointUtilization {
                power_kw: cp.power_kw,
                utilization: 100.0 * ratio(cp.active_intervals as f64, intervals),
                avg_daily_events,
                avg_daily_energy_kwh,
                avg_monthly_events: avg_daily_events * DAYS_PER_MONTH,
                avg_monthly_energy_kwh: avg_daily_energy_kwh * DAYS_PER_MONTH,
            }
        })
        .collect()
}

/// Collapses per-instance entries into one entry per power rating.
///
/// Ratings come out in ascending order; every figure is the mean over the
/// instances sharing that rating.
pub fn group_by_power(entries: &[ChargepointUtilization]) -> Vec<ChargepointUtilization> {
    let mut sorted: Vec<&ChargepointUtilization> = entries.iter().collect();
    sorted.sort_by(|a, b| a.power_kw.total_cmp(&b.power_kw));

    sorted
        .chunk_by(|a, b| a.power_kw == b.power_kw)
        .map(|group| {
            let n = group.len() as f64;
            let mean = |f: fn(&ChargepointUtilization) -> f64| {
                group.iter().map(|e| f(e)).sum::<f64>() / n
            };
            ChargepointUtilization {
                power_kw: group[0].power_kw,
                utilization: mean(|e| e.utilization),
                avg_daily_events: mean(|e| e.avg_daily_events),
                avg_daily_energy_kwh: mean(|e| e.avg_daily_energy_kwh),
                avg_monthly_events: mean(|e| e.avg_monthly_events),
                avg_monthly_energy_kwh: mean(|e| e.avg_monthly_energy_kwh),
            }
        })
        .collect()
}

/// Station-wide headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSummary {
    /// Mean utilization across instances (%).
    pub average_utilization: f64,
    /// Charging sessions per day across the whole station.
    pub total_daily_events: f64,
    /// Energy per day across the whole station (kWh).
    pub total_daily_energy_kwh: f64,
}

impl StationSummary {
    pub fn from_utilizations(entries: &[ChargepointUtilization]) -> Self {
        let average_utilization = if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|e| e.utilization).sum::<f64>() / entries.len() as f64
        };
        Self {
            average_utilization,
            total_daily_events: entries.iter().map(|e| e.avg_daily_events).sum(),
            total_daily_energy_kwh: entries.iter().map(|e| e.avg_daily_energy_kwh).sum(),
        }
    }
}
