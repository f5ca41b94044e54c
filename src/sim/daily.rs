//! Daily energy statistics and the averaged intraday profile.

use serde::Serialize;

use crate::error::{Result, SimError};

use super::types::MINUTES_PER_DAY;

/// Average, maximum and minimum of a set of energy samples (kWh).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyStats {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

impl EnergyStats {
    /// Returns `None` for an empty sample set.
    fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let avg = samples.iter().sum::<f64>() / samples.len() as f64;
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        Some(Self { avg, max, min })
    }
}

/// Energy at one time-of-day position, across all simulated days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalDataPoint {
    /// Position within the day, `0..intervals_per_day`.
    pub interval: usize,
    /// `HH:MM` start time of the position.
    pub time: String,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

/// Per-day energy statistics plus the intraday profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDailyData {
    /// Statistics over the per-day energy totals (kWh/day).
    pub daily_stats: EnergyStats,
    /// One point per intraday position, ascending.
    pub interval_data_points: Vec<IntervalDataPoint>,
    /// Number of emitted interval points.
    pub total_intervals: usize,
    pub interval_minutes: u32,
}

/// Formats minutes since midnight as zero-padded `HH:MM`.
///
/// # Examples
///
/// ```
/// use ev_load_sim::sim::daily::time_label;
///
/// assert_eq!(time_label(0), "00:00");
/// assert_eq!(time_label(615), "10:15");
/// ```
pub fn time_label(minutes_from_midnight: u32) -> String {
    format!(
        "{:02}:{:02}",
        minutes_from_midnight / 60,
        minutes_from_midnight % 60
    )
}

/// Reduces a power series into daily energy statistics and an intraday profile.
///
/// Day `d` covers samples `d * intervals_per_day .. (d + 1) * intervals_per_day`;
/// the last day may be partial. Each sample contributes
/// `power * interval_minutes / 60` kWh.
///
/// # Errors
///
/// * [`SimError::EmptySeries`] if `series` has no samples.
/// * [`SimError::InvalidInput`] if `interval_minutes` does not divide a day.
pub fn aggregate_daily(series: &[f64], interval_minutes: u32) -> Result<AggregatedDailyData> {
    if interval_minutes == 0 || MINUTES_PER_DAY % interval_minutes != 0 {
        return Err(SimError::InvalidInput(format!(
            "interval of {interval_minutes} min does not divide a day"
        )));
    }
    if series.is_empty() {
        return Err(SimError::EmptySeries);
    }

    let intervals_per_day = (MINUTES_PER_DAY / interval_minutes) as usize;
    let interval_hours = f64::from(interval_minutes) / 60.0;

    let daily_energies: Vec<f64> = series
        .chunks(intervals_per_day)
        .map(|day| day.iter().map(|p| p * interval_hours).sum())
        .collect();
    let daily_stats = EnergyStats::from_samples(&daily_energies).ok_or(SimError::EmptySeries)?;

    let mut interval_data_points = Vec::with_capacity(intervals_per_day);
    for pos in 0..intervals_per_day {
        let samples: Vec<f64> = series
            .iter()
            .skip(pos)
            .step_by(intervals_per_day)
            .map(|p| p * interval_hours)
            .collect();
        let Some(stats) = EnergyStats::from_samples(&samples) else {
            continue;
        };
        interval_data_points.push(IntervalDataPoint {
            interval: pos,
            time: time_label(pos as u32 * interval_minutes),
            avg: stats.avg,
            max: stats.max,
            min: stats.min,
        });
    }

    Ok(AggregatedDailyData {
        daily_stats,
        total_intervals: interval_data_points.len(),
        interval_data_points,
        interval_minutes,
    })
}
