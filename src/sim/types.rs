//! Simulation inputs: chargepoint fleet configuration and run parameters.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Minutes in one simulated day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Longest accepted power series: ten years of one-minute intervals.
pub const MAX_TOTAL_INTERVALS: u64 = 3660 * MINUTES_PER_DAY as u64;

/// Most physical chargepoints a station may expand to.
pub const MAX_CHARGEPOINT_INSTANCES: u64 = 100_000;

/// One configuration row: `count` identical chargepoints rated at `power_kw`.
///
/// # Examples
///
/// ```
/// use ev_load_sim::sim::types::ChargepointTypeConfig;
///
/// let row = ChargepointTypeConfig::new(5, 11.0);
/// assert_eq!(row.total_power_kw(), 55.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargepointTypeConfig {
    /// Number of physical chargepoints of this rating.
    pub count: u32,
    /// Rated power of each chargepoint (kW).
    pub power_kw: f64,
}

impl ChargepointTypeConfig {
    pub fn new(count: u32, power_kw: f64) -> Self {
        Self { count, power_kw }
    }

    /// Combined rating of all chargepoints in this row (kW).
    pub fn total_power_kw(&self) -> f64 {
        f64::from(self.count) * self.power_kw
    }

    fn sort_key(&self, other: &Self) -> Ordering {
        self.power_kw
            .total_cmp(&other.power_kw)
            .then(self.count.cmp(&other.count))
    }
}

/// Order-independent equality of two chargepoint configuration lists.
///
/// Both lists are sorted on `(power_kw, count)` and compared element-wise, so
/// two lists are equal iff they hold the same multiset of rows.
pub fn parameters_equal(a: &[ChargepointTypeConfig], b: &[ChargepointTypeConfig]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut left = a.to_vec();
    let mut right = b.to_vec();
    left.sort_by(ChargepointTypeConfig::sort_key);
    right.sort_by(ChargepointTypeConfig::sort_key);

    left.iter()
        .zip(&right)
        .all(|(l, r)| l.count == r.count && l.power_kw == r.power_kw)
}

/// Complete input of one simulation run.
///
/// Field names serialize in camelCase so results keep the names used by the
/// hosting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Chargepoint fleet, grouped by power rating.
    pub chargepoints: Vec<ChargepointTypeConfig>,
    /// Vehicle energy consumption (kWh per 100 km).
    pub consumption_kwh_per_100km: f64,
    /// Number of simulated days.
    pub days: u32,
    /// Duration of one interval in minutes (must divide 1440).
    pub interval_minutes: u32,
    /// Arrival probability scaling as a percentage (100 = unscaled).
    pub arrival_probability_multiplier: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            chargepoints: vec![
                ChargepointTypeConfig::new(5, 11.0),
                ChargepointTypeConfig::new(3, 22.0),
                ChargepointTypeConfig::new(1, 50.0),
            ],
            consumption_kwh_per_100km: 18.0,
            days: 365,
            interval_minutes: 15,
            arrival_probability_multiplier: 100.0,
        }
    }
}

impl SimulationParameters {
    /// Checks the structural preconditions the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidInput`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.chargepoints.is_empty() {
            return Err(SimError::InvalidInput(
                "at least one chargepoint type is required".into(),
            ));
        }
        for (i, cp) in self.chargepoints.iter().enumerate() {
            if cp.count == 0 {
                return Err(SimError::InvalidInput(format!(
                    "chargepoints[{i}].count must be > 0"
                )));
            }
            if !(cp.power_kw.is_finite() && cp.power_kw > 0.0) {
                return Err(SimError::InvalidInput(format!(
                    "chargepoints[{i}].powerKw must be > 0, got {}",
                    cp.power_kw
                )));
            }
        }
        let instances: u64 = self.chargepoints.iter().map(|cp| u64::from(cp.count)).sum();
        if instances > MAX_CHARGEPOINT_INSTANCES {
            return Err(SimError::InvalidInput(format!(
                "at most {MAX_CHARGEPOINT_INSTANCES} chargepoints are supported, got {instances}"
            )));
        }
        if !(self.consumption_kwh_per_100km.is_finite() && self.consumption_kwh_per_100km > 0.0) {
            return Err(SimError::InvalidInput(format!(
                "consumptionKwhPer100km must be > 0, got {}",
                self.consumption_kwh_per_100km
            )));
        }
        if self.days == 0 {
            return Err(SimError::InvalidInput("days must be > 0".into()));
        }
        if self.interval_minutes == 0 || MINUTES_PER_DAY % self.interval_minutes != 0 {
            return Err(SimError::InvalidInput(format!(
                "intervalMinutes must divide {MINUTES_PER_DAY}, got {}",
                self.interval_minutes
            )));
        }
        let intervals = self.total_interval_count();
        if intervals > MAX_TOTAL_INTERVALS {
            return Err(SimError::InvalidInput(format!(
                "simulation spans {intervals} intervals, at most {MAX_TOTAL_INTERVALS} are supported"
            )));
        }
        if !(self.arrival_probability_multiplier.is_finite()
            && self.arrival_probability_multiplier >= 0.0)
        {
            return Err(SimError::InvalidInput(format!(
                "arrivalProbabilityMultiplier must be >= 0, got {}",
                self.arrival_probability_multiplier
            )));
        }
        Ok(())
    }

    /// Intervals in one day.
    pub fn intervals_per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.interval_minutes) as usize
    }

    /// Length of the power series: `ceil(days * 1440 / interval_minutes)`.
    pub fn total_intervals(&self) -> usize {
        self.total_interval_count() as usize
    }

    fn total_interval_count(&self) -> u64 {
        let minutes = u64::from(self.days) * u64::from(MINUTES_PER_DAY);
        minutes.div_ceil(u64::from(self.interval_minutes))
    }

    /// Duration of one interval in hours.
    pub fn interval_hours(&self) -> f64 {
        f64::from(self.interval_minutes) / 60.0
    }

    /// Arrival multiplier as a factor (100 % becomes 1.0).
    pub fn arrival_factor(&self) -> f64 {
        self.arrival_probability_multiplier / 100.0
    }

    /// Peak draw if every chargepoint charged at full rating at once (kW).
    pub fn max_theoretical_power_kw(&self) -> f64 {
        self.chargepoints
            .iter()
            .map(ChargepointTypeConfig::total_power_kw)
            .sum()
    }

    /// Number of physical chargepoints after expanding every row.
    pub fn instance_count(&self) -> usize {
        self.chargepoints.iter().map(|cp| cp.count as usize).sum()
    }

    /// Dedup predicate: scalar fields match exactly and the chargepoint lists
    /// are equal regardless of order.
    pub fn matches(&self, other: &Self) -> bool {
        self.consumption_kwh_per_100km == other.consumption_kwh_per_100km
            && self.days == other.days
            && self.interval_minutes == other.interval_minutes
            && self.arrival_probability_multiplier == other.arrival_probability_multiplier
            && parameters_equal(&self.chargepoints, &other.chargepoints)
    }
}

impl fmt::Display for SimulationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fleet = self
            .chargepoints
            .iter()
            .map(|cp| format!("{}x{} kW", cp.count, cp.power_kw))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "Chargepoints:          {fleet}")?;
        writeln!(
            f,
            "Consumption:           {} kWh/100km",
            self.consumption_kwh_per_100km
        )?;
        writeln!(f, "Duration:              {} days", self.days)?;
        writeln!(f, "Interval:              {} min", self.interval_minutes)?;
        write!(
            f,
            "Arrival multiplier:    {}%",
            self.arrival_probability_multiplier
        )
    }
}
