//! Simulation engine that advances every chargepoint through discrete intervals.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

use super::chargepoint::ChargepointState;
use super::clock::{IntervalClock, Tick};
use super::distributions::{UniformSource, sample_arrival, sample_charging_energy_kwh};
use super::types::SimulationParameters;

/// Aggregate station power draw per interval (kW).
///
/// Produced once by [`Engine::run`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PowerSeries(Vec<f64>);

impl PowerSeries {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest sample, or 0.0 for an empty series.
    pub fn peak_kw(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }
}

impl From<Vec<f64>> for PowerSeries {
    fn from(samples: Vec<f64>) -> Self {
        Self(samples)
    }
}

/// Raw output of one run, before any reduction.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    /// Station power per interval.
    pub power_series: PowerSeries,
    /// Final state of every chargepoint instance, in configuration order.
    pub chargepoints: Vec<ChargepointState>,
    /// Energy delivered across all chargepoints (kWh).
    pub total_energy_kwh: f64,
}

/// Simulation engine owning the parameters and the chargepoint arena.
///
/// The arena is a flat `Vec` built from the configuration rows; every interval
/// mutates it in place and the engine is consumed by [`Engine::run`].
pub struct Engine {
    params: SimulationParameters,
    chargepoints: Vec<ChargepointState>,
    energy_delivered_kwh: f64,
}

impl Engine {
    /// Creates an engine with every chargepoint idle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SimError::InvalidInput`] if `params` fail validation.
    pub fn new(params: SimulationParameters) -> Result<Self> {
        params.validate()?;
        let chargepoints = ChargepointState::expand(&params.chargepoints);
        Ok(Self {
            params,
            chargepoints,
            energy_delivered_kwh: 0.0,
        })
    }

    /// Executes one interval and returns the station power it recorded.
    ///
    /// Chargepoints are visited in arena order. A charging chargepoint delivers
    /// energy; an idle one samples an arrival. The recorded power counts every
    /// chargepoint still owing energy after the update at its full rating.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::error::SimError::InvalidInput`] for an out-of-range hour.
    pub fn step(&mut self, tick: Tick, rng: &mut impl UniformSource) -> Result<f64> {
        let interval_hours = self.params.interval_hours();
        let interval_minutes = self.params.interval_minutes;
        let arrival_factor = self.params.arrival_factor();
        let consumption = self.params.consumption_kwh_per_100km;
        let hour = tick.hour as i32;

        for cp in &mut self.chargepoints {
            if cp.is_charging() {
                self.energy_delivered_kwh += cp.deliver(interval_hours);
            } else if sample_arrival(hour, interval_minutes, arrival_factor, rng)? {
                let energy_needed = sample_charging_energy_kwh(consumption, rng);
                if energy_needed > 0.0 {
                    cp.plug_in(energy_needed);
                }
            }
        }

        Ok(self
            .chargepoints
            .iter()
            .map(ChargepointState::power_draw_kw)
            .sum())
    }

    /// Executes every interval and hands back the series and final states.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Engine::step`].
    pub fn run(mut self, rng: &mut impl UniformSource) -> Result<SimulationRun> {
        let total = self.params.total_intervals();
        debug!(
            instances = self.chargepoints.len(),
            total_intervals = total,
            max_theoretical_power_kw = self.params.max_theoretical_power_kw(),
            "starting simulation"
        );

        let mut series = Vec::with_capacity(total);
        let mut clock = IntervalClock::new(total, self.params.interval_minutes);
        while let Some(tick) = clock.tick() {
            series.push(self.step(tick, rng)?);
        }

        Ok(SimulationRun {
            power_series: PowerSeries::from(series),
            chargepoints: self.chargepoints,
            total_energy_kwh: self.energy_delivered_kwh,
        })
    }

    /// Returns the current chargepoint arena.
    pub fn chargepoints(&self) -> &[ChargepointState] {
        &self.chargepoints
    }
}
