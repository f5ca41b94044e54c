//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use ev_load_sim::sim::distributions::ConstantSource;
use ev_load_sim::sim::types::{ChargepointTypeConfig, SimulationParameters};

/// Default station (5×11 kW, 3×22 kW, 1×50 kW) shortened to `days`.
pub fn default_params(days: u32) -> SimulationParameters {
    SimulationParameters {
        days,
        ..SimulationParameters::default()
    }
}

/// `count` identical chargepoints rated at `power_kw`, one day at 15-minute intervals.
pub fn single_type_params(count: u32, power_kw: f64) -> SimulationParameters {
    SimulationParameters {
        chargepoints: vec![ChargepointTypeConfig::new(count, power_kw)],
        days: 1,
        ..SimulationParameters::default()
    }
}

/// A source whose draws never fall below any arrival probability.
pub fn never_arrives() -> ConstantSource {
    ConstantSource(0.999_999)
}
