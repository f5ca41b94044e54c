//! Stochastic load simulation for EV charging stations.
//!
//! The core lives in [`sim`]: an interval engine draws arrivals and charging
//! demand per chargepoint and records the station's power draw, which is then
//! reduced into daily statistics, a power histogram and utilization figures.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
/// Simulation engine, sampling, and post-hoc reductions.
pub mod sim;
pub mod store;
