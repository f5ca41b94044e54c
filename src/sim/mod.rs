/// Per-instance chargepoint runtime state.
pub mod chargepoint;
/// Interval clock for timestep management.
pub mod clock;
pub mod daily;
/// Arrival and charging-demand sampling.
pub mod distributions;
pub mod engine;
pub mod histogram;
pub mod report;
/// Parallel multi-seed concurrency sweeps.
pub mod sweep;
pub mod types;
pub mod utilization;

pub use engine::{Engine, PowerSeries, SimulationRun};
pub use report::{HistogramOptions, SimulationResult, run_simulation, run_simulation_with, simulate};
pub use types::{ChargepointTypeConfig, SimulationParameters};
