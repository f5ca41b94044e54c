//! Per-instance runtime state of a physical chargepoint.

use super::types::ChargepointTypeConfig;

/// Mutable record of one physical chargepoint during a run.
///
/// A configuration row with `count = N` expands into `N` of these, all sharing
/// the row's `power_kw`. The engine owns them in a flat arena indexed
/// `0..N-1`; only their reductions outlive the run.
///
/// # Examples
///
/// ```
/// use ev_load_sim::sim::chargepoint::ChargepointState;
///
/// let mut cp = ChargepointState::new(11.0);
/// cp.plug_in(4.0);
/// assert_eq!(cp.deliver(0.25), 2.75);
/// assert!(cp.is_charging());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChargepointState {
    /// Rated power (kW).
    pub power_kw: f64,
    /// Energy still owed to the connected vehicle (kWh, never negative).
    pub remaining_demand_kwh: f64,
    /// Intervals spent delivering energy.
    pub active_intervals: u64,
    /// Vehicles that arrived with a non-zero demand.
    pub charging_events: u64,
    /// Energy delivered over the whole run (kWh).
    pub total_energy_delivered_kwh: f64,
}

impl ChargepointState {
    pub fn new(power_kw: f64) -> Self {
        Self {
            power_kw,
            remaining_demand_kwh: 0.0,
            active_intervals: 0,
            charging_events: 0,
            total_energy_delivered_kwh: 0.0,
        }
    }

    /// Expands configuration rows into one state record per physical chargepoint,
    /// preserving row order.
    pub fn expand(rows: &[ChargepointTypeConfig]) -> Vec<Self> {
        rows.iter()
            .flat_map(|row| (0..row.count).map(|_| Self::new(row.power_kw)))
            .collect()
    }

    /// Whether a vehicle with outstanding demand is connected.
    pub fn is_charging(&self) -> bool {
        self.remaining_demand_kwh > 0.0
    }

    /// Connects a vehicle requesting `energy_kwh` and counts the event.
    pub fn plug_in(&mut self, energy_kwh: f64) {
        self.remaining_demand_kwh = energy_kwh;
        self.charging_events += 1;
    }

    /// Charges for one interval of `interval_hours` at full rating.
    ///
    /// Delivers at most the remaining demand and returns the energy actually
    /// delivered (kWh). Does nothing when no demand is outstanding.
    pub fn deliver(&mut self, interval_hours: f64) -> f64 {
        if !self.is_charging() {
            return 0.0;
        }

        let energy = self.remaining_demand_kwh.min(self.power_kw * interval_hours);
        self.remaining_demand_kwh = (self.remaining_demand_kwh - energy).max(0.0);
        self.total_energy_delivered_kwh += energy;
        self.active_intervals += 1;
        energy
    }

    /// Power drawn in the current interval: full rating while charging.
    pub fn power_draw_kw(&self) -> f64 {
        if self.is_charging() { self.power_kw } else { 0.0 }
    }
}
