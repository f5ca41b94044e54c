//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::Result as SimResult;
use crate::sim::histogram::{DEFAULT_BINS, HistogramScale};
use crate::sim::report::HistogramOptions;
use crate::sim::types::{
    ChargepointTypeConfig, MAX_CHARGEPOINT_INSTANCES, MAX_TOTAL_INTERVALS, MINUTES_PER_DAY,
    SimulationParameters,
};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the default station. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::default_station`]
/// for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation horizon and demand parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Power histogram layout.
    #[serde(default)]
    pub histogram: HistogramConfig,
    /// Chargepoint fleet, one row per power rating.
    #[serde(default = "default_chargepoints")]
    pub chargepoints: Vec<ChargepointConfig>,
}

/// Simulation horizon and demand parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of days to simulate (must be > 0).
    pub days: u32,
    /// Interval length in minutes (must divide 1440).
    pub interval_minutes: u32,
    /// Vehicle consumption (kWh per 100 km, must be > 0).
    pub consumption_kwh_per_100km: f64,
    /// Arrival probability scaling in percent (100 = unscaled).
    pub arrival_probability_multiplier: f64,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let params = SimulationParameters::default();
        Self {
            days: params.days,
            interval_minutes: params.interval_minutes,
            consumption_kwh_per_100km: params.consumption_kwh_per_100km,
            arrival_probability_multiplier: params.arrival_probability_multiplier,
            seed: 42,
        }
    }
}

/// Power histogram layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistogramConfig {
    /// Number of equal-width bins (must be > 0).
    pub bins: usize,
    /// `"theoretical"` or `"observed"` peak as the bin span.
    pub scale: HistogramScale,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            scale: HistogramScale::Theoretical,
        }
    }
}

/// One `[[chargepoints]]` row.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChargepointConfig {
    /// Number of identical chargepoints (must be > 0).
    pub count: u32,
    /// Rated power of each chargepoint (kW, must be > 0).
    pub power_kw: f64,
}

fn default_chargepoints() -> Vec<ChargepointConfig> {
    SimulationParameters::default()
        .chargepoints
        .iter()
        .map(|cp| ChargepointConfig {
            count: cp.count,
            power_kw: cp.power_kw,
        })
        .collect()
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.interval_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the default station: 5×11 kW, 3×22 kW and 1×50 kW over a year.
    pub fn default_station() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            histogram: HistogramConfig::default(),
            chargepoints: default_chargepoints(),
        }
    }

    /// Returns the small-depot preset: four 11 kW wallboxes over one month.
    pub fn small_depot() -> Self {
        Self {
            simulation: SimulationConfig {
                days: 30,
                ..SimulationConfig::default()
            },
            histogram: HistogramConfig::default(),
            chargepoints: vec![ChargepointConfig {
                count: 4,
                power_kw: 11.0,
            }],
        }
    }

    /// Returns the busy-hub preset: mixed AC/DC fleet with 1.5× arrivals over a quarter.
    pub fn busy_hub() -> Self {
        Self {
            simulation: SimulationConfig {
                days: 90,
                arrival_probability_multiplier: 150.0,
                ..SimulationConfig::default()
            },
            histogram: HistogramConfig::default(),
            chargepoints: vec![
                ChargepointConfig {
                    count: 10,
                    power_kw: 22.0,
                },
                ChargepointConfig {
                    count: 4,
                    power_kw: 50.0,
                },
                ChargepointConfig {
                    count: 2,
                    power_kw: 150.0,
                },
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "small_depot", "busy_hub"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default_station()),
            "small_depot" => Ok(Self::small_depot()),
            "busy_hub" => Ok(Self::busy_hub()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if s.interval_minutes == 0 || MINUTES_PER_DAY % s.interval_minutes != 0 {
            errors.push(ConfigError::new(
                "simulation.interval_minutes",
                format!("must divide {MINUTES_PER_DAY}, got {}", s.interval_minutes),
            ));
        } else {
            let intervals =
                (u64::from(s.days) * u64::from(MINUTES_PER_DAY)).div_ceil(u64::from(s.interval_minutes));
            if intervals > MAX_TOTAL_INTERVALS {
                errors.push(ConfigError::new(
                    "simulation.days",
                    format!("spans {intervals} intervals, at most {MAX_TOTAL_INTERVALS} allowed"),
                ));
            }
        }
        if !(s.consumption_kwh_per_100km.is_finite() && s.consumption_kwh_per_100km > 0.0) {
            errors.push(ConfigError::new(
                "simulation.consumption_kwh_per_100km",
                "must be > 0",
            ));
        }
        if !(s.arrival_probability_multiplier.is_finite() && s.arrival_probability_multiplier >= 0.0)
        {
            errors.push(ConfigError::new(
                "simulation.arrival_probability_multiplier",
                "must be >= 0",
            ));
        }

        if self.histogram.bins == 0 {
            errors.push(ConfigError::new("histogram.bins", "must be > 0"));
        }

        if self.chargepoints.is_empty() {
            errors.push(ConfigError::new(
                "chargepoints",
                "at least one chargepoint row is required",
            ));
        }
        for (i, cp) in self.chargepoints.iter().enumerate() {
            if cp.count == 0 {
                errors.push(ConfigError::new(
                    format!("chargepoints[{i}].count"),
                    "must be > 0",
                ));
            }
            if !(cp.power_kw.is_finite() && cp.power_kw > 0.0) {
                errors.push(ConfigError::new(
                    format!("chargepoints[{i}].power_kw"),
                    "must be > 0",
                ));
            }
        }
        let instances: u64 = self.chargepoints.iter().map(|cp| u64::from(cp.count)).sum();
        if instances > MAX_CHARGEPOINT_INSTANCES {
            errors.push(ConfigError::new(
                "chargepoints",
                format!("{instances} chargepoints, at most {MAX_CHARGEPOINT_INSTANCES} allowed"),
            ));
        }

        errors
    }

    /// Builds engine parameters from this scenario.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SimError::InvalidInput`] if the resulting
    /// parameters fail validation.
    pub fn to_parameters(&self) -> SimResult<SimulationParameters> {
        let s = &self.simulation;
        let params = SimulationParameters {
            chargepoints: self
                .chargepoints
                .iter()
                .map(|cp| ChargepointTypeConfig::new(cp.count, cp.power_kw))
                .collect(),
            consumption_kwh_per_100km: s.consumption_kwh_per_100km,
            days: s.days,
            interval_minutes: s.interval_minutes,
            arrival_probability_multiplier: s.arrival_probability_multiplier,
        };
        params.validate()?;
        Ok(params)
    }

    /// Histogram options for the report.
    pub fn histogram_options(&self) -> HistogramOptions {
        HistogramOptions {
            bins: self.histogram.bins,
            scale: self.histogram.scale,
        }
    }
}
