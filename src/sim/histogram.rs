//! Power distribution histogram over a power series.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Default number of power bins.
pub const DEFAULT_BINS: usize = 20;

/// One power bin, covering `(max_power_kw - bin_size, max_power_kw]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerHistogramDataPoint {
    /// Upper edge of the bin (kW).
    pub max_power_kw: f64,
    /// Samples that fell into the bin.
    pub count: usize,
    /// Share of all samples (%).
    pub percentage: f64,
}

/// Which peak sizes the histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramScale {
    /// Bins span `0..=max_theoretical_power_kw`.
    #[default]
    Theoretical,
    /// Bins span `0..=` the series' own peak.
    Observed,
}

impl HistogramScale {
    /// Picks the bin span for this scale.
    pub fn max_power_kw(self, theoretical_kw: f64, observed_kw: f64) -> f64 {
        match self {
            Self::Theoretical => theoretical_kw,
            Self::Observed => observed_kw,
        }
    }
}

/// Counts samples into `bins` equal-width power bins spanning `0..=max_power_kw`.
///
/// A sample equal to `max_power_kw` (or above it) lands in the last bin.
/// Percentages are relative to the series length; an empty series yields
/// zero counts and zero percentages.
///
/// # Errors
///
/// Returns [`SimError::DegenerateInput`] if `max_power_kw` is not a positive
/// finite number or `bins` is zero.
pub fn power_histogram(
    series: &[f64],
    max_power_kw: f64,
    bins: usize,
) -> Result<Vec<PowerHistogramDataPoint>> {
    if bins == 0 {
        return Err(SimError::DegenerateInput(
            "histogram needs at least one bin".into(),
        ));
    }
    if !(max_power_kw.is_finite() && max_power_kw > 0.0) {
        return Err(SimError::DegenerateInput(format!(
            "cannot bin power series with max power {max_power_kw} kW"
        )));
    }

    let bin_size = max_power_kw / bins as f64;
    let mut counts = vec![0_usize; bins];
    for &sample in series {
        let idx = ((sample / bin_size).floor().max(0.0) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let n = series.len();
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| PowerHistogramDataPoint {
            max_power_kw: (i + 1) as f64 * bin_size,
            count,
            percentage: if n > 0 {
                100.0 * count as f64 / n as f64
            } else {
                0.0
            },
        })
        .collect())
}
