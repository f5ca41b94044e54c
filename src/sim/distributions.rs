//! Arrival and charging-demand distributions.
//!
//! Arrival likelihoods and charging distances are empirical step functions.
//! All sampling goes through [`UniformSource`] so a run can be driven by a
//! seeded generator or by a scripted stub in tests.

use rand::Rng;
use rand::rngs::{StdRng, ThreadRng};

use crate::error::{Result, SimError};

/// Charging distance buckets (km).
pub const KM_BUCKETS: [f64; 9] = [0.0, 5.0, 10.0, 20.0, 30.0, 50.0, 100.0, 200.0, 300.0];

/// Observed weight of each entry in [`KM_BUCKETS`].
pub const KM_WEIGHTS: [f64; 9] = [
    0.3431, 0.049, 0.098, 0.1176, 0.0882, 0.1176, 0.1078, 0.049, 0.0294,
];

/// Source of uniform random reals in `[0, 1)`.
pub trait UniformSource {
    /// Draws the next uniform real in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for StdRng {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl UniformSource for ThreadRng {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Source that returns the same value on every draw.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSource(pub f64);

impl UniformSource for ConstantSource {
    fn next_uniform(&mut self) -> f64 {
        self.0
    }
}

/// Source that replays a fixed list of values, wrapping around at the end.
///
/// An empty script behaves like `ConstantSource(0.0)`.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    pos: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.pos
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value
    }
}

/// Probability that a vehicle arrives at one chargepoint within one hour.
///
/// # Errors
///
/// Returns [`SimError::InvalidInput`] if `hour` is outside `[0, 24)`.
pub fn arrival_probability(hour: i32) -> Result<f64> {
    match hour {
        0..=7 => Ok(0.0094),
        8..=9 => Ok(0.0283),
        10..=12 => Ok(0.0566),
        13..=15 => Ok(0.0755),
        16..=18 => Ok(0.1038),
        19..=21 => Ok(0.0472),
        22..=23 => Ok(0.0094),
        _ => Err(SimError::InvalidInput(format!(
            "hour {hour} outside [0, 24)"
        ))),
    }
}

/// Draws whether a vehicle arrives during one interval.
///
/// The hourly probability is scaled by the interval length and by
/// `arrival_factor`. The product is not clamped: a factor large enough to
/// push it past 1.0 makes every draw succeed.
///
/// # Errors
///
/// Returns [`SimError::InvalidInput`] if `hour` is outside `[0, 24)`.
pub fn sample_arrival(
    hour: i32,
    interval_minutes: u32,
    arrival_factor: f64,
    rng: &mut impl UniformSource,
) -> Result<bool> {
    let probability =
        arrival_probability(hour)? * (f64::from(interval_minutes) / 60.0) * arrival_factor;
    Ok(rng.next_uniform() < probability)
}

/// Picks one item with probability proportional to its weight.
///
/// Weights are renormalised by their sum, a cumulative table is built and a
/// single uniform draw selects the first bucket whose cumulative weight
/// exceeds it. Floating-point misses at the top end fall back to the last
/// item. Returns `None` for an empty item list.
pub fn weighted_choice<T: Copy>(
    items: &[T],
    weights: &[f64],
    rng: &mut impl UniformSource,
) -> Option<T> {
    let last = *items.last()?;
    let total: f64 = weights.iter().sum();

    let mut cumulative = 0.0;
    let r = rng.next_uniform();
    for (item, weight) in items.iter().zip(weights) {
        cumulative += weight / total;
        if r < cumulative {
            return Some(*item);
        }
    }
    Some(last)
}

/// Samples the distance (km) a newly arrived vehicle needs to recover.
pub fn sample_charging_needed_km(rng: &mut impl UniformSource) -> f64 {
    weighted_choice(&KM_BUCKETS, &KM_WEIGHTS, rng).unwrap_or_default()
}

/// Samples the energy (kWh) a newly arrived vehicle requests.
pub fn sample_charging_energy_kwh(
    consumption_kwh_per_100km: f64,
    rng: &mut impl UniformSource,
) -> f64 {
    sample_charging_needed_km(rng) / 100.0 * consumption_kwh_per_100km
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn arrival_probability_step_function() {
        assert_eq!(arrival_probability(0), Ok(0.0094));
        assert_eq!(arrival_probability(7), Ok(0.0094));
        assert_eq!(arrival_probability(8), Ok(0.0283));
        assert_eq!(arrival_probability(12), Ok(0.0566));
        assert_eq!(arrival_probability(13), Ok(0.0755));
        assert_eq!(arrival_probability(18), Ok(0.1038));
        assert_eq!(arrival_probability(21), Ok(0.0472));
        assert_eq!(arrival_probability(23), Ok(0.0094));
    }

    #[test]
    fn arrival_probability_rejects_out_of_range_hours() {
        assert!(matches!(
            arrival_probability(24),
            Err(SimError::InvalidInput(_))
        ));
        assert!(matches!(
            arrival_probability(-1),
            Err(SimError::InvalidInput(_))
        ));
    }

    #[test]
    fn km_weights_sum_to_one() {
        let total: f64 = KM_WEIGHTS.iter().sum();
        assert!((total - 1.0).abs() < 1e-3, "weights sum to {total}");
    }

    #[test]
    fn sample_arrival_scales_with_interval_and_factor() {
        // 0.1038 * 0.25 = 0.02595
        let mut below = ConstantSource(0.0259);
        let mut above = ConstantSource(0.0260);
        assert_eq!(sample_arrival(17, 15, 1.0, &mut below), Ok(true));
        assert_eq!(sample_arrival(17, 15, 1.0, &mut above), Ok(false));

        // doubling the factor moves the threshold to 0.0519
        assert_eq!(sample_arrival(17, 15, 2.0, &mut above), Ok(true));
    }

    #[test]
    fn sample_arrival_is_certain_when_probability_exceeds_one() {
        // 0.1038 * 1.0 * 20.0 > 1.0
        let mut rng = ConstantSource(0.999_999);
        assert_eq!(sample_arrival(17, 60, 20.0, &mut rng), Ok(true));
    }

    #[test]
    fn weighted_choice_walks_cumulative_table() {
        let items = [1, 2, 3];
        let weights = [0.2, 0.3, 0.5];
        assert_eq!(weighted_choice(&items, &weights, &mut ConstantSource(0.0)), Some(1));
        assert_eq!(weighted_choice(&items, &weights, &mut ConstantSource(0.19)), Some(1));
        assert_eq!(weighted_choice(&items, &weights, &mut ConstantSource(0.2)), Some(2));
        assert_eq!(weighted_choice(&items, &weights, &mut ConstantSource(0.6)), Some(3));
    }

    #[test]
    fn weighted_choice_renormalises_weights() {
        let items = ['a', 'b'];
        let weights = [2.0, 2.0];
        assert_eq!(weighted_choice(&items, &weights, &mut ConstantSource(0.49)), Some('a'));
        assert_eq!(weighted_choice(&items, &weights, &mut ConstantSource(0.51)), Some('b'));
    }

    #[test]
    fn weighted_choice_falls_back_to_last_item() {
        let items = [10, 20];
        // cumulative tops out below 1.0
        let weights = [0.25, 0.25];
        assert_eq!(weighted_choice(&items, &weights, &mut ConstantSource(1.5)), Some(20));
        assert_eq!(weighted_choice::<i32>(&[], &[], &mut ConstantSource(0.5)), None);
    }

    #[test]
    fn charging_energy_scales_distance_by_consumption() {
        // 0.3431 + 0.049 + 0.098 = 0.4901, so 0.45 lands in the 10 km bucket
        let mut rng = ConstantSource(0.45);
        assert_eq!(sample_charging_needed_km(&mut rng), 10.0);
        assert!((sample_charging_energy_kwh(18.0, &mut rng) - 1.8).abs() < 1e-12);

        let mut rng = ConstantSource(0.1);
        assert_eq!(sample_charging_energy_kwh(18.0, &mut rng), 0.0);
    }

    #[test]
    fn sampled_distances_come_from_the_bucket_table() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let km = sample_charging_needed_km(&mut rng);
            assert!(KM_BUCKETS.contains(&km), "unexpected distance {km}");
        }
    }

    #[test]
    fn scripted_source_replays_and_wraps() {
        let mut src = ScriptedSource::new(vec![0.1, 0.9]);
        assert_eq!(src.next_uniform(), 0.1);
        assert_eq!(src.next_uniform(), 0.9);
        assert_eq!(src.next_uniform(), 0.1);
        assert_eq!(src.draws(), 3);
    }
}
