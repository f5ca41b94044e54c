//! Persistence seam for parameter sets and their simulation results.
//!
//! Identical parameter sets (see [`SimulationParameters::matches`]) share one
//! stored id, so repeated runs of the same station attach their results to a
//! single parameter record.

use serde::Serialize;
use tracing::debug;

use crate::sim::report::SimulationResult;
use crate::sim::types::SimulationParameters;

pub type ParameterId = u64;
pub type ResultId = u64;

/// A parameter set together with its store id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredParameters {
    pub id: ParameterId,
    pub parameters: SimulationParameters,
}

/// A saved result linked to the parameter set that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResult {
    pub id: ResultId,
    #[serde(rename = "simulationParameterId")]
    pub parameter_id: ParameterId,
    pub result: SimulationResult,
}

/// Storage for parameter sets and results.
pub trait ParameterStore {
    /// Id of a stored parameter set that matches `params`, if any.
    fn find_matching(&self, params: &SimulationParameters) -> Option<ParameterId>;

    /// Stores `params` unconditionally and returns the new id.
    fn insert_parameters(&mut self, params: SimulationParameters) -> ParameterId;

    /// Saves `result` under `parameter_id` and returns the stored record.
    fn save_result(&mut self, parameter_id: ParameterId, result: SimulationResult) -> StoredResult;

    /// All stored parameter sets, oldest first.
    fn parameters(&self) -> Vec<StoredParameters>;

    /// A stored parameter set by id.
    fn parameter_set(&self, id: ParameterId) -> Option<StoredParameters>;

    /// Every result saved under `parameter_id`, oldest first.
    fn results_for(&self, parameter_id: ParameterId) -> Vec<StoredResult>;

    /// A stored result by id.
    fn result(&self, id: ResultId) -> Option<StoredResult>;
}

/// Returns the id of a matching parameter set, inserting `params` if none exists.
///
/// The flag is `true` when a new record was created.
pub fn find_or_insert<S: ParameterStore + ?Sized>(
    store: &mut S,
    params: &SimulationParameters,
) -> (ParameterId, bool) {
    if let Some(id) = store.find_matching(params) {
        debug!(parameter_id = id, "reusing stored parameter set");
        return (id, false);
    }
    let id = store.insert_parameters(params.clone());
    debug!(parameter_id = id, "stored new parameter set");
    (id, true)
}

/// `Vec`-backed store; ids start at 1 and increase monotonically.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    parameters: Vec<StoredParameters>,
    results: Vec<StoredResult>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParameterStore for InMemoryStore {
    fn find_matching(&self, params: &SimulationParameters) -> Option<ParameterId> {
        self.parameters
            .iter()
            .find(|p| p.parameters.matches(params))
            .map(|p| p.id)
    }

    fn insert_parameters(&mut self, params: SimulationParameters) -> ParameterId {
        let id = self.parameters.len() as ParameterId + 1;
        self.parameters.push(StoredParameters {
            id,
            parameters: params,
        });
        id
    }

    fn save_result(&mut self, parameter_id: ParameterId, result: SimulationResult) -> StoredResult {
        let stored = StoredResult {
            id: self.results.len() as ResultId + 1,
            parameter_id,
            result,
        };
        self.results.push(stored.clone());
        stored
    }

    fn parameters(&self) -> Vec<StoredParameters> {
        self.parameters.clone()
    }

    fn parameter_set(&self, id: ParameterId) -> Option<StoredParameters> {
        self.parameters.iter().find(|p| p.id == id).cloned()
    }

    fn results_for(&self, parameter_id: ParameterId) -> Vec<StoredResult> {
        self.results
            .iter()
            .filter(|r| r.parameter_id == parameter_id)
            .cloned()
            .collect()
    }

    fn result(&self, id: ResultId) -> Option<StoredResult> {
        self.results.iter().find(|r| r.id == id).cloned()
    }
}
