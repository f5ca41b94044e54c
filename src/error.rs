//! Error type shared by the simulation core.

use thiserror::Error;

/// Validation failures raised by the simulation core.
///
/// All variants are local and deterministic; none of them is worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Hour outside `[0, 24)` or structurally invalid simulation parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Daily aggregation requested on a power series with no samples.
    #[error("cannot aggregate an empty power series")]
    EmptySeries,

    /// Histogram binning requested with a zero (or non-finite) bin width.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
