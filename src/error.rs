//! Plan-time configuration errors.
//!
//! These are raised while a statistic is being set up, before any node is
//! added to the pipeline. Execution failures stay `anyhow::Error`.

use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// No quantiles were requested.
    #[error("at least one quantile must be requested")]
    EmptyQuantiles,
    /// A quantile outside `[0, 1]`, or NaN.
    #[error("quantile {0} is outside [0, 1]")]
    QuantileOutOfRange(f64),
}
