//! Batch evaluation service abstraction.

use async_trait::async_trait;
use std::sync::Arc;
use crate::error::EnvError;
use crate::model::SimulationModel;
use crate::types::{CaseOutput, ExperimentCase};

/// Runs a batch of experiments against a model.
///
/// The evaluator owns all parallelism, worker lifecycle and per-run
/// failure handling. Callers submit every case at once and block until
/// the whole batch has either completed or failed.
///
/// # Implementations
///
/// - **Production**: `PoolEvaluator` - bounded tokio worker pool
/// - **Debugging**: `SequentialEvaluator` - one case at a time, in order
///
/// # Ordering
///
/// Outputs are returned sorted by `experiment_id`, independent of the
/// order in which workers finished.
#[async_trait]
pub trait BatchEvaluator: Send + Sync {
    /// Evaluates every case and returns one output per case.
    ///
    /// # Returns
    /// * `Ok(outputs)` - one `CaseOutput` per input case, sorted by id
    /// * `Err(EnvError::ExperimentFailed)` - the first failing run; no
    ///   partial results are returned
    async fn perform(
        &self,
        model: Arc<dyn SimulationModel>,
        cases: Vec<ExperimentCase>,
    ) -> Result<Vec<CaseOutput>, EnvError>;
    
    /// Number of cases that may run concurrently.
    fn workers(&self) -> usize;
}

/// Interval (in completed cases) at which evaluators report progress.
pub(crate) fn progress_step(total: usize) -> usize {
    (total / 10).max(1)
}
