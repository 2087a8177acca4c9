//! Production batch evaluator backed by a bounded tokio worker pool.

use crate::error::EnvError;
use crate::evaluator::{progress_step, BatchEvaluator};
use crate::model::SimulationModel;
use crate::types::{CaseOutput, ExperimentCase};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Evaluates experiments concurrently, at most `workers` at a time.
///
/// Every case becomes a tokio task that first acquires a semaphore
/// permit, so with a `CommandModel` at most `workers` model processes
/// are alive at once. The first failing case aborts the batch: the
/// remaining tasks are cancelled when the `JoinSet` is dropped.
pub struct PoolEvaluator {
    /// Maximum concurrent model runs
    workers: usize,
}

impl PoolEvaluator {
    /// Creates a pool with a fixed number of workers (minimum 1).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Creates a pool sized to the machine's available parallelism.
    pub fn with_available_parallelism() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }
}

impl Default for PoolEvaluator {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}

#[async_trait]
impl BatchEvaluator for PoolEvaluator {
    async fn perform(
        &self,
        model: Arc<dyn SimulationModel>,
        cases: Vec<ExperimentCase>,
    ) -> Result<Vec<CaseOutput>, EnvError> {
        let total = cases.len();
        info!("performing {} experiments on {} workers", total, self.workers);

        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for case in cases {
            let permits = Arc::clone(&permits);
            let model = Arc::clone(&model);
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| EnvError::Worker(e.to_string()))?;

                debug!("experiment {} ({} / {}) started", case.id, case.scenario, case.policy);
                let outcomes = model
                    .evaluate(&case.inputs)
                    .await
                    .map_err(|e| EnvError::in_experiment(case.id, e))?;

                Ok::<_, EnvError>(CaseOutput {
                    experiment_id: case.id,
                    outcomes,
                })
            });
        }

        let step = progress_step(total);
        let mut outputs = Vec::with_capacity(total);

        while let Some(joined) = tasks.join_next().await {
            let output = joined.map_err(|e| EnvError::Worker(e.to_string()))??;
            outputs.push(output);

            if outputs.len() % step == 0 {
                info!("{} cases completed", outputs.len());
            }
        }

        outputs.sort_by_key(|o| o.experiment_id);
        info!("experiments finished");
        Ok(outputs)
    }

    fn workers(&self) -> usize {
        self.workers
    }
}
