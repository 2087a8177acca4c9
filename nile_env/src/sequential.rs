//! In-order batch evaluator.

use crate::error::EnvError;
use crate::evaluator::{progress_step, BatchEvaluator};
use crate::model::SimulationModel;
use crate::types::{CaseOutput, ExperimentCase};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Evaluates experiments one after another in id order.
///
/// Useful when debugging a model: failures surface for the lowest
/// failing id and model logs are not interleaved.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialEvaluator;

impl SequentialEvaluator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BatchEvaluator for SequentialEvaluator {
    async fn perform(
        &self,
        model: Arc<dyn SimulationModel>,
        mut cases: Vec<ExperimentCase>,
    ) -> Result<Vec<CaseOutput>, EnvError> {
        let total = cases.len();
        info!("performing {} experiments sequentially", total);

        cases.sort_by_key(|c| c.id);
        let step = progress_step(total);
        let mut outputs = Vec::with_capacity(total);

        for case in cases {
            let outcomes = model
                .evaluate(&case.inputs)
                .await
                .map_err(|e| EnvError::in_experiment(case.id, e))?;
            outputs.push(CaseOutput {
                experiment_id: case.id,
                outcomes,
            });

            if outputs.len() % step == 0 {
                info!("{} cases completed", outputs.len());
            }
        }

        info!("experiments finished");
        Ok(outputs)
    }

    fn workers(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamValues;
    use std::sync::Mutex;

    struct RecordingModel {
        seen: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl SimulationModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn lever_count(&self) -> Result<usize, EnvError> {
            Ok(0)
        }

        async fn evaluate(&self, inputs: &ParamValues) -> Result<ParamValues, EnvError> {
            let x = inputs.get("x").unwrap_or_default();
            self.seen.lock().unwrap().push(x);
            if x < 0.0 {
                return Err(EnvError::protocol("negative input"));
            }
            Ok(ParamValues::new().with("y", x + 1.0))
        }
    }

    fn case(id: usize, x: f64) -> ExperimentCase {
        ExperimentCase {
            id,
            scenario: "Baseline".to_string(),
            policy: "Policy0".to_string(),
            model: "recording".to_string(),
            inputs: ParamValues::new().with("x", x),
        }
    }

    #[tokio::test]
    async fn test_sequential_runs_in_id_order() {
        let model = Arc::new(RecordingModel { seen: Mutex::new(Vec::new()) });
        let cases = vec![case(2, 20.0), case(0, 0.0), case(1, 10.0)];

        let outputs = SequentialEvaluator::new()
            .perform(model.clone(), cases)
            .await
            .unwrap();

        assert_eq!(*model.seen.lock().unwrap(), vec![0.0, 10.0, 20.0]);
        let ids: Vec<usize> = outputs.iter().map(|o| o.experiment_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(outputs[2].outcomes.get("y"), Some(21.0));
    }

    #[tokio::test]
    async fn test_sequential_stops_at_failure() {
        let model = Arc::new(RecordingModel { seen: Mutex::new(Vec::new()) });
        let cases = vec![case(0, 1.0), case(1, -1.0), case(2, 2.0)];

        let err = SequentialEvaluator::new().perform(model.clone(), cases).await.unwrap_err();

        assert!(matches!(err, EnvError::ExperimentFailed { id: 1, .. }));
        // The case after the failure never ran
        assert_eq!(model.seen.lock().unwrap().len(), 2);
    }
}
