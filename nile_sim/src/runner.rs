//! Re-simulation runner - replays stored policies under the fixed scenarios.

use crate::error::SimError;
use crate::exporter::{write_results, OutputPaths, BASELINE_RESULTS_FILE};
use crate::scenarios::ScenarioId;

use nile_core::{
    experiment_design, load_policies, nile_problem, CoreError, ExperimentTable, LeverColumns,
    OutcomeTable, Scenario,
};
use nile_env::{BatchEvaluator, CaseOutput, SimulationModel};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Results from a completed re-simulation.
#[derive(Debug, Clone)]
pub struct ResimulationResult {
    /// Model that was run
    pub model: String,

    /// Number of scenarios evaluated
    pub scenario_count: usize,

    /// Number of policies evaluated
    pub policy_count: usize,

    /// Inputs used per experiment
    pub experiments: ExperimentTable,

    /// Outcomes produced per experiment
    pub outcomes: OutcomeTable,

    /// Wall-clock time spent inside the evaluator
    pub elapsed: Duration,

    /// Files written
    pub paths: OutputPaths,
}

/// Runs the re-simulation pipeline.
///
/// Load policies, cross them with the selected scenarios, evaluate every
/// pair, write the results. Any failure aborts the run before anything is
/// written.
pub struct ResimulationRunner {
    /// Directory holding the baseline results and receiving all outputs
    output_dir: PathBuf,

    /// Column slice holding lever values in the baseline results
    lever_columns: LeverColumns,

    /// Scenarios to evaluate
    scenarios: Vec<ScenarioId>,
}

impl ResimulationRunner {
    /// Creates a runner over `output_dir` with all five scenarios.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            lever_columns: LeverColumns::default(),
            scenarios: ScenarioId::all(),
        }
    }

    /// Sets the lever column slice.
    pub fn with_lever_columns(mut self, columns: LeverColumns) -> Self {
        self.lever_columns = columns;
        self
    }

    /// Restricts the run to a subset of scenarios.
    pub fn with_scenarios(mut self, scenarios: Vec<ScenarioId>) -> Self {
        self.scenarios = scenarios;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the baseline results table.
    pub fn baseline_results_path(&self) -> PathBuf {
        self.output_dir.join(BASELINE_RESULTS_FILE)
    }

    /// Runs every (scenario, policy) pair through `evaluator` and writes
    /// the results.
    pub async fn run(
        &self,
        model: Arc<dyn SimulationModel>,
        evaluator: &dyn BatchEvaluator,
    ) -> Result<ResimulationResult, SimError> {
        if !self.output_dir.is_dir() {
            return Err(CoreError::MissingOutputDir(self.output_dir.clone()).into());
        }

        let lever_count = model.lever_count().await?;
        let spec = nile_problem(model.name(), lever_count);
        info!(
            "model {}: {} uncertainties, {} levers, {} outcomes",
            spec.name,
            spec.uncertainties.len(),
            spec.levers.len(),
            spec.outcomes.len()
        );
        if lever_count != self.lever_columns.count {
            warn!(
                "model declares {} levers but the lever slice takes {} columns",
                lever_count, self.lever_columns.count
            );
        }

        let scenarios: Vec<Scenario> = self.scenarios.iter().map(|s| s.scenario()).collect();
        let policies = load_policies(&self.baseline_results_path(), self.lever_columns)?;

        let cases = experiment_design(&spec, &scenarios, &policies)?;
        let experiments = ExperimentTable::from_cases(&spec, &cases)?;
        let expected: Vec<usize> = cases.iter().map(|case| case.id).collect();

        info!(
            "evaluating {} scenarios x {} policies with {} workers",
            scenarios.len(),
            policies.len(),
            evaluator.workers()
        );
        let before = Instant::now();
        let outputs = evaluator.perform(Arc::clone(&model), cases).await?;
        let elapsed = before.elapsed();

        check_alignment(&expected, &outputs)?;
        let outcomes = OutcomeTable::from_outputs(&spec, &outputs)?;

        let paths = OutputPaths::in_dir(&self.output_dir);
        write_results(
            &paths,
            &experiments,
            &outcomes,
            elapsed,
            scenarios.len(),
            policies.len(),
        )?;

        Ok(ResimulationResult {
            model: spec.name,
            scenario_count: scenarios.len(),
            policy_count: policies.len(),
            experiments,
            outcomes,
            elapsed,
            paths,
        })
    }
}

/// Output `i` must belong to experiment `i`, or the outcome rows would be
/// tagged with another experiment's scenario and policy.
fn check_alignment(expected: &[usize], outputs: &[CaseOutput]) -> Result<(), CoreError> {
    if outputs.len() != expected.len() {
        return Err(CoreError::MalformedTable(format!(
            "evaluator returned {} outputs for {} experiments",
            outputs.len(),
            expected.len()
        )));
    }
    for (row, (id, output)) in expected.iter().zip(outputs).enumerate() {
        if output.experiment_id != *id {
            return Err(CoreError::MalformedTable(format!(
                "output row {} belongs to experiment {}, expected experiment {}",
                row, output.experiment_id, id
            )));
        }
    }
    Ok(())
}
