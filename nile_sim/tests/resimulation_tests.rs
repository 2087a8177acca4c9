//! End-to-end tests of the re-simulation pipeline with an in-process model.

use approx::assert_relative_eq;
use async_trait::async_trait;
use nile_core::problem::{lever_name, BLUE_NILE_MEAN_COEF, YEARLY_DEMAND_GROWTH_RATE};
use nile_core::{CoreError, ExperimentTable, LeverColumns, OutcomeTable};
use nile_env::{
    BatchEvaluator, CaseOutput, EnvError, ExperimentCase, ParamValues, PoolEvaluator,
    SequentialEvaluator, SimulationModel,
};
use nile_sim::exporter::{EXPERIMENTS_FILE, OUTCOMES_FILE, TIME_COUNTER_FILE};
use nile_sim::{ResimulationRunner, ScenarioId, SimError};
use proptest::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const OUTCOME_NAMES: [&str; 6] = [
    "egypt_irr",
    "egypt_90",
    "egypt_low_had",
    "sudan_irr",
    "sudan_90",
    "ethiopia_hydro",
];

/// Deterministic stand-in for the basin model.
struct ToyBasinModel {
    levers: usize,
    fail_for_policy_mean_above: Option<f64>,
}

impl ToyBasinModel {
    fn new(levers: usize) -> Self {
        Self {
            levers,
            fail_for_policy_mean_above: None,
        }
    }

    fn outcomes_for(&self, inputs: &ParamValues) -> ParamValues {
        let demand = inputs.get(YEARLY_DEMAND_GROWTH_RATE).unwrap_or_default();
        let blue = inputs.get(BLUE_NILE_MEAN_COEF).unwrap_or_default();
        let release = lever_mean(inputs, self.levers);

        ParamValues::new()
            .with("egypt_irr", demand * 100.0 * (1.5 - blue) * (1.0 - release))
            .with("egypt_90", demand * 10.0 / blue)
            .with("egypt_low_had", (1.0 - blue).max(0.0) + release / 4.0)
            .with("sudan_irr", demand * 50.0 * release)
            .with("sudan_90", demand * release / blue)
            .with("ethiopia_hydro", 15.0 * blue * (0.5 + release))
            .with("diagnostic_counter", 1.0)
    }
}

fn lever_mean(inputs: &ParamValues, levers: usize) -> f64 {
    if levers == 0 {
        return 0.0;
    }
    let sum: f64 = (0..levers)
        .map(|i| inputs.get(&lever_name(i)).unwrap_or_default())
        .sum();
    sum / levers as f64
}

#[async_trait]
impl SimulationModel for ToyBasinModel {
    fn name(&self) -> &str {
        "NileProblem"
    }

    async fn lever_count(&self) -> Result<usize, EnvError> {
        Ok(self.levers)
    }

    async fn evaluate(&self, inputs: &ParamValues) -> Result<ParamValues, EnvError> {
        if let Some(limit) = self.fail_for_policy_mean_above {
            if lever_mean(inputs, self.levers) > limit {
                return Err(EnvError::protocol("reservoir went dry"));
            }
        }
        Ok(self.outcomes_for(inputs))
    }
}

/// Lever value for (row, lever) in the generated baseline table.
fn lever_value(row: usize, lever: usize) -> f64 {
    ((row * 31 + lever * 7) % 100) as f64 / 100.0
}

/// Writes a baseline results table: index, `levers` lever columns, then
/// the six objective columns the optimizer reports.
fn write_baseline(dir: &Path, policies: usize, levers: usize) {
    let mut header = vec![String::new()];
    header.extend((0..levers).map(lever_name));
    header.extend(OUTCOME_NAMES.iter().map(|s| s.to_string()));

    let mut text = header.join(",");
    text.push('\n');
    for row in 0..policies {
        let mut cells = vec![row.to_string()];
        cells.extend((0..levers).map(|l| lever_value(row, l).to_string()));
        cells.extend(OUTCOME_NAMES.iter().map(|_| "0.5".to_string()));
        text.push_str(&cells.join(","));
        text.push('\n');
    }

    fs::write(dir.join("baseline_results.csv"), text).unwrap();
}

fn no_outputs_written(dir: &Path) -> bool {
    [EXPERIMENTS_FILE, OUTCOMES_FILE, TIME_COUNTER_FILE]
        .iter()
        .all(|f| !dir.join(f).exists())
}

#[tokio::test]
async fn test_two_policies_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 2, 164);

    let result = ResimulationRunner::new(dir.path())
        .run(Arc::new(ToyBasinModel::new(164)), &PoolEvaluator::new(4))
        .await
        .unwrap();

    assert_eq!(result.scenario_count, 5);
    assert_eq!(result.policy_count, 2);

    let experiments = ExperimentTable::read_from_path(&dir.path().join(EXPERIMENTS_FILE)).unwrap();
    assert_eq!(experiments.len(), 10);
    assert_eq!(experiments.columns.len(), 7 + 164);

    let outcomes = OutcomeTable::read_from_path(&dir.path().join(OUTCOMES_FILE)).unwrap();
    assert_eq!(outcomes.len(), 10);
    assert_eq!(outcomes.columns, OUTCOME_NAMES.map(String::from).to_vec());
    assert!(outcomes.rows.iter().all(|r| r.len() == 6));

    let note = fs::read_to_string(dir.path().join(TIME_COUNTER_FILE)).unwrap();
    assert!(note.starts_with("It took "));
    assert!(note.contains("5 scenarios"));
    assert!(note.contains("2 policies"));
}

#[tokio::test]
async fn test_written_tables_match_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 3, 164);

    let result = ResimulationRunner::new(dir.path())
        .run(Arc::new(ToyBasinModel::new(164)), &PoolEvaluator::new(3))
        .await
        .unwrap();

    let experiments = ExperimentTable::read_from_path(&result.paths.experiments).unwrap();
    let outcomes = OutcomeTable::read_from_path(&result.paths.outcomes).unwrap();

    assert_eq!(experiments, result.experiments);
    assert_eq!(outcomes, result.outcomes);
}

#[tokio::test]
async fn test_rows_align_with_policies_and_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 2, 164);
    let model = ToyBasinModel::new(164);

    let result = ResimulationRunner::new(dir.path())
        .run(Arc::new(ToyBasinModel::new(164)), &PoolEvaluator::new(8))
        .await
        .unwrap();

    let scenario_names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
    for (i, row) in result.experiments.rows.iter().enumerate() {
        // Policy-major: five scenarios per policy
        let policy = i / 5;
        assert_eq!(row.policy, format!("Policy{}", policy));
        assert_eq!(row.scenario, scenario_names[i % 5]);
        assert_eq!(row.model, "NileProblem");

        // Lever columns follow the seven uncertainties and equal the source row
        for lever in 0..164 {
            assert_eq!(row.values[7 + lever], lever_value(policy, lever));
        }

        // Outcome row i came from experiment row i
        let inputs: ParamValues = result
            .experiments
            .columns
            .iter()
            .cloned()
            .zip(row.values.iter().copied())
            .collect();
        let expected = model.outcomes_for(&inputs);
        for (j, name) in OUTCOME_NAMES.iter().enumerate() {
            assert_relative_eq!(result.outcomes.rows[i][j], expected.get(name).unwrap());
        }
    }
}

#[tokio::test]
async fn test_rerun_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 4, 164);
    let runner = ResimulationRunner::new(dir.path());

    runner
        .run(Arc::new(ToyBasinModel::new(164)), &PoolEvaluator::new(4))
        .await
        .unwrap();
    let first_outcomes = fs::read(dir.path().join(OUTCOMES_FILE)).unwrap();
    let first_experiments = fs::read(dir.path().join(EXPERIMENTS_FILE)).unwrap();

    runner
        .run(Arc::new(ToyBasinModel::new(164)), &SequentialEvaluator::new())
        .await
        .unwrap();

    assert_eq!(fs::read(dir.path().join(OUTCOMES_FILE)).unwrap(), first_outcomes);
    assert_eq!(fs::read(dir.path().join(EXPERIMENTS_FILE)).unwrap(), first_experiments);
}

#[tokio::test]
async fn test_scenario_subset() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 2, 164);

    let result = ResimulationRunner::new(dir.path())
        .with_scenarios(vec![ScenarioId::Baseline, ScenarioId::LowDemandLowBlue])
        .run(Arc::new(ToyBasinModel::new(164)), &SequentialEvaluator::new())
        .await
        .unwrap();

    assert_eq!(result.outcomes.len(), 4);
    let note = fs::read_to_string(&result.paths.time_counter).unwrap();
    assert!(note.contains("2 scenarios 2 policies"));
}

#[tokio::test]
async fn test_model_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 3, 164);
    let model = ToyBasinModel {
        levers: 164,
        fail_for_policy_mean_above: Some(0.0),
    };

    let err = ResimulationRunner::new(dir.path())
        .run(Arc::new(model), &PoolEvaluator::new(2))
        .await
        .unwrap_err();

    assert!(matches!(err, SimError::Env(EnvError::ExperimentFailed { .. })));
    assert!(no_outputs_written(dir.path()));
}

/// Evaluator that hands back a correct batch in the wrong order.
struct ReversingEvaluator;

#[async_trait]
impl BatchEvaluator for ReversingEvaluator {
    async fn perform(
        &self,
        model: Arc<dyn SimulationModel>,
        cases: Vec<ExperimentCase>,
    ) -> Result<Vec<CaseOutput>, EnvError> {
        let mut outputs = SequentialEvaluator::new().perform(model, cases).await?;
        outputs.reverse();
        Ok(outputs)
    }

    fn workers(&self) -> usize {
        1
    }
}

#[tokio::test]
async fn test_misordered_outputs_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 2, 164);

    let err = ResimulationRunner::new(dir.path())
        .run(Arc::new(ToyBasinModel::new(164)), &ReversingEvaluator)
        .await
        .unwrap_err();

    assert!(matches!(err, SimError::Core(CoreError::MalformedTable(_))));
    assert!(no_outputs_written(dir.path()));
}

#[tokio::test]
async fn test_missing_baseline_results() {
    let dir = tempfile::tempdir().unwrap();

    let err = ResimulationRunner::new(dir.path())
        .run(Arc::new(ToyBasinModel::new(164)), &SequentialEvaluator::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SimError::Core(CoreError::Io { .. })));
    assert!(no_outputs_written(dir.path()));
}

#[tokio::test]
async fn test_missing_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("outputs");

    let err = ResimulationRunner::new(&missing)
        .run(Arc::new(ToyBasinModel::new(164)), &SequentialEvaluator::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SimError::Core(CoreError::MissingOutputDir(_))));
    assert!(!missing.exists());
}

#[tokio::test]
async fn test_lever_slice_mismatch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 2, 164);

    // Model only has 160 levers; the default slice still takes 164 columns
    let err = ResimulationRunner::new(dir.path())
        .run(Arc::new(ToyBasinModel::new(160)), &SequentialEvaluator::new())
        .await
        .unwrap_err();

    match err {
        SimError::Core(CoreError::LeverCountMismatch { expected, found, .. }) => {
            assert_eq!(expected, 160);
            assert_eq!(found, 164);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(no_outputs_written(dir.path()));
}

#[tokio::test]
async fn test_custom_lever_slice() {
    let dir = tempfile::tempdir().unwrap();
    write_baseline(dir.path(), 3, 12);

    let result = ResimulationRunner::new(dir.path())
        .with_lever_columns(LeverColumns::new(1, 12))
        .run(Arc::new(ToyBasinModel::new(12)), &PoolEvaluator::new(2))
        .await
        .unwrap();

    assert_eq!(result.experiments.columns.len(), 7 + 12);
    assert_eq!(result.outcomes.len(), 15);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_outcome_rows_are_five_per_policy(policies in 1usize..6, workers in 1usize..5) {
        let dir = tempfile::tempdir().unwrap();
        write_baseline(dir.path(), policies, 164);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let evaluator: Box<dyn BatchEvaluator> = Box::new(PoolEvaluator::new(workers));
        let result = runtime
            .block_on(
                ResimulationRunner::new(dir.path())
                    .run(Arc::new(ToyBasinModel::new(164)), evaluator.as_ref()),
            )
            .unwrap();

        prop_assert_eq!(result.outcomes.len(), 5 * policies);
        prop_assert_eq!(result.experiments.len(), 5 * policies);
        prop_assert_eq!(result.outcomes.columns.len(), 6);
    }
}
