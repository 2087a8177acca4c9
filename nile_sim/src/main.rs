//! Nile re-simulation CLI
//!
//! Replay optimized policies under the fixed re-simulation scenarios.

use anyhow::Context;
use clap::Parser;
use nile_core::{LeverColumns, NILE_MODEL_NAME};
use nile_env::{BatchEvaluator, CommandModel, PoolEvaluator, SequentialEvaluator, SimulationModel};
use nile_sim::exporter::format_elapsed;
use nile_sim::scenarios::parse_selection;
use nile_sim::{ResimulationResult, ResimulationRunner, SimError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Nile re-simulation CLI
#[derive(Parser, Debug)]
#[command(name = "nile-resim")]
#[command(about = "Re-simulate optimized Nile policies under fixed scenarios", long_about = None)]
struct Args {
    /// Directory holding baseline_results.csv; all outputs are written here
    #[arg(short, long, default_value = "../outputs/")]
    output_dir: PathBuf,

    /// Model executable (speaks the lever-count / evaluate protocol)
    #[arg(short, long)]
    model_command: PathBuf,

    /// Extra argument passed to the model executable before the verb (repeatable)
    #[arg(long = "model-arg", allow_hyphen_values = true)]
    model_args: Vec<String>,

    /// Model name written to the experiments table
    #[arg(long, default_value = NILE_MODEL_NAME)]
    model_name: String,

    /// Lever count; queried from the model when omitted
    #[arg(long)]
    lever_count: Option<usize>,

    /// First lever column in baseline_results.csv
    #[arg(long, default_value = "1")]
    lever_offset: usize,

    /// Number of lever columns in baseline_results.csv
    #[arg(long, default_value = "164")]
    lever_columns: usize,

    /// Scenarios to run (comma-separated: Baseline, HighD_HighB, HighD_LowB, LowD_HighB, LowD_LowB, or all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of concurrent model runs (default: available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Run experiments one at a time, in order
    #[arg(long, conflicts_with = "workers")]
    sequential: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,
}

async fn run(args: &Args) -> anyhow::Result<ResimulationResult> {
    let scenarios = parse_selection(&args.scenario).map_err(SimError::UnknownScenario)?;
    for scenario in &scenarios {
        info!("scenario {}: {}", scenario, scenario.description());
    }

    let mut model = CommandModel::new(args.model_name.clone(), args.model_command.clone())
        .with_args(args.model_args.iter().cloned());
    if let Some(count) = args.lever_count {
        model = model.with_lever_count(count);
    }
    let model: Arc<dyn SimulationModel> = Arc::new(model);

    let evaluator: Box<dyn BatchEvaluator> = if args.sequential {
        Box::new(SequentialEvaluator::new())
    } else {
        match args.workers {
            Some(n) => Box::new(PoolEvaluator::new(n)),
            None => Box::new(PoolEvaluator::with_available_parallelism()),
        }
    };

    let runner = ResimulationRunner::new(&args.output_dir)
        .with_lever_columns(LeverColumns::new(args.lever_offset, args.lever_columns))
        .with_scenarios(scenarios);

    let result = runner
        .run(model, evaluator.as_ref())
        .await
        .with_context(|| format!("re-simulating {}", args.output_dir.display()))?;
    Ok(result)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, RUST_LOG overrides the default level)
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Nile re-simulation v{}", env!("CARGO_PKG_VERSION"));
    info!("output directory: {}", args.output_dir.display());

    let result = match run(&args).await {
        Ok(result) => result,
        Err(e) => {
            error!("re-simulation failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        let summary = serde_json::json!({
            "model": result.model,
            "scenarios": result.scenario_count,
            "policies": result.policy_count,
            "experiments": result.experiments.len(),
            "outcome_columns": result.outcomes.columns,
            "elapsed": format_elapsed(result.elapsed),
            "elapsed_secs": result.elapsed.as_secs_f64(),
            "paths": result.paths,
        });
        let text = serde_json::to_string_pretty(&summary).context("serializing summary")?;
        println!("{}", text);
    } else {
        info!(
            "✓ {} scenarios x {} policies = {} experiments in {}",
            result.scenario_count,
            result.policy_count,
            result.experiments.len(),
            format_elapsed(result.elapsed)
        );
    }

    Ok(())
}
