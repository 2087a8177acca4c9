//! Result writer: persists the re-simulation tables and timing note.
//!
//! Files land directly in the output directory, which must already
//! exist. Existing files are replaced.

use nile_core::{CoreError, ExperimentTable, OutcomeTable};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Baseline optimization results the policies are read from.
pub const BASELINE_RESULTS_FILE: &str = "baseline_results.csv";

pub const EXPERIMENTS_FILE: &str = "experiments_resimulation.csv";
pub const OUTCOMES_FILE: &str = "outcomes_resimulation.csv";
pub const TIME_COUNTER_FILE: &str = "time_counter_resimulation.txt";

/// Paths of everything one run writes.
#[derive(Debug, Clone, Serialize)]
pub struct OutputPaths {
    pub experiments: PathBuf,
    pub outcomes: PathBuf,
    pub time_counter: PathBuf,
}

impl OutputPaths {
    /// Standard file layout inside `output_dir`.
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            experiments: output_dir.join(EXPERIMENTS_FILE),
            outcomes: output_dir.join(OUTCOMES_FILE),
            time_counter: output_dir.join(TIME_COUNTER_FILE),
        }
    }
}

/// Formats a duration as `H:MM:SS`, with `.ffffff` microseconds when
/// non-zero. Hours are not wrapped into days.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let micros = elapsed.subsec_micros();

    if micros == 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
    }
}

/// The single line written to the time counter file.
pub fn time_counter_line(elapsed: Duration, scenarios: usize, policies: usize) -> String {
    format!(
        "It took {} time to run re-simulation {} scenarios {} policies",
        format_elapsed(elapsed),
        scenarios,
        policies
    )
}

/// Writes the experiments and outcomes tables, then the timing note.
///
/// The timing note is only written once both tables are on disk. If the
/// outcomes table cannot be written, the experiments table written before
/// it is removed again.
pub fn write_results(
    paths: &OutputPaths,
    experiments: &ExperimentTable,
    outcomes: &OutcomeTable,
    elapsed: Duration,
    scenarios: usize,
    policies: usize,
) -> Result<(), CoreError> {
    experiments.write_to_path(&paths.experiments)?;
    if let Err(e) = outcomes.write_to_path(&paths.outcomes) {
        discard(&paths.experiments);
        return Err(e);
    }
    info!(
        "wrote {} experiments to {} and {} outcome rows to {}",
        experiments.len(),
        paths.experiments.display(),
        outcomes.len(),
        paths.outcomes.display()
    );

    let line = time_counter_line(elapsed, scenarios, policies);
    if let Err(e) = fs::write(&paths.time_counter, &line) {
        discard(&paths.experiments);
        discard(&paths.outcomes);
        return Err(CoreError::io(&paths.time_counter, e));
    }
    info!("{}", line);
    Ok(())
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("could not remove partial output {}: {}", path.display(), e);
    }
}
