//! Adapter for simulation models that live in an external executable.

use crate::error::EnvError;
use crate::model::SimulationModel;
use crate::types::ParamValues;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Verb passed to the executable to query the lever count.
pub const LEVER_COUNT_VERB: &str = "lever-count";

/// Verb passed to the executable to run one simulation.
pub const EVALUATE_VERB: &str = "evaluate";

/// Runs the simulation model as a child process, one process per run.
///
/// # Protocol
///
/// ```text
/// <program> [args..] lever-count    -> stdout: "164"
/// <program> [args..] evaluate       <- stdin:  {"yearly_demand_growth_rate":0.02,...,"v0":0.1,...}
///                                   -> stdout: {"egypt_irr":1.3,...,"ethiopia_hydro":15.2}
/// ```
///
/// A non-zero exit status fails the run with the child's stderr attached.
/// Children are killed if the owning future is dropped, so aborting a
/// batch does not leave model processes behind.
#[derive(Debug, Clone)]
pub struct CommandModel {
    /// Model name reported in the experiments table
    name: String,

    /// Executable to run
    program: PathBuf,

    /// Arguments placed before the protocol verb
    args: Vec<String>,

    /// Known lever count (skips the `lever-count` query)
    lever_count: Option<usize>,
}

impl CommandModel {
    /// Creates a model adapter for `program`.
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            lever_count: None,
        }
    }

    /// Sets the arguments placed before the protocol verb.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Fixes the lever count instead of asking the executable.
    pub fn with_lever_count(mut self, count: usize) -> Self {
        self.lever_count = Some(count);
        self
    }

    /// Spawns `<program> [args..] <verb>`, optionally feeding `input` on
    /// stdin, and returns the captured stdout.
    async fn invoke(&self, verb: &str, input: Option<Vec<u8>>) -> Result<Vec<u8>, EnvError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(verb)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| EnvError::Spawn {
            program: self.program.display().to_string(),
            reason: e.to_string(),
        })?;

        // A model that exits without reading its input closes the pipe;
        // its exit status and stderr say more than the EPIPE does.
        let mut broken_pipe = None;
        if let Some(bytes) = input {
            if let Some(mut stdin) = child.stdin.take() {
                let written = match stdin.write_all(&bytes).await {
                    Ok(()) => stdin.shutdown().await,
                    Err(e) => Err(e),
                };
                match written {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => broken_pipe = Some(e),
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(EnvError::ModelExit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if let Some(e) = broken_pipe {
            return Err(e.into());
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl SimulationModel for CommandModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lever_count(&self) -> Result<usize, EnvError> {
        if let Some(count) = self.lever_count {
            return Ok(count);
        }
        let stdout = self.invoke(LEVER_COUNT_VERB, None).await?;
        parse_lever_count(&stdout)
    }

    async fn evaluate(&self, inputs: &ParamValues) -> Result<ParamValues, EnvError> {
        let request = serde_json::to_vec(inputs)
            .map_err(|e| EnvError::protocol(format!("cannot encode inputs: {e}")))?;
        let stdout = self.invoke(EVALUATE_VERB, Some(request)).await?;
        let outcomes = parse_outcomes(&stdout)?;
        debug!("{} returned {} outcomes", self.name, outcomes.len());
        Ok(outcomes)
    }
}

/// Parses the `lever-count` response: a single non-negative integer.
pub fn parse_lever_count(stdout: &[u8]) -> Result<usize, EnvError> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    trimmed
        .parse::<usize>()
        .map_err(|_| EnvError::protocol(format!("expected a lever count, got `{trimmed}`")))
}

/// Parses the `evaluate` response: a flat JSON object of numbers.
pub fn parse_outcomes(stdout: &[u8]) -> Result<ParamValues, EnvError> {
    serde_json::from_slice(stdout)
        .map_err(|e| EnvError::protocol(format!("expected a JSON object of outcome values: {e}")))
}
