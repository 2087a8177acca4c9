//! Error types for the Nile evaluation environment.

use thiserror::Error;

/// Errors that can occur while running a model or a batch of experiments.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The external model process could not be started
    #[error("Failed to spawn model `{program}`: {reason}")]
    Spawn { program: String, reason: String },
    
    /// The external model exited with a non-zero status
    #[error("Model exited with {status}: {stderr}")]
    ModelExit { status: String, stderr: String },
    
    /// Model output did not follow the request/response protocol
    #[error("Protocol error: {0}")]
    Protocol(String),
    
    /// Pipe or filesystem failure while talking to the model
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    /// A single experiment failed; the whole batch is aborted
    #[error("Experiment {id} failed: {source}")]
    ExperimentFailed {
        id: usize,
        #[source]
        source: Box<EnvError>,
    },
    
    /// A worker task panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),
}

impl EnvError {
    /// Creates a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
    
    /// Tags an error with the experiment that produced it.
    pub fn in_experiment(id: usize, source: EnvError) -> Self {
        Self::ExperimentFailed {
            id,
            source: Box::new(source),
        }
    }
}
