//! Error type for the re-simulation harness.

use nile_core::CoreError;
use nile_env::EnvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Loading, validating or writing study data failed
    #[error(transparent)]
    Core(#[from] CoreError),
    
    /// The model or evaluator failed
    #[error(transparent)]
    Env(#[from] EnvError),
    
    /// Scenario selection named an unknown scenario
    #[error("{0}")]
    UnknownScenario(String),
}
