//! Simulation model abstraction.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::types::ParamValues;

/// The contract an external simulation model must satisfy.
///
/// A model takes one value per declared uncertainty and lever, runs a
/// full simulation, and reports one value per outcome.
///
/// # Implementations
///
/// - **Production**: `CommandModel` - drives an external model executable
/// - **Tests**: any in-process type implementing this trait
#[async_trait]
pub trait SimulationModel: Send + Sync + 'static {
    /// Returns the model name recorded in the experiments table.
    fn name(&self) -> &str;
    
    /// Returns the total number of decision-lever parameters the
    /// model's policy expects.
    ///
    /// The pipeline cannot build its lever list without this, so an
    /// error here is fatal for the run.
    async fn lever_count(&self) -> Result<usize, EnvError>;
    
    /// Runs the model once with the given named inputs.
    ///
    /// # Arguments
    /// * `inputs` - uncertainty values followed by lever values
    ///
    /// # Returns
    /// Named outcome values for this run.
    async fn evaluate(&self, inputs: &ParamValues) -> Result<ParamValues, EnvError>;
}
