//! Nile Core - the re-simulation study's data model
//!
//! Everything the pipeline needs to know about the experiment, independent
//! of how the model is run:
//! 1. **Contract**: uncertainty, lever and outcome declarations ([`ModelSpec`])
//! 2. **Inputs**: named [`Scenario`]s and [`Policy`] rows loaded from a results table
//! 3. **Design**: the scenario x policy cross product of experiments
//! 4. **Outputs**: experiment and outcome tables with a lossless CSV form

pub mod design;
pub mod error;
pub mod parameter;
pub mod policy;
pub mod problem;
pub mod scenario;
pub mod table;

// Re-export key types for convenience
pub use design::experiment_design;
pub use error::CoreError;
pub use parameter::{Direction, ModelSpec, RealParameter, ScalarOutcome};
pub use policy::{load_policies, read_policies, LeverColumns, Policy};
pub use problem::{nile_problem, NILE_MODEL_NAME};
pub use scenario::Scenario;
pub use table::{ExperimentRow, ExperimentTable, OutcomeTable};
