//! Nile Evaluation Environment
//!
//! This crate abstracts the two external collaborators of the
//! re-simulation pipeline so the rest of the workspace never touches a
//! process, a thread or a model implementation directly:
//!
//! - **Model**: anything that maps named inputs to named outcomes
//!   ([`SimulationModel`])
//! - **Evaluator**: anything that runs a batch of experiments against a
//!   model and hands back aligned results ([`BatchEvaluator`])
//!
//! # Example
//!
//! ```ignore
//! use nile_env::{BatchEvaluator, CommandModel, PoolEvaluator};
//! use std::sync::Arc;
//!
//! let model = Arc::new(CommandModel::new("NileProblem", "./nile_model"));
//! let evaluator = PoolEvaluator::with_available_parallelism();
//! let outputs = evaluator.perform(model, cases).await?;
//! ```

mod command_model;
mod error;
mod evaluator;
mod model;
mod pool;
mod sequential;
mod types;

pub use command_model::{parse_lever_count, parse_outcomes, CommandModel};
pub use error::EnvError;
pub use evaluator::BatchEvaluator;
pub use model::SimulationModel;
pub use pool::PoolEvaluator;
pub use sequential::SequentialEvaluator;
pub use types::{CaseOutput, ExperimentCase, ParamValues};
