//! Nile Re-simulation Harness
//!
//! Replays a set of previously optimized reservoir operating policies
//! against five fixed hydrological/demand scenarios and records what
//! every policy achieves under every scenario.
//!
//! # Pipeline
//!
//! ```text
//! baseline_results.csv ──► Policy x N ─┐
//!                                      ├─► experiment design ──► BatchEvaluator ──► tables ──► CSV
//! ScenarioId::all()   ──► Scenario x 5 ┘         (5 * N runs)     (model runs)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use nile_sim::ResimulationRunner;
//! use nile_env::{CommandModel, PoolEvaluator};
//! use std::sync::Arc;
//!
//! let model = Arc::new(CommandModel::new("NileProblem", "./nile_model"));
//! let result = ResimulationRunner::new("../outputs/")
//!     .run(model, &PoolEvaluator::default())
//!     .await?;
//! ```

mod error;
mod runner;
pub mod exporter;
pub mod scenarios;

pub use error::SimError;
pub use exporter::OutputPaths;
pub use runner::{ResimulationResult, ResimulationRunner};
pub use scenarios::ScenarioId;
