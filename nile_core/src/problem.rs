//! The Nile basin problem definition.
//!
//! Declares the uncertainty ranges, lever layout and outcome metrics that
//! the external Nile model expects. Only the lever count comes from the
//! model itself; everything else is fixed by the study.

use crate::parameter::{ModelSpec, RealParameter, ScalarOutcome};

/// Default model name recorded in the experiments table.
pub const NILE_MODEL_NAME: &str = "NileProblem";

// =============================================================================
// UNCERTAINTIES
// =============================================================================

pub const YEARLY_DEMAND_GROWTH_RATE: &str = "yearly_demand_growth_rate";
pub const BLUE_NILE_MEAN_COEF: &str = "blue_nile_mean_coef";
pub const WHITE_NILE_MEAN_COEF: &str = "white_nile_mean_coef";
pub const ATBARA_MEAN_COEF: &str = "atbara_mean_coef";
pub const BLUE_NILE_DEV_COEF: &str = "blue_nile_dev_coef";
pub const WHITE_NILE_DEV_COEF: &str = "white_nile_dev_coef";
pub const ATBARA_DEV_COEF: &str = "atbara_dev_coef";

/// (name, lower, upper) for every uncertainty, in declaration order.
const UNCERTAINTY_BOUNDS: [(&str, f64, f64); 7] = [
    (YEARLY_DEMAND_GROWTH_RATE, 0.01, 0.03),
    (BLUE_NILE_MEAN_COEF, 0.75, 1.25),
    (WHITE_NILE_MEAN_COEF, 0.75, 1.25),
    (ATBARA_MEAN_COEF, 0.75, 1.25),
    (BLUE_NILE_DEV_COEF, 0.5, 1.5),
    (WHITE_NILE_DEV_COEF, 0.5, 1.5),
    (ATBARA_DEV_COEF, 0.5, 1.5),
];

// =============================================================================
// OUTCOMES
// =============================================================================

pub const EGYPT_IRR: &str = "egypt_irr";
pub const EGYPT_90: &str = "egypt_90";
pub const EGYPT_LOW_HAD: &str = "egypt_low_had";
pub const SUDAN_IRR: &str = "sudan_irr";
pub const SUDAN_90: &str = "sudan_90";
pub const ETHIOPIA_HYDRO: &str = "ethiopia_hydro";

/// Name of lever `index` (`v0`, `v1`, ...).
pub fn lever_name(index: usize) -> String {
    format!("v{}", index)
}

/// The seven climate/demand uncertainties.
pub fn nile_uncertainties() -> Vec<RealParameter> {
    UNCERTAINTY_BOUNDS
        .iter()
        .map(|(name, lower, upper)| RealParameter::new(*name, *lower, *upper))
        .collect()
}

/// `lever_count` policy coefficients, each bounded to [0, 1].
pub fn nile_levers(lever_count: usize) -> Vec<RealParameter> {
    (0..lever_count)
        .map(|i| RealParameter::new(lever_name(i), 0.0, 1.0))
        .collect()
}

/// Irrigation deficits and High Aswan Dam levels are minimized,
/// Ethiopian hydropower is maximized.
pub fn nile_outcomes() -> Vec<ScalarOutcome> {
    vec![
        ScalarOutcome::minimize(EGYPT_IRR),
        ScalarOutcome::minimize(EGYPT_90),
        ScalarOutcome::minimize(EGYPT_LOW_HAD),
        ScalarOutcome::minimize(SUDAN_IRR),
        ScalarOutcome::minimize(SUDAN_90),
        ScalarOutcome::maximize(ETHIOPIA_HYDRO),
    ]
}

/// Assembles the full model spec for a model with `lever_count` levers.
pub fn nile_problem(model_name: &str, lever_count: usize) -> ModelSpec {
    ModelSpec::new(model_name)
        .with_uncertainties(nile_uncertainties())
        .with_levers(nile_levers(lever_count))
        .with_outcomes(nile_outcomes())
}
