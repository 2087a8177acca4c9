//! The five re-simulation scenarios.
//!
//! Every scenario holds the White Nile and Atbara means and all three
//! deviation coefficients at 1, and varies only the yearly demand growth
//! rate and the Blue Nile mean.

use nile_core::problem::{
    ATBARA_DEV_COEF, ATBARA_MEAN_COEF, BLUE_NILE_DEV_COEF, BLUE_NILE_MEAN_COEF,
    WHITE_NILE_DEV_COEF, WHITE_NILE_MEAN_COEF, YEARLY_DEMAND_GROWTH_RATE,
};
use nile_core::Scenario;
use nile_env::ParamValues;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Central demand growth, historical Blue Nile flow
    Baseline,

    /// Fast demand growth, wet Blue Nile
    HighDemandHighBlue,

    /// Fast demand growth, dry Blue Nile
    HighDemandLowBlue,

    /// Slow demand growth, wet Blue Nile
    LowDemandHighBlue,

    /// Slow demand growth, dry Blue Nile
    LowDemandLowBlue,
}

/// Uncertainties held fixed across every scenario.
pub fn fixed_uncertainties() -> ParamValues {
    ParamValues::new()
        .with(WHITE_NILE_MEAN_COEF, 1.0)
        .with(ATBARA_MEAN_COEF, 1.0)
        .with(BLUE_NILE_DEV_COEF, 1.0)
        .with(WHITE_NILE_DEV_COEF, 1.0)
        .with(ATBARA_DEV_COEF, 1.0)
}

impl ScenarioId {
    /// Returns all scenarios, in the order they are evaluated.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Baseline,
            ScenarioId::HighDemandHighBlue,
            ScenarioId::HighDemandLowBlue,
            ScenarioId::LowDemandHighBlue,
            ScenarioId::LowDemandLowBlue,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "Baseline",
            ScenarioId::HighDemandHighBlue => "HighD_HighB",
            ScenarioId::HighDemandLowBlue => "HighD_LowB",
            ScenarioId::LowDemandHighBlue => "LowD_HighB",
            ScenarioId::LowDemandLowBlue => "LowD_LowB",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "2% yearly demand growth, Blue Nile at historical mean",
            ScenarioId::HighDemandHighBlue => "3% yearly demand growth, Blue Nile mean +25%",
            ScenarioId::HighDemandLowBlue => "3% yearly demand growth, Blue Nile mean -25%",
            ScenarioId::LowDemandHighBlue => "1% yearly demand growth, Blue Nile mean +25%",
            ScenarioId::LowDemandLowBlue => "1% yearly demand growth, Blue Nile mean -25%",
        }
    }

    /// Yearly demand growth rate.
    pub fn demand_growth(&self) -> f64 {
        match self {
            ScenarioId::Baseline => 0.02,
            ScenarioId::HighDemandHighBlue | ScenarioId::HighDemandLowBlue => 0.03,
            ScenarioId::LowDemandHighBlue | ScenarioId::LowDemandLowBlue => 0.01,
        }
    }

    /// Blue Nile mean flow coefficient.
    pub fn blue_nile_mean(&self) -> f64 {
        match self {
            ScenarioId::Baseline => 1.0,
            ScenarioId::HighDemandHighBlue | ScenarioId::LowDemandHighBlue => 1.25,
            ScenarioId::HighDemandLowBlue | ScenarioId::LowDemandLowBlue => 0.75,
        }
    }

    /// Builds the fully specified scenario.
    pub fn scenario(&self) -> Scenario {
        Scenario::new(self.name())
            .with(YEARLY_DEMAND_GROWTH_RATE, self.demand_growth())
            .with(BLUE_NILE_MEAN_COEF, self.blue_nile_mean())
            .with_values(&fixed_uncertainties())
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "").as_str() {
            "baseline" => Ok(ScenarioId::Baseline),
            "highdhighb" => Ok(ScenarioId::HighDemandHighBlue),
            "highdlowb" => Ok(ScenarioId::HighDemandLowBlue),
            "lowdhighb" => Ok(ScenarioId::LowDemandHighBlue),
            "lowdlowb" => Ok(ScenarioId::LowDemandLowBlue),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

/// Parses a comma-separated scenario selection; `all` selects every scenario.
pub fn parse_selection(selection: &str) -> Result<Vec<ScenarioId>, String> {
    if selection.trim().eq_ignore_ascii_case("all") {
        return Ok(ScenarioId::all());
    }
    selection
        .split(',')
        .map(|s| s.trim().parse())
        .collect()
}
