//! Model input/output contract: parameters, outcomes and the model spec.

use serde::{Deserialize, Serialize};

/// A continuous parameter with inclusive bounds.
///
/// Used both for uncertainties (exogenous climate/demand factors) and for
/// levers (policy coefficients).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealParameter {
    /// Parameter name, as the model expects it
    pub name: String,

    /// Lower bound
    pub lower: f64,

    /// Upper bound
    pub upper: f64,
}

impl RealParameter {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
        }
    }

    /// Returns true if `value` lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Optimization direction of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Minimize,
    Maximize,
}

/// A scalar metric reported by every model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarOutcome {
    pub name: String,
    pub direction: Direction,
}

impl ScalarOutcome {
    pub fn minimize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Minimize,
        }
    }

    pub fn maximize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Maximize,
        }
    }
}

/// Full input/output description of a simulation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model name recorded in the experiments table
    pub name: String,

    /// Uncertainty parameters, in declaration order
    pub uncertainties: Vec<RealParameter>,

    /// Lever parameters, in declaration order
    pub levers: Vec<RealParameter>,

    /// Outcomes, in declaration order
    pub outcomes: Vec<ScalarOutcome>,
}

impl ModelSpec {
    /// Creates an empty spec for the named model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uncertainties: Vec::new(),
            levers: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn with_uncertainties(mut self, uncertainties: Vec<RealParameter>) -> Self {
        self.uncertainties = uncertainties;
        self
    }

    pub fn with_levers(mut self, levers: Vec<RealParameter>) -> Self {
        self.levers = levers;
        self
    }

    pub fn with_outcomes(mut self, outcomes: Vec<ScalarOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn uncertainty_names(&self) -> impl Iterator<Item = &str> {
        self.uncertainties.iter().map(|p| p.name.as_str())
    }

    pub fn lever_names(&self) -> impl Iterator<Item = &str> {
        self.levers.iter().map(|p| p.name.as_str())
    }

    pub fn outcome_names(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|o| o.name.as_str())
    }

    /// Input column order used by the experiments table: uncertainties,
    /// then levers.
    pub fn input_names(&self) -> Vec<String> {
        self.uncertainty_names()
            .chain(self.lever_names())
            .map(str::to_string)
            .collect()
    }

    /// Looks up an uncertainty by name.
    pub fn uncertainty(&self, name: &str) -> Option<&RealParameter> {
        self.uncertainties.iter().find(|p| p.name == name)
    }
}
