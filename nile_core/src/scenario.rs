//! Scenarios: named points in uncertainty space.

use crate::error::{CoreError, Result};
use crate::parameter::ModelSpec;
use nile_env::ParamValues;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A fixed setting of every uncertainty, representing one plausible future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name (written to the `scenario` column)
    pub name: String,

    /// One value per uncertainty
    pub values: ParamValues,
}

impl Scenario {
    /// Creates a scenario with no values yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: ParamValues::new(),
        }
    }

    /// Sets one uncertainty value.
    pub fn with(mut self, uncertainty: impl Into<String>, value: f64) -> Self {
        self.values.insert(uncertainty, value);
        self
    }

    /// Sets every value in `values`.
    pub fn with_values(mut self, values: &ParamValues) -> Self {
        self.values.extend_from(values);
        self
    }

    /// Checks that every declared uncertainty has a value and that no
    /// value names an undeclared uncertainty.
    ///
    /// Out-of-bounds values are allowed (stress tests may deliberately
    /// leave the sampled range) but logged.
    pub fn validate(&self, spec: &ModelSpec) -> Result<()> {
        for param in &spec.uncertainties {
            match self.values.get(&param.name) {
                None => {
                    return Err(CoreError::MissingUncertainty {
                        scenario: self.name.clone(),
                        uncertainty: param.name.clone(),
                    })
                }
                Some(v) if !param.contains(v) => {
                    warn!(
                        "scenario {}: {}={} is outside [{}, {}]",
                        self.name, param.name, v, param.lower, param.upper
                    );
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = self.values.names().find(|n| spec.uncertainty(n).is_none()) {
            return Err(CoreError::UnknownUncertainty {
                scenario: self.name.clone(),
                uncertainty: unknown.to_string(),
            });
        }

        Ok(())
    }
}
