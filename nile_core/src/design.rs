//! Experiment design: the scenario x policy cross product.

use crate::error::Result;
use crate::parameter::ModelSpec;
use crate::policy::Policy;
use crate::scenario::Scenario;
use nile_env::{ExperimentCase, ParamValues};
use tracing::info;

/// Builds one experiment per (scenario, policy) pair.
///
/// Every scenario and policy is validated against `spec` first, so a
/// malformed input fails here instead of inside a model run. Cases are
/// ordered policy-major (all scenarios for the first policy, then the
/// next policy) and numbered from 0.
pub fn experiment_design(
    spec: &ModelSpec,
    scenarios: &[Scenario],
    policies: &[Policy],
) -> Result<Vec<ExperimentCase>> {
    for scenario in scenarios {
        scenario.validate(spec)?;
    }
    for policy in policies {
        policy.check_against(spec)?;
    }

    let mut cases = Vec::with_capacity(scenarios.len() * policies.len());
    for policy in policies {
        for scenario in scenarios {
            let mut inputs = ParamValues::new();
            for name in spec.uncertainty_names() {
                if let Some(v) = scenario.values.get(name) {
                    inputs.insert(name, v);
                }
            }
            inputs.extend_from(&policy.levers);

            cases.push(ExperimentCase {
                id: cases.len(),
                scenario: scenario.name.clone(),
                policy: policy.name.clone(),
                model: spec.name.clone(),
                inputs,
            });
        }
    }

    info!(
        "designed {} scenarios * {} policies * 1 model(s) = {} experiments",
        scenarios.len(),
        policies.len(),
        cases.len()
    );
    Ok(cases)
}
