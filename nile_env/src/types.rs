//! Common types exchanged between the pipeline, evaluators and models.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of parameter (or outcome) names to values.
///
/// Insertion order is preserved so that tables built from these values
/// keep the column order the model declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamValues(IndexMap<String, f64>);

impl ParamValues {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Sets a value, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Returns true if a value is set for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no values are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Appends every value of `other`, overwriting duplicates.
    pub fn extend_from(&mut self, other: &ParamValues) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }
}

impl FromIterator<(String, f64)> for ParamValues {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One unit of work for an evaluator: a single model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentCase {
    /// Sequential experiment id (row number in the result tables)
    pub id: usize,

    /// Name of the scenario supplying the uncertainty values
    pub scenario: String,

    /// Name of the policy supplying the lever values
    pub policy: String,

    /// Name of the model being run
    pub model: String,

    /// Merged inputs: uncertainties followed by levers
    pub inputs: ParamValues,
}

/// Outcome values produced by one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutput {
    /// Id of the experiment that produced these values
    pub experiment_id: usize,

    /// Named outcome values as reported by the model
    pub outcomes: ParamValues,
}
