//! Result tables and their CSV form.
//!
//! Both tables are written with a leading, unnamed index column holding the
//! row number, the same layout as the baseline results table the policies
//! are read from. Floats use Rust's shortest round-trip formatting, so
//! reading a written table back yields bit-identical values.

use crate::error::{CoreError, Result};
use crate::parameter::ModelSpec;
use nile_env::{CaseOutput, ExperimentCase};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

pub const SCENARIO_COLUMN: &str = "scenario";
pub const POLICY_COLUMN: &str = "policy";
pub const MODEL_COLUMN: &str = "model";

const METADATA_COLUMNS: [&str; 3] = [SCENARIO_COLUMN, POLICY_COLUMN, MODEL_COLUMN];

// =============================================================================
// EXPERIMENT TABLE
// =============================================================================

/// Inputs actually used by one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRow {
    /// One value per input column
    pub values: Vec<f64>,
    pub scenario: String,
    pub policy: String,
    pub model: String,
}

/// One row per experiment: every uncertainty and lever value, then the
/// scenario, policy and model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentTable {
    /// Input column names (uncertainties, then levers)
    pub columns: Vec<String>,
    pub rows: Vec<ExperimentRow>,
}

impl ExperimentTable {
    /// Builds the table from experiment cases, in case order.
    pub fn from_cases(spec: &ModelSpec, cases: &[ExperimentCase]) -> Result<Self> {
        let columns = spec.input_names();
        let mut rows = Vec::with_capacity(cases.len());

        for case in cases {
            let values = columns
                .iter()
                .map(|name| {
                    case.inputs.get(name).ok_or_else(|| {
                        CoreError::MalformedTable(format!(
                            "experiment {} has no input `{}`",
                            case.id, name
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;

            rows.push(ExperimentRow {
                values,
                scenario: case.scenario.clone(),
                policy: case.policy.clone(),
                model: case.model.clone(),
            });
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        header.extend(METADATA_COLUMNS.iter().map(|c| c.to_string()));
        csv.write_record(&header)?;

        for (index, row) in self.rows.iter().enumerate() {
            let mut record = vec![index.to_string()];
            record.extend(row.values.iter().map(|v| v.to_string()));
            record.push(row.scenario.clone());
            record.push(row.policy.clone());
            record.push(row.model.clone());
            csv.write_record(&record)?;
        }

        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Reads a table previously written by [`ExperimentTable::write_csv`].
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv.headers()?.clone();

        let width = headers.len();
        let trailing: Vec<&str> = headers.iter().skip(width.saturating_sub(3)).collect();
        if width < 4 || trailing != METADATA_COLUMNS {
            return Err(CoreError::MalformedTable(format!(
                "experiments header must be index, inputs..., {}",
                METADATA_COLUMNS.join(", ")
            )));
        }
        let columns: Vec<String> = headers
            .iter()
            .skip(1)
            .take(width - 4)
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (row, record) in csv.records().enumerate() {
            let record = record?;
            let values = parse_values(&record, row, &columns, 1)?;
            let meta = |i: usize| record.get(width - 3 + i).unwrap_or("").to_string();
            rows.push(ExperimentRow {
                values,
                scenario: meta(0),
                policy: meta(1),
                model: meta(2),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Writes the table to `path`, replacing any existing file.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| CoreError::io(path, e))?;
        self.write_csv(file)?;
        debug!("wrote {} experiment rows to {}", self.len(), path.display());
        Ok(())
    }

    pub fn read_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
        Self::read_csv(file)
    }
}

// =============================================================================
// OUTCOME TABLE
// =============================================================================

/// One row per experiment, one column per declared outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTable {
    /// Outcome names, in declaration order
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl OutcomeTable {
    /// Builds the table from evaluator outputs, in output order.
    ///
    /// Outcomes the model reports but `spec` does not declare are
    /// dropped; a declared outcome that is missing is an error.
    pub fn from_outputs(spec: &ModelSpec, outputs: &[CaseOutput]) -> Result<Self> {
        let columns: Vec<String> = spec.outcome_names().map(str::to_string).collect();
        let mut rows = Vec::with_capacity(outputs.len());

        for output in outputs {
            let row = columns
                .iter()
                .map(|name| {
                    output.outcomes.get(name).ok_or_else(|| CoreError::MissingOutcome {
                        experiment: output.experiment_id,
                        outcome: name.clone(),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one outcome column.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        csv.write_record(&header)?;

        for (index, row) in self.rows.iter().enumerate() {
            let mut record = vec![index.to_string()];
            record.extend(row.iter().map(|v| v.to_string()));
            csv.write_record(&record)?;
        }

        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv.headers()?.clone();
        if headers.is_empty() {
            return Err(CoreError::MalformedTable("outcomes header is empty".to_string()));
        }
        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

        let mut rows = Vec::new();
        for (row, record) in csv.records().enumerate() {
            rows.push(parse_values(&record?, row, &columns, 1)?);
        }

        Ok(Self { columns, rows })
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| CoreError::io(path, e))?;
        self.write_csv(file)?;
        debug!("wrote {} outcome rows to {}", self.len(), path.display());
        Ok(())
    }

    pub fn read_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
        Self::read_csv(file)
    }
}

/// Parses `columns.len()` numeric cells starting at `offset`.
fn parse_values(
    record: &csv::StringRecord,
    row: usize,
    columns: &[String],
    offset: usize,
) -> Result<Vec<f64>> {
    columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cell = record.get(offset + i).unwrap_or("").trim();
            cell.parse::<f64>().map_err(|_| CoreError::InvalidValue {
                row,
                column: name.clone(),
                value: cell.to_string(),
            })
        })
        .collect()
}
