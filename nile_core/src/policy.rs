//! Policies and the results-table policy loader.
//!
//! A results table is a CSV whose first column is a row index, followed by
//! one column per lever and then whatever objective columns the optimizer
//! wrote. The loader takes a fixed column slice (`LeverColumns`) from every
//! row. The slice is not checked against the model here: that happens in
//! [`Policy::check_against`], so a mismatch is reported rather than
//! silently truncated or padded.

use crate::error::{CoreError, Result};
use crate::parameter::ModelSpec;
use nile_env::ParamValues;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Default number of lever columns in a baseline results table.
pub const DEFAULT_LEVER_COLUMNS: usize = 164;

/// Column slice holding lever values in a results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverColumns {
    /// Index of the first lever column (column 0 is the row index)
    pub offset: usize,

    /// Number of lever columns
    pub count: usize,
}

impl LeverColumns {
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    /// One past the last lever column.
    pub fn end(&self) -> usize {
        self.offset + self.count
    }
}

impl Default for LeverColumns {
    fn default() -> Self {
        Self {
            offset: 1,
            count: DEFAULT_LEVER_COLUMNS,
        }
    }
}

/// A fixed setting of every lever: one candidate operating strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy name (written to the `policy` column)
    pub name: String,

    /// Lever values, in column order
    pub levers: ParamValues,
}

impl Policy {
    pub fn new(name: impl Into<String>, levers: ParamValues) -> Self {
        Self {
            name: name.into(),
            levers,
        }
    }

    /// Name given to the policy built from results row `row`.
    pub fn row_name(row: usize) -> String {
        format!("Policy{}", row)
    }

    /// Checks that this policy supplies exactly the model's levers, in
    /// the model's order.
    pub fn check_against(&self, spec: &ModelSpec) -> Result<()> {
        if self.levers.len() != spec.levers.len() {
            return Err(CoreError::LeverCountMismatch {
                policy: self.name.clone(),
                expected: spec.levers.len(),
                found: self.levers.len(),
            });
        }

        let mismatch = self
            .levers
            .names()
            .zip(spec.lever_names())
            .enumerate()
            .find(|(_, (found, expected))| found != expected);

        if let Some((position, (found, expected))) = mismatch {
            return Err(CoreError::LeverNameMismatch {
                policy: self.name.clone(),
                position,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }

        Ok(())
    }
}

/// Reads one policy per row from CSV data.
///
/// Lever names come from the header cells of the slice; values must all
/// parse as numbers.
pub fn read_policies<R: Read>(reader: R, columns: LeverColumns) -> Result<Vec<Policy>> {
    let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv.headers()?.clone();
    if headers.len() < columns.end() {
        return Err(CoreError::MissingLeverColumns {
            needed: columns.end(),
            found: headers.len(),
        });
    }
    let names: Vec<&str> = headers
        .iter()
        .skip(columns.offset)
        .take(columns.count)
        .collect();

    let mut policies = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let record = record?;
        let mut levers = ParamValues::new();

        for (name, column) in names.iter().zip(columns.offset..columns.end()) {
            let cell = record.get(column).unwrap_or("").trim();
            let value = cell.parse::<f64>().map_err(|_| CoreError::InvalidValue {
                row,
                column: name.to_string(),
                value: cell.to_string(),
            })?;
            levers.insert(*name, value);
        }

        policies.push(Policy::new(Policy::row_name(row), levers));
    }

    Ok(policies)
}

/// Loads policies from a results file on disk.
pub fn load_policies(path: &Path, columns: LeverColumns) -> Result<Vec<Policy>> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let policies = read_policies(file, columns)?;
    info!(
        "loaded {} policies ({} levers each) from {}",
        policies.len(),
        columns.count,
        path.display()
    );
    Ok(policies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{lever_name, nile_problem, NILE_MODEL_NAME};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Builds a results table: index column, `levers` lever columns and
    /// two objective columns.
    fn results_csv(rows: &[Vec<f64>], levers: usize) -> String {
        let mut header = vec![String::new()];
        header.extend((0..levers).map(lever_name));
        header.push("egypt_irr".to_string());
        header.push("ethiopia_hydro".to_string());

        let mut out = header.join(",");
        out.push('\n');
        for (i, row) in rows.iter().enumerate() {
            let mut cells = vec![i.to_string()];
            cells.extend(row.iter().map(|v| v.to_string()));
            cells.push("9.5".to_string());
            cells.push("-3".to_string());
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_default_slice_is_columns_1_to_164() {
        let cols = LeverColumns::default();
        assert_eq!(cols.offset, 1);
        assert_eq!(cols.count, 164);
        assert_eq!(cols.end(), 165);
    }

    #[test]
    fn test_reads_one_policy_per_row() {
        let rows = vec![vec![0.1; 164], vec![0.9; 164], vec![0.5; 164]];
        let data = results_csv(&rows, 164);

        let policies = read_policies(data.as_bytes(), LeverColumns::default()).unwrap();

        assert_eq!(policies.len(), 3);
        assert_eq!(policies[2].name, "Policy2");
        assert_eq!(policies[1].levers.len(), 164);
        assert_relative_eq!(policies[1].levers.get("v163").unwrap(), 0.9);
        // Objective columns after the slice are not levers
        assert!(!policies[0].levers.contains("egypt_irr"));
    }

    #[test]
    fn test_narrow_table_rejected() {
        let data = results_csv(&[vec![0.1; 10]], 10);
        let err = read_policies(data.as_bytes(), LeverColumns::default()).unwrap_err();
        assert!(matches!(err, CoreError::MissingLeverColumns { needed: 165, found: 13 }));
    }

    #[test]
    fn test_non_numeric_cell_rejected() {
        let data = ",v0,v1\n0,0.5,high\n";
        let err = read_policies(data.as_bytes(), LeverColumns::new(1, 2)).unwrap_err();
        match err {
            CoreError::InvalidValue { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "v1");
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slice_wider_than_model_is_flagged() {
        let data = results_csv(&[vec![0.5; 164]], 164);
        let policies = read_policies(data.as_bytes(), LeverColumns::default()).unwrap();
        let spec = nile_problem(NILE_MODEL_NAME, 160);

        let err = policies[0].check_against(&spec).unwrap_err();
        assert!(matches!(err, CoreError::LeverCountMismatch { expected: 160, found: 164, .. }));
    }

    #[test]
    fn test_shifted_slice_is_flagged() {
        // Offset 2 skips v0 and picks up the objective column at the end
        let data = results_csv(&[vec![0.5; 4]], 4);
        let policies = read_policies(data.as_bytes(), LeverColumns::new(2, 4)).unwrap();
        let spec = nile_problem(NILE_MODEL_NAME, 4);

        let err = policies[0].check_against(&spec).unwrap_err();
        match err {
            CoreError::LeverNameMismatch { position, expected, found, .. } => {
                assert_eq!(position, 0);
                assert_eq!(expected, "v0");
                assert_eq!(found, "v1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_policies(Path::new("/nonexistent/baseline_results.csv"), LeverColumns::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    proptest! {
        #[test]
        fn prop_policy_i_matches_row_i(
            rows in prop::collection::vec(prop::collection::vec(0.0f64..1.0, 6), 1..8)
        ) {
            let data = results_csv(&rows, 6);
            let policies = read_policies(data.as_bytes(), LeverColumns::new(1, 6)).unwrap();

            prop_assert_eq!(policies.len(), rows.len());
            for (i, (policy, row)) in policies.iter().zip(rows.iter()).enumerate() {
                prop_assert_eq!(&policy.name, &format!("Policy{}", i));
                let values: Vec<f64> = policy.levers.iter().map(|(_, v)| v).collect();
                prop_assert_eq!(&values, row);
            }
        }
    }
}
