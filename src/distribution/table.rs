//! Probability table assembly and export

use super::kernel::probability_vector;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::format::{format_significant, is_close};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Relative tolerance for the column total check
pub const COLUMN_SUM_TOLERANCE: f64 = 1e-9;

/// Significant digits used when exporting probabilities
pub const EXPORT_SIGNIFICANT_DIGITS: usize = 6;

/// A hazard rate together with the text it was entered as
///
/// The label is the column's identity: "0.5" and "0.50" give two columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaColumn {
    pub label: String,
    pub lambda: f64,
}

impl LambdaColumn {
    pub fn new(label: impl Into<String>, lambda: f64) -> Self {
        Self {
            label: label.into(),
            lambda,
        }
    }
}

/// One lambda column of Pr{Wt = k}
#[derive(Debug, Clone, Serialize)]
pub struct ProbabilityColumn {
    pub label: String,
    pub lambda: f64,
    pub probabilities: Vec<f64>,
}

impl ProbabilityColumn {
    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }
}

/// Total of one column and whether it is close to 1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub label: String,
    pub total: f64,
    pub sums_to_one: bool,
}

/// Table of Pr{Wt = k}, rows k = 0..=n, one column per lambda
///
/// An empty table (no rows) signals rejected input parameters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbabilityTable {
    pub k: Vec<u32>,
    pub columns: Vec<ProbabilityColumn>,
}

impl ProbabilityTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.k.len()
    }

    pub fn column(&self, label: &str) -> Option<&ProbabilityColumn> {
        self.columns.iter().find(|c| c.label == label)
    }

    /// Column labels in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }

    /// Row `index` as (k, one value per column); None past the end or
    /// when a column is shorter than the row index
    pub fn row(&self, index: usize) -> Option<(u32, Vec<f64>)> {
        let k = *self.k.get(index)?;
        let values = self
            .columns
            .iter()
            .map(|c| c.probabilities.get(index).copied())
            .collect::<Option<Vec<f64>>>()?;
        Some((k, values))
    }

    pub fn column_summaries(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|c| {
                let total = c.total();
                ColumnSummary {
                    label: c.label.clone(),
                    total,
                    sums_to_one: is_close(total, 1.0, COLUMN_SUM_TOLERANCE),
                }
            })
            .collect()
    }

    /// Column totals, with a diagnostic for every column not close to 1
    ///
    /// The table itself is left as computed.
    pub fn check_column_sums(&self, sink: &mut Diagnostics) -> Vec<ColumnSummary> {
        let summaries = self.column_summaries();
        for summary in &summaries {
            if summary.sums_to_one {
                log::info!(
                    "column '{}': total probability {:.10} is close to 1.0",
                    summary.label,
                    summary.total
                );
            } else {
                sink.push(Diagnostic::ColumnSumDeviation {
                    label: summary.label.clone(),
                    total: summary.total,
                });
            }
        }
        summaries
    }

    /// Write the table as CSV (header `k,<labels...>`)
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["k".to_string()];
        header.extend(self.labels().map(str::to_string));
        csv_writer.write_record(&header)?;

        for index in 0..self.row_count() {
            let mut record = vec![self.k[index].to_string()];
            record.extend(
                self.columns
                    .iter()
                    .map(|c| {
                        c.probabilities
                            .get(index)
                            .map(|&v| format_significant(v, EXPORT_SIGNIFICANT_DIGITS))
                            .unwrap_or_default()
                    }),
            );
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Build the table for every lambda column
///
/// Rejected top-level parameters (n < 0, q outside [0, 1], t < 0) give an
/// empty table and an `InvalidParameter` diagnostic. A negative lambda gives
/// an all-zero column and a `NegativeHazard` diagnostic; the other columns
/// are still computed.
pub fn generate_probability_table(
    n: i64,
    q: f64,
    t: f64,
    lambdas: &[LambdaColumn],
    sink: &mut Diagnostics,
) -> ProbabilityTable {
    let n = match u32::try_from(n) {
        Ok(n) => n,
        Err(_) => {
            sink.push(Diagnostic::InvalidParameter { name: "n", value: n as f64 });
            return ProbabilityTable::empty();
        }
    };
    if !(0.0..=1.0).contains(&q) {
        sink.push(Diagnostic::InvalidParameter { name: "q", value: q });
        return ProbabilityTable::empty();
    }
    if t.is_nan() || t < 0.0 {
        sink.push(Diagnostic::InvalidParameter { name: "t", value: t });
        return ProbabilityTable::empty();
    }

    let size = n as usize + 1;
    let columns = lambdas
        .iter()
        .map(|column| {
            let probabilities = if column.lambda < 0.0 {
                sink.push(Diagnostic::NegativeHazard {
                    label: column.label.clone(),
                    lambda: column.lambda,
                });
                vec![0.0; size]
            } else {
                probability_vector(n, q, column.lambda, t, &column.label, sink)
            };

            ProbabilityColumn {
                label: column.label.clone(),
                lambda: column.lambda,
                probabilities,
            }
        })
        .collect();

    log::debug!("probability table: n={}, q={}, t={}, {} column(s)", n, q, t, lambdas.len());

    ProbabilityTable {
        k: (0..=n).collect(),
        columns,
    }
}

/// Default export name, e.g. `probability_table_n10_q0.2_t1.0.csv`
pub fn default_export_file_name(n: i64, q: f64, t: f64) -> String {
    format!("probability_table_n{}_q{:?}_t{:?}.csv", n, q, t)
}

/// Resolve a user-chosen export name: blank falls back to the default,
/// and `.csv` is appended when missing
pub fn resolve_export_file_name(custom: Option<&str>, n: i64, q: f64, t: f64) -> String {
    match custom.map(str::trim) {
        None | Some("") => default_export_file_name(n, q, t),
        Some(name) if name.ends_with(".csv") => name.to_string(),
        Some(name) => format!("{}.csv", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_lambdas() -> Vec<LambdaColumn> {
        ["0.000696", "0.000325", "0.000128", "0.000173"]
            .iter()
            .map(|s| LambdaColumn::new(*s, s.parse().unwrap()))
            .collect()
    }

    #[test]
    fn test_table_is_rectangular() {
        let mut sink = Diagnostics::new();
        let table = generate_probability_table(10, 0.2, 1.0, &default_lambdas(), &mut sink);

        assert_eq!(table.row_count(), 11);
        assert_eq!(table.k, (0..=10).collect::<Vec<_>>());
        assert_eq!(table.columns.len(), 4);
        assert!(table.columns.iter().all(|c| c.probabilities.len() == 11));
        assert_eq!(
            table.labels().collect::<Vec<_>>(),
            vec!["0.000696", "0.000325", "0.000128", "0.000173"]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_columns_sum_to_one() {
        let mut sink = Diagnostics::new();
        let table = generate_probability_table(10, 0.2, 1.0, &default_lambdas(), &mut sink);
        let summaries = table.check_column_sums(&mut sink);

        assert!(summaries.iter().all(|s| s.sums_to_one));
        for summary in &summaries {
            assert_relative_eq!(summary.total, 1.0, max_relative = 1e-9);
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_parameters_give_empty_table() {
        let lambdas = default_lambdas();

        for (n, q, t, name) in [(-1, 0.2, 1.0, "n"), (10, 1.2, 1.0, "q"), (10, -0.1, 1.0, "q"), (10, 0.2, -1.0, "t")] {
            let mut sink = Diagnostics::new();
            let table = generate_probability_table(n, q, t, &lambdas, &mut sink);
            assert!(table.is_empty());
            assert!(table.columns.is_empty());
            assert!(matches!(
                sink.entries()[0],
                Diagnostic::InvalidParameter { name: found, .. } if found == name
            ));
        }
    }

    #[test]
    fn test_negative_lambda_zeroes_only_its_column() {
        let lambdas = vec![LambdaColumn::new("0.01", 0.01), LambdaColumn::new("-0.5", -0.5)];
        let mut sink = Diagnostics::new();
        let table = generate_probability_table(5, 0.1, 1.0, &lambdas, &mut sink);

        let zeroed = table.column("-0.5").unwrap();
        assert!(zeroed.probabilities.iter().all(|&p| p == 0.0));
        assert_relative_eq!(table.column("0.01").unwrap().total(), 1.0, max_relative = 1e-9);
        assert!(matches!(sink.entries()[0], Diagnostic::NegativeHazard { .. }));

        // The zero column is then flagged by the sum check as well
        let summaries = table.check_column_sums(&mut sink);
        assert!(!summaries[1].sums_to_one);
        assert!(matches!(sink.entries()[1], Diagnostic::ColumnSumDeviation { .. }));
    }

    #[test]
    fn test_same_value_different_text_gives_two_columns() {
        let lambdas = vec![LambdaColumn::new("0.5", 0.5), LambdaColumn::new("0.50", 0.5)];
        let mut sink = Diagnostics::new();
        let table = generate_probability_table(3, 0.2, 1.0, &lambdas, &mut sink);

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].probabilities, table.columns[1].probabilities);
    }

    #[test]
    fn test_csv_export() {
        let lambdas = vec![LambdaColumn::new("0", 0.0)];
        let mut sink = Diagnostics::new();
        let table = generate_probability_table(2, 0.5, 1.0, &lambdas, &mut sink);

        let csv = table.to_csv_string().unwrap();
        assert_eq!(csv, "k,0\n0,0.25\n1,0.5\n2,0.25\n");
    }

    #[test]
    fn test_row_access() {
        let lambdas = vec![LambdaColumn::new("a", 0.0), LambdaColumn::new("b", 0.0)];
        let mut sink = Diagnostics::new();
        let table = generate_probability_table(1, 0.25, 1.0, &lambdas, &mut sink);

        assert_eq!(table.row(0), Some((0, vec![0.75, 0.75])));
        assert_eq!(table.row(2), None);
    }

    #[test]
    fn test_ragged_table_does_not_panic() {
        let table = ProbabilityTable {
            k: vec![0, 1, 2],
            columns: vec![
                ProbabilityColumn { label: "full".to_string(), lambda: 0.0, probabilities: vec![0.25, 0.5, 0.25] },
                ProbabilityColumn { label: "short".to_string(), lambda: 0.0, probabilities: vec![1.0] },
            ],
        };

        assert_eq!(table.row(0), Some((0, vec![0.25, 1.0])));
        assert_eq!(table.row(1), None);
        assert_eq!(table.to_csv_string().unwrap(), "k,full,short\n0,0.25,1\n1,0.5,\n2,0.25,\n");
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(default_export_file_name(10, 0.2, 1.0), "probability_table_n10_q0.2_t1.0.csv");
        assert_eq!(
            resolve_export_file_name(Some("  "), 10, 0.2, 1.0),
            "probability_table_n10_q0.2_t1.0.csv"
        );
        assert_eq!(resolve_export_file_name(Some("herd"), 10, 0.2, 1.0), "herd.csv");
        assert_eq!(resolve_export_file_name(Some("herd.csv"), 10, 0.2, 1.0), "herd.csv");
    }
}
