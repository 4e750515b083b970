//! Parsing of comma-separated hazard rate lists

use super::table::LambdaColumn;
use crate::error::{ModelError, Result};

/// Parse `"0.000696, 0.000325,..."` into labelled lambda columns
///
/// Labels are the trimmed item text. Repeating the exact same text keeps one
/// column at the first position; an empty input gives an empty list.
pub fn parse_lambda_list(input: &str) -> Result<Vec<LambdaColumn>> {
    let mut columns: Vec<LambdaColumn> = Vec::new();
    if input.is_empty() {
        return Ok(columns);
    }

    for item in input.split(',') {
        let label = item.trim();
        let lambda: f64 = label.parse().map_err(|_| ModelError::LambdaParse {
            item: label.to_string(),
        })?;

        match columns.iter_mut().find(|c| c.label == label) {
            Some(existing) => existing.lambda = lambda,
            None => columns.push(LambdaColumn::new(label, lambda)),
        }
    }

    Ok(columns)
}
