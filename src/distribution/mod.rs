//! Component A: the Pr{Wt = k} probability table engine
//!
//! - [`probability_vector`] evaluates the distribution for one hazard rate
//! - [`generate_probability_table`] assembles one column per labelled rate
//! - [`parse_lambda_list`] turns comma-separated user input into labelled rates

mod kernel;
mod lambdas;
mod table;

pub use kernel::{probability_vector, survival_probability, SurvivalProbability};
pub use lambdas::parse_lambda_list;
pub use table::{
    default_export_file_name, generate_probability_table, resolve_export_file_name,
    ColumnSummary, LambdaColumn, ProbabilityColumn, ProbabilityTable, COLUMN_SUM_TOLERANCE,
    EXPORT_SIGNIFICANT_DIGITS,
};
