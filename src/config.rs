//! Model input configuration
//!
//! Every field has a default, so a JSON file only needs to name the values
//! it changes:
//!
//! ```json
//! { "table": { "n": 20, "lambdas": "0.001,0.002" },
//!   "premium": { "stage2": { "qt": 0.2 } } }
//! ```

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::distribution::{generate_probability_table, parse_lambda_list, ProbabilityTable};
use crate::error::Result;
use crate::premium::{Stage1Inputs, Stage2Inputs, Stage3Inputs};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default hazard rates offered for the probability table
pub const DEFAULT_LAMBDAS: &str = "0.000696,0.000325,0.000128,0.000173";

/// Inputs of the probability table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Herd size (largest loss count)
    #[serde(default = "default_table_n")]
    pub n: i64,

    /// Per-head loss probability
    #[serde(default = "default_table_q")]
    pub q: f64,

    /// Time horizon in years
    #[serde(default = "default_table_t")]
    pub t: f64,

    /// Comma-separated hazard rates, one column each
    #[serde(default = "default_lambdas")]
    pub lambdas: String,
}

fn default_table_n() -> i64 { 10 }
fn default_table_q() -> f64 { 0.2 }
fn default_table_t() -> f64 { 1.0 }
fn default_lambdas() -> String { DEFAULT_LAMBDAS.to_string() }

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            n: default_table_n(),
            q: default_table_q(),
            t: default_table_t(),
            lambdas: default_lambdas(),
        }
    }
}

impl TableConfig {
    /// Parse the lambda list and build the table
    ///
    /// An empty lambda list gives an empty table and an `EmptyLambdaList`
    /// diagnostic; an unparsable item is an error.
    pub fn build_table(&self, sink: &mut Diagnostics) -> Result<ProbabilityTable> {
        let lambdas = parse_lambda_list(&self.lambdas)?;
        if lambdas.is_empty() {
            sink.push(Diagnostic::EmptyLambdaList);
            return Ok(ProbabilityTable::empty());
        }
        Ok(generate_probability_table(self.n, self.q, self.t, &lambdas, sink))
    }
}

/// Inputs of the three premium stages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumConfig {
    pub stage1: Stage1Inputs,
    pub stage2: Stage2Inputs,
    pub stage3: Stage3Inputs,
}

/// Complete model configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub table: TableConfig,
    pub premium: PremiumConfig,
}

impl ModelConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
