//! Livestock Premium - loss distribution and premium model for herd insurance
//!
//! This library provides:
//! - Exact binomial coefficients for large herds
//! - The Pr{Wt = k} table: binomial losses with an absorbing mass at k = n
//! - Windowed loss statistics, risk-loaded premium rate and total premium
//! - A value-type pipeline that runs the premium stages in order
//!
//! Recoverable numeric problems are collected in [`Diagnostics`] instead of
//! being raised as errors.

pub mod combinatorics;
pub mod config;
pub mod diagnostics;
pub mod distribution;
pub mod error;
pub mod format;
pub mod premium;

// Re-export commonly used types
pub use config::{ModelConfig, PremiumConfig, TableConfig};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use distribution::{generate_probability_table, probability_vector, LambdaColumn, ProbabilityTable};
pub use error::{ModelError, Result};
pub use premium::{PipelineReport, PremiumPipeline, WindowedLossStatistics};
