//! Stage 2 (risk-loaded rate) and Stage 3 (total premium)

use super::windowed::WindowedLossStatistics;
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Risk-loaded premium rate per insured head
///
/// `((1 + rho + eta) * E + StdDev) / ((1 - QT) * n)`
pub fn premium_rate(
    rho: f64,
    eta: f64,
    qt: f64,
    n: u32,
    expectation: f64,
    std_dev: f64,
) -> Result<f64> {
    let denominator = (1.0 - qt) * n as f64;
    if denominator == 0.0 {
        return Err(ModelError::DivisionByZero { qt, n });
    }

    Ok(((1.0 + rho + eta) * expectation + std_dev) / denominator)
}

/// Total premium for the herd: rate * n * unit price
pub fn total_premium(premium_rate: f64, n: u32, unit_price: f64) -> f64 {
    premium_rate * n as f64 * unit_price
}

/// Stage 2 loadings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage2Inputs {
    /// Risk loading
    pub rho: f64,
    /// Expense loading
    pub eta: f64,
    /// Target loss ratio
    pub qt: f64,
}

impl Default for Stage2Inputs {
    fn default() -> Self {
        Self {
            rho: 0.05,
            eta: 0.02,
            qt: 0.1,
        }
    }
}

impl Stage2Inputs {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.qt) {
            return Err(ModelError::invalid("QT", self.qt, "must lie in [0, 1]"));
        }
        Ok(())
    }

    pub fn evaluate(&self, n: u32, statistics: &WindowedLossStatistics) -> Result<f64> {
        self.validate()?;
        premium_rate(
            self.rho,
            self.eta,
            self.qt,
            n,
            statistics.expectation,
            statistics.std_dev,
        )
    }
}

/// Stage 3 pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage3Inputs {
    /// Price of one insured animal
    pub unit_price: f64,
}

impl Default for Stage3Inputs {
    fn default() -> Self {
        Self {
            unit_price: 1_000_000.0,
        }
    }
}

impl Stage3Inputs {
    pub fn validate(&self) -> Result<()> {
        if self.unit_price.is_nan() || self.unit_price < 0.0 {
            return Err(ModelError::invalid("unit_price", self.unit_price, "must be non-negative"));
        }
        Ok(())
    }

    pub fn evaluate(&self, premium_rate: f64, n: u32) -> Result<f64> {
        self.validate()?;
        Ok(total_premium(premium_rate, n, self.unit_price))
    }
}
