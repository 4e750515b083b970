//! Stage 1: expectation and standard deviation of the windowed loss count
//!
//! Losses between the deductible `d` and the cap `u` count at unit weight
//! (l = 1..u-1-d); reaching `u` or more, or the absorbing event, pays a
//! flat `alpha * (u - d)`.

use crate::combinatorics::{binomial_term, BinomialRow};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::distribution::survival_probability;
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// E[Wt(d,u)] and StdDev[Wt(d,u)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowedLossStatistics {
    pub expectation: f64,
    pub std_dev: f64,
}

/// Windowed loss statistics from a precomputed a = exp(-lambda * t)
///
/// No range checks are made here: an empty l-range contributes nothing,
/// and `u > n` skips the upper tail. A negative variance from round-off is
/// replaced by its absolute value and recorded in `sink`.
///
/// Both sums read from one walk along the binomial row C(n, 0..=n).
pub fn windowed_statistics(
    a: f64,
    n: u32,
    d: u32,
    u: u32,
    q: f64,
    alpha: f64,
    sink: &mut Diagnostics,
) -> WindowedLossStatistics {
    let p = 1.0 - q;
    let (d, u, population) = (d as i64, u as i64, n as i64);

    // l = 1..=u-1-d maps to loss counts d+1..=u-1
    let upper_ell = u - 1 - d;
    let has_tail = u <= population;
    let last_needed = if has_tail {
        population
    } else {
        (d + upper_ell).min(population)
    };

    let mut sum_ell = 0.0;
    let mut sum_ell_sq = 0.0;
    let mut tail = 0.0;

    if last_needed >= 0 {
        let row = BinomialRow::new(n).take(last_needed as usize + 1);
        for (losses, coefficient) in row.enumerate() {
            let losses = losses as i64;
            let ell = losses - d;
            let in_window = ell >= 1 && ell <= upper_ell;
            let in_tail = has_tail && losses >= u;
            if !in_window && !in_tail {
                continue;
            }

            let term = binomial_term(&coefficient, n, losses as u32, q, p);
            if in_window {
                let ell = ell as f64;
                sum_ell += ell * term;
                sum_ell_sq += ell * ell * term;
            }
            if in_tail {
                tail += term;
            }
        }
    }

    let width = (u - d) as f64;
    let capped_mass = a * tail + (1.0 - a);

    let expectation = a * sum_ell + alpha * width * capped_mass;
    let second_moment = a * sum_ell_sq + alpha * alpha * width * width * capped_mass;
    let variance = second_moment - expectation * expectation;

    if variance < 0.0 {
        sink.push(Diagnostic::VarianceCancellation { variance });
    }

    WindowedLossStatistics {
        expectation,
        std_dev: variance.abs().sqrt(),
    }
}

/// Stage 1 inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage1Inputs {
    /// Hazard rate of the absorbing event
    pub lambda: f64,
    /// Time horizon (years)
    pub t: f64,
    /// Herd size
    pub n: u32,
    /// Lower window bound (deductible count)
    pub d: u32,
    /// Upper window bound
    pub u: u32,
    /// Per-head loss probability
    pub q: f64,
    /// Severity multiplier applied at or beyond u
    pub alpha: f64,
}

impl Default for Stage1Inputs {
    fn default() -> Self {
        Self {
            lambda: 0.01,
            t: 1.0,
            n: 100,
            d: 5,
            u: 10,
            q: 0.005,
            alpha: 0.5,
        }
    }
}

impl Stage1Inputs {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.q) {
            return Err(ModelError::invalid("q", self.q, "must lie in [0, 1]"));
        }
        if self.n == 0 {
            return Err(ModelError::invalid("n", 0.0, "must be a positive integer"));
        }
        if self.d > self.n {
            return Err(ModelError::invalid("d", self.d as f64, "must lie in [0, n]"));
        }
        if self.u > self.n {
            return Err(ModelError::invalid("u", self.u as f64, "must lie in [0, n]"));
        }
        if self.d > self.u {
            return Err(ModelError::InvalidWindow {
                d: self.d as i64,
                u: self.u as i64,
            });
        }
        if self.t.is_nan() || self.t < 0.0 {
            return Err(ModelError::invalid("t", self.t, "must be non-negative"));
        }
        if self.lambda.is_nan() {
            return Err(ModelError::invalid("lambda", self.lambda, "must be a number"));
        }
        if !self.alpha.is_finite() {
            return Err(ModelError::invalid("alpha", self.alpha, "must be finite"));
        }
        Ok(())
    }

    /// Validate, then compute the statistics
    ///
    /// If exp(-lambda * t) overflows, `a` is taken as 0 and the overflow is
    /// recorded in `sink`.
    pub fn evaluate(&self, sink: &mut Diagnostics) -> Result<WindowedLossStatistics> {
        self.validate()?;

        let survival = survival_probability(self.lambda, self.t);
        survival.report("stage 1", self.lambda, self.t, sink);
        let a = survival.value_or_zero();

        Ok(windowed_statistics(
            a,
            self.n,
            self.d,
            self.u,
            self.q,
            self.alpha,
            sink,
        ))
    }
}
