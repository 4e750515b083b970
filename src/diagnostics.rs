//! Caller-visible record of degraded computations
//!
//! Numeric problems that the model recovers from locally (zeroed columns,
//! clamped variance, column totals drifting away from 1) are never dropped:
//! each one is pushed into a [`Diagnostics`] sink owned by the caller and is
//! also emitted through the `log` facade.

use serde::Serialize;
use std::fmt;

/// A single recovered condition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Top-level table parameters rejected; no table was produced
    InvalidParameter { name: &'static str, value: f64 },

    /// No lambda values were supplied; no table was produced
    EmptyLambdaList,

    /// Negative hazard rate; the column was filled with zeros
    NegativeHazard { label: String, lambda: f64 },

    /// exp(-lambda * t) out of range; the column was filled with zeros
    /// (or `a` taken as 0 in the windowed statistics)
    NumericOverflow { label: String, lambda_t: f64 },

    /// exp(-lambda * t) not a number; the column was filled with zeros
    DomainError { label: String, lambda: f64, t: f64 },

    /// Computed variance below zero from round-off; absolute value used
    VarianceCancellation { variance: f64 },

    /// Column total not within relative 1e-9 of 1.0
    ColumnSumDeviation { label: String, total: f64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {} = {}; no table produced", name, value)
            }
            Diagnostic::EmptyLambdaList => {
                write!(f, "no lambda values supplied; no table produced")
            }
            Diagnostic::NegativeHazard { label, lambda } => {
                write!(f, "lambda '{}' = {} is negative; column filled with zeros", label, lambda)
            }
            Diagnostic::NumericOverflow { label, lambda_t } => write!(
                f,
                "lambda * t = {} for '{}' overflows exp(-lambda * t); probabilities set to 0",
                lambda_t, label
            ),
            Diagnostic::DomainError { label, lambda, t } => write!(
                f,
                "exp(-lambda * t) undefined for '{}' (lambda = {}, t = {}); probabilities set to 0",
                label, lambda, t
            ),
            Diagnostic::VarianceCancellation { variance } => write!(
                f,
                "computed variance {:e} is negative (floating-point cancellation); using its absolute value",
                variance
            ),
            Diagnostic::ColumnSumDeviation { label, total } => write!(
                f,
                "column '{}': total probability {:.10} is not close to 1.0",
                label, total
            ),
        }
    }
}

/// Ordered collection of diagnostics produced during one invocation
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it as a warning
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Whether any entry matches the predicate
    pub fn any(&self, predicate: impl Fn(&Diagnostic) -> bool) -> bool {
        self.entries.iter().any(predicate)
    }
}
