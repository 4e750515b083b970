//! Pr{Wt = k}: binomial loss count with an absorbing mass at k = n
//!
//! With probability a = exp(-lambda * t) the count follows binomial(n, q);
//! with probability 1 - a every unit is lost and the count is n.

use crate::combinatorics::{binomial_term, BinomialRow};
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Outcome of evaluating a = exp(-lambda * t)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurvivalProbability {
    /// a is a finite number
    Finite(f64),
    /// exp(-lambda * t) overflowed
    Overflow { lambda_t: f64 },
    /// lambda * t is not a number
    DomainError,
}

impl SurvivalProbability {
    /// a, with overflow and domain errors degraded to 0
    pub fn value_or_zero(self) -> f64 {
        match self {
            SurvivalProbability::Finite(a) => a,
            _ => 0.0,
        }
    }

    /// Record a diagnostic for the degraded cases
    pub fn report(self, label: &str, lambda: f64, t: f64, sink: &mut Diagnostics) {
        match self {
            SurvivalProbability::Finite(_) => {}
            SurvivalProbability::Overflow { lambda_t } => sink.push(Diagnostic::NumericOverflow {
                label: label.to_string(),
                lambda_t,
            }),
            SurvivalProbability::DomainError => sink.push(Diagnostic::DomainError {
                label: label.to_string(),
                lambda,
                t,
            }),
        }
    }
}

/// Compute a = exp(-lambda * t)
pub fn survival_probability(lambda: f64, t: f64) -> SurvivalProbability {
    let lambda_t = lambda * t;
    if lambda_t.is_nan() {
        return SurvivalProbability::DomainError;
    }

    let a = (-lambda_t).exp();
    if a.is_infinite() {
        SurvivalProbability::Overflow { lambda_t }
    } else {
        SurvivalProbability::Finite(a)
    }
}

/// Probability vector Pr{Wt = k} for k = 0..=n
///
/// `label` only names the column in diagnostics. If a cannot be computed the
/// vector is all zeros and a diagnostic is recorded.
pub fn probability_vector(
    n: u32,
    q: f64,
    lambda: f64,
    t: f64,
    label: &str,
    sink: &mut Diagnostics,
) -> Vec<f64> {
    let size = n as usize + 1;

    let a = match survival_probability(lambda, t) {
        SurvivalProbability::Finite(a) => a,
        degraded => {
            degraded.report(label, lambda, t, sink);
            return vec![0.0; size];
        }
    };

    let p = 1.0 - q;
    let mut probabilities = Vec::with_capacity(size);

    for (k, coefficient) in BinomialRow::new(n).enumerate().take(n as usize) {
        probabilities.push(binomial_term(&coefficient, n, k as u32, q, p) * a);
    }
    probabilities.push(q.powi(n as i32) * a + (1.0 - a));

    probabilities
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_survival_probability() {
        assert_eq!(survival_probability(0.0, 5.0), SurvivalProbability::Finite(1.0));
        assert_relative_eq!(
            survival_probability(0.000696, 1.0).value_or_zero(),
            0.999304242,
            max_relative = 1e-8
        );
        assert!(matches!(
            survival_probability(-1000.0, 1.0),
            SurvivalProbability::Overflow { .. }
        ));
        assert_eq!(survival_probability(f64::INFINITY, 0.0), SurvivalProbability::DomainError);
        // Underflow is not an error: a is simply 0
        assert_eq!(survival_probability(1000.0, 1.0), SurvivalProbability::Finite(0.0));
    }

    #[test]
    fn test_vector_shape_and_total() {
        let mut sink = Diagnostics::new();
        let probs = probability_vector(10, 0.2, 0.000696, 1.0, "0.000696", &mut sink);

        assert_eq!(probs.len(), 11);
        assert!(probs.iter().all(|&pr| (-1e-9..=1.0 + 1e-9).contains(&pr)));
        assert_relative_eq!(probs.iter().sum::<f64>(), 1.0, max_relative = 1e-9);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_absorbing_mass_dominates_last_entry() {
        let mut sink = Diagnostics::new();
        let probs = probability_vector(10, 0.2, 0.000696, 1.0, "0.000696", &mut sink);

        let a = (-0.000696f64).exp();
        assert_relative_eq!(probs[10], 0.2f64.powi(10) * a + (1.0 - a), max_relative = 1e-12);
        assert_abs_diff_eq!(probs[10], 0.000696, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_hazard_is_plain_binomial() {
        let mut sink = Diagnostics::new();
        let probs = probability_vector(4, 0.3, 0.0, 2.0, "0", &mut sink);

        let expected = [
            0.7f64.powi(4),
            4.0 * 0.3 * 0.7f64.powi(3),
            6.0 * 0.09 * 0.49,
            4.0 * 0.027 * 0.7,
            0.3f64.powi(4),
        ];
        for (pr, exp) in probs.iter().zip(expected.iter()) {
            assert_relative_eq!(*pr, *exp, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_large_hazard_saturates() {
        let mut sink = Diagnostics::new();
        let probs = probability_vector(6, 0.1, 50.0, 1.0, "50", &mut sink);

        assert_abs_diff_eq!(probs[6], 1.0, epsilon = 1e-12);
        assert!(probs[..6].iter().all(|&pr| pr < 1e-12));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_overflow_returns_zeros() {
        let mut sink = Diagnostics::new();
        let probs = probability_vector(3, 0.5, -800.0, 1.0, "-800", &mut sink);

        assert_eq!(probs, vec![0.0; 4]);
        assert!(matches!(sink.entries()[0], Diagnostic::NumericOverflow { .. }));
    }

    #[test]
    fn test_nan_hazard_returns_zeros() {
        let mut sink = Diagnostics::new();
        let probs = probability_vector(2, 0.5, f64::NAN, 1.0, "nan", &mut sink);

        assert_eq!(probs, vec![0.0; 3]);
        assert!(matches!(sink.entries()[0], Diagnostic::DomainError { .. }));
    }

    #[test]
    fn test_empty_population() {
        let mut sink = Diagnostics::new();
        let probs = probability_vector(0, 0.4, 0.3, 1.0, "0.3", &mut sink);

        // q^0 * a + (1 - a) == 1
        assert_eq!(probs.len(), 1);
        assert_relative_eq!(probs[0], 1.0, max_relative = 1e-15);
    }
}
