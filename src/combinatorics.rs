//! Exact binomial coefficients
//!
//! Coefficients are computed with arbitrary-precision integers using the
//! multiplicative recurrence C(n, k) = C(n, k-1) * (n - k + 1) / k, so they
//! stay exact well past the point where n! overflows.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::f64::consts::LN_2;

/// Binomial coefficient C(n, k)
///
/// Returns 0 when `k < 0` or `k > n`, and 1 when `k` is 0 or `n`.
/// Iterates over the smaller of `k` and `n - k`.
pub fn combinations(n: i64, k: i64) -> BigUint {
    if k < 0 || k > n {
        return BigUint::zero();
    }
    if k == 0 || k == n {
        return BigUint::one();
    }

    let k = k.min(n - k) as u64;
    let n = n as u64;

    let mut result = BigUint::one();
    for i in 0..k {
        // Each partial product is itself C(n, i + 1), so the division is exact
        result *= n - i;
        result /= i + 1;
    }
    result
}

/// The full row C(n, 0), C(n, 1), ..., C(n, n)
///
/// Each step applies one multiply and one exact divide to the previous
/// coefficient, which is much cheaper than calling [`combinations`] per k.
#[derive(Debug, Clone)]
pub struct BinomialRow {
    n: u64,
    k: u64,
    current: BigUint,
    finished: bool,
}

impl BinomialRow {
    pub fn new(n: u32) -> Self {
        Self {
            n: n as u64,
            k: 0,
            current: BigUint::one(),
            finished: false,
        }
    }
}

impl Iterator for BinomialRow {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        if self.finished {
            return None;
        }

        let value = self.current.clone();
        if self.k == self.n {
            self.finished = true;
        } else {
            self.current *= self.n - self.k;
            self.current /= self.k + 1;
            self.k += 1;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.finished { 0 } else { (self.n - self.k + 1) as usize };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BinomialRow {}

/// Binomial probability term C(n, k) * q^k * p^(n-k)
///
/// When the coefficient is too large for an f64 the product is formed in
/// log space instead.
pub fn binomial_term(coefficient: &BigUint, n: u32, k: u32, q: f64, p: f64) -> f64 {
    let failures = n.saturating_sub(k);

    match coefficient.to_f64() {
        Some(c) if c.is_finite() => c * q.powi(k as i32) * p.powi(failures as i32),
        _ => (ln_biguint(coefficient) + ln_pow(q, k) + ln_pow(p, failures)).exp(),
    }
}

/// Natural log of an arbitrary-precision integer
fn ln_biguint(value: &BigUint) -> f64 {
    let bits = value.bits();
    if bits <= 64 {
        return value.to_f64().map_or(f64::NEG_INFINITY, f64::ln);
    }

    // Keep the top 64 bits as the mantissa
    let shift = bits - 64;
    let top = (value >> shift).to_f64().unwrap_or(f64::NAN);
    top.ln() + shift as f64 * LN_2
}

/// exponent * ln(base), with base^0 == 1 even when base == 0
fn ln_pow(base: f64, exponent: u32) -> f64 {
    if exponent == 0 {
        0.0
    } else {
        exponent as f64 * base.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_values() {
        assert_eq!(combinations(10, 3), BigUint::from(120u32));
        assert_eq!(combinations(52, 5), BigUint::from(2_598_960u32));
        assert_eq!(combinations(100, 1), BigUint::from(100u32));
    }

    #[test]
    fn test_edges() {
        for n in 0..20 {
            assert_eq!(combinations(n, 0), BigUint::one());
            assert_eq!(combinations(n, n), BigUint::one());
            assert_eq!(combinations(n, -1), BigUint::zero());
            assert_eq!(combinations(n, n + 1), BigUint::zero());
        }
        assert_eq!(combinations(-3, 0), BigUint::zero());
    }

    #[test]
    fn test_symmetry() {
        for n in [7i64, 30, 251] {
            for k in 0..=n {
                assert_eq!(combinations(n, k), combinations(n, n - k));
            }
        }
    }

    #[test]
    fn test_exact_beyond_float_range() {
        // Pascal's rule only holds if every digit is exact
        let lhs = combinations(2000, 1000);
        let rhs = combinations(1999, 999) + combinations(1999, 1000);
        assert_eq!(lhs, rhs);
        assert!(lhs.bits() > 1024);
    }

    #[test]
    fn test_row_matches_combinations() {
        let row: Vec<BigUint> = BinomialRow::new(40).collect();
        assert_eq!(row.len(), 41);
        for (k, c) in row.iter().enumerate() {
            assert_eq!(*c, combinations(40, k as i64));
        }

        let single: Vec<BigUint> = BinomialRow::new(0).collect();
        assert_eq!(single, vec![BigUint::one()]);
    }

    #[test]
    fn test_binomial_term_small() {
        let c = combinations(10, 2);
        let term = binomial_term(&c, 10, 2, 0.2, 0.8);
        assert_relative_eq!(term, 45.0 * 0.04 * 0.8f64.powi(8), max_relative = 1e-12);
    }

    #[test]
    fn test_binomial_term_log_space() {
        // Central term of binomial(2000, 0.5) ~ (1 - 1/8000) / sqrt(1000 * pi)
        let c = combinations(2000, 1000);
        let term = binomial_term(&c, 2000, 1000, 0.5, 0.5);
        let expected = (1.0 - 1.0 / 8000.0) / (1000.0 * std::f64::consts::PI).sqrt();
        assert_relative_eq!(term, expected, max_relative = 1e-6);
    }

    #[test]
    fn test_large_row_sums_to_one() {
        let n = 1500;
        let (q, p) = (0.3, 0.7);
        let total: f64 = BinomialRow::new(n)
            .enumerate()
            .map(|(k, c)| binomial_term(&c, n, k as u32, q, p))
            .sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_probability_powers() {
        let c = combinations(5, 0);
        assert_eq!(binomial_term(&c, 5, 0, 0.0, 1.0), 1.0);
        let c = combinations(5, 2);
        assert_eq!(binomial_term(&c, 5, 2, 0.0, 1.0), 0.0);
    }
}
