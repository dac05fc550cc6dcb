//! Standard normal distribution primitives used by every Black-Scholes formula.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Standard normal cumulative distribution function.
///
/// Computed as `0.5 * (1 + erf(x / sqrt(2)))` with `libm::erf`, which keeps
/// the absolute error well below 1e-10 on |x| < 10 and saturates cleanly to
/// 0 or 1 in the tails.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x * FRAC_1_SQRT_2))
}

/// Standard normal probability density function.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}
