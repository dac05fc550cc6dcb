//! Analytic Black-Scholes Greeks.
//!
//! Conventions used throughout the crate:
//! - Vega is the raw partial derivative per unit of volatility (1.0 = 100 vol points).
//! - Rho is the raw partial derivative per unit of rate.
//! - Theta is annualized; `theta_per_day` divides it by 365 calendar days.
//!
//! Every Greek involves `d1`/`d2` and therefore fails with
//! [`PricingError::UndefinedAtBoundary`] at `T = 0` or `sigma = 0`.

#![allow(non_snake_case)]

use std::collections::BTreeMap;

use super::normal::{norm_cdf, norm_pdf};
use super::pricing::{boundary_reason, d1_unchecked, is_boundary, validate_inputs};
use crate::error::{PricingError, Result};
use crate::option::OptionType;

/// Calendar days used to turn annualized theta into a daily figure.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// First-order sensitivities of a European option.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
    /// dV/dS
    pub delta: f64,
    /// d²V/dS²
    pub gamma: f64,
    /// dV/dσ per unit volatility
    pub vega: f64,
    /// dV/dt, annualized
    pub theta: f64,
    /// Theta per calendar day
    pub theta_per_day: f64,
    /// dV/dr per unit rate
    pub rho: f64,
}

impl Greeks {
    /// Keys of [`Greeks::to_map`], in reporting order.
    pub const KEYS: [&'static str; 6] = ["delta", "gamma", "vega", "theta", "theta_per_day", "rho"];

    /// Vega for a one-point (1%) move in volatility.
    pub fn vega_per_pct(&self) -> f64 {
        self.vega / 100.0
    }

    /// Rho for a one-point (1%) move in the rate.
    pub fn rho_per_pct(&self) -> f64 {
        self.rho / 100.0
    }

    /// Named mapping of every Greek.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        Self::KEYS
            .iter()
            .zip([
                self.delta,
                self.gamma,
                self.vega,
                self.theta,
                self.theta_per_day,
                self.rho,
            ])
            .map(|(k, v)| (*k, v))
            .collect()
    }
}

/// Shared intermediate terms for one evaluation point.
struct Terms {
    sqrt_t: f64,
    d1: f64,
    d2: f64,
    discounted_strike: f64,
}

fn terms(quantity: &'static str, S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<Terms> {
    validate_inputs(S, K, T, r, sigma)?;
    if is_boundary(T, sigma) {
        return Err(PricingError::at_boundary(quantity, boundary_reason(T, sigma)));
    }
    let sqrt_t = T.sqrt();
    let d1 = d1_unchecked(S, K, T, r, sigma);
    Ok(Terms {
        sqrt_t,
        d1,
        d2: d1 - sigma * sqrt_t,
        discounted_strike: K * (-r * T).exp(),
    })
}

fn delta_from(t: &Terms, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => norm_cdf(t.d1),
        OptionType::Put => norm_cdf(t.d1) - 1.0,
    }
}

fn gamma_from(t: &Terms, S: f64, sigma: f64) -> f64 {
    norm_pdf(t.d1) / (S * sigma * t.sqrt_t)
}

fn vega_from(t: &Terms, S: f64) -> f64 {
    S * norm_pdf(t.d1) * t.sqrt_t
}

fn theta_from(t: &Terms, S: f64, r: f64, sigma: f64, option_type: OptionType) -> f64 {
    let decay = -(S * norm_pdf(t.d1) * sigma) / (2.0 * t.sqrt_t);
    match option_type {
        OptionType::Call => decay - r * t.discounted_strike * norm_cdf(t.d2),
        OptionType::Put => decay + r * t.discounted_strike * norm_cdf(-t.d2),
    }
}

fn rho_from(t: &Terms, T: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => t.discounted_strike * T * norm_cdf(t.d2),
        OptionType::Put => -t.discounted_strike * T * norm_cdf(-t.d2),
    }
}

/// Delta: `N(d1)` for calls, `N(d1) - 1` for puts.
pub fn delta(S: f64, K: f64, T: f64, r: f64, sigma: f64, option_type: OptionType) -> Result<f64> {
    let t = terms("delta", S, K, T, r, sigma)?;
    Ok(delta_from(&t, option_type))
}

/// Gamma: `n(d1) / (S sigma √T)`, identical for calls and puts.
pub fn gamma(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<f64> {
    let t = terms("gamma", S, K, T, r, sigma)?;
    Ok(gamma_from(&t, S, sigma))
}

/// Vega: `S n(d1) √T` per unit volatility, identical for calls and puts.
pub fn vega(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<f64> {
    let t = terms("vega", S, K, T, r, sigma)?;
    Ok(vega_from(&t, S))
}

/// Annualized theta.
pub fn theta(S: f64, K: f64, T: f64, r: f64, sigma: f64, option_type: OptionType) -> Result<f64> {
    let t = terms("theta", S, K, T, r, sigma)?;
    Ok(theta_from(&t, S, r, sigma, option_type))
}

/// Theta per calendar day (`theta / 365`).
pub fn theta_per_day(
    S: f64,
    K: f64,
    T: f64,
    r: f64,
    sigma: f64,
    option_type: OptionType,
) -> Result<f64> {
    Ok(theta(S, K, T, r, sigma, option_type)? / DAYS_PER_YEAR)
}

/// Rho per unit rate: `K T e^{-rT} N(d2)` for calls, `-K T e^{-rT} N(-d2)` for puts.
pub fn rho(S: f64, K: f64, T: f64, r: f64, sigma: f64, option_type: OptionType) -> Result<f64> {
    let t = terms("rho", S, K, T, r, sigma)?;
    Ok(rho_from(&t, T, option_type))
}

/// All Greeks at once, sharing a single `d1`/`d2` evaluation.
pub fn greeks(
    S: f64,
    K: f64,
    T: f64,
    r: f64,
    sigma: f64,
    option_type: OptionType,
) -> Result<Greeks> {
    let t = terms("greeks", S, K, T, r, sigma)?;
    let theta = theta_from(&t, S, r, sigma, option_type);
    Ok(Greeks {
        delta: delta_from(&t, option_type),
        gamma: gamma_from(&t, S, sigma),
        vega: vega_from(&t, S),
        theta,
        theta_per_day: theta / DAYS_PER_YEAR,
        rho: rho_from(&t, T, option_type),
    })
}

/// Vega without validation or boundary checks; zero at the boundary.
///
/// Used by the implied-volatility iteration, which has validated its inputs
/// and treats a vanishing vega as a signal to bisect.
pub(crate) fn vega_unchecked(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> f64 {
    if is_boundary(T, sigma) {
        return 0.0;
    }
    S * norm_pdf(d1_unchecked(S, K, T, r, sigma)) * T.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_match_aggregate() {
        let g = greeks(100.0, 110.0, 0.75, 0.03, 0.3, OptionType::Put).unwrap();
        assert_eq!(g.delta, delta(100.0, 110.0, 0.75, 0.03, 0.3, OptionType::Put).unwrap());
        assert_eq!(g.gamma, gamma(100.0, 110.0, 0.75, 0.03, 0.3).unwrap());
        assert_eq!(g.vega, vega(100.0, 110.0, 0.75, 0.03, 0.3).unwrap());
        assert_eq!(g.theta, theta(100.0, 110.0, 0.75, 0.03, 0.3, OptionType::Put).unwrap());
        assert_eq!(g.rho, rho(100.0, 110.0, 0.75, 0.03, 0.3, OptionType::Put).unwrap());
        assert!((g.theta_per_day * DAYS_PER_YEAR - g.theta).abs() < 1e-12);
    }

    #[test]
    fn test_map_keys() {
        let g = greeks(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Call).unwrap();
        let map = g.to_map();
        assert_eq!(map.len(), 6);
        for key in Greeks::KEYS {
            assert!(map.contains_key(key), "missing key {}", key);
        }
        assert_eq!(map["vega"], g.vega);
        assert_eq!(map["theta_per_day"], g.theta_per_day);
    }

    #[test]
    fn test_boundary_errors() {
        for sigma in [0.0, 0.2] {
            let T = if sigma == 0.0 { 1.0 } else { 0.0 };
            assert!(gamma(100.0, 100.0, T, 0.05, sigma).unwrap_err().is_boundary());
            assert!(vega(100.0, 100.0, T, 0.05, sigma).unwrap_err().is_boundary());
            assert!(theta(100.0, 100.0, T, 0.05, sigma, OptionType::Call)
                .unwrap_err()
                .is_boundary());
            assert!(greeks(100.0, 100.0, T, 0.05, sigma, OptionType::Put)
                .unwrap_err()
                .is_boundary());
        }
        assert_eq!(vega_unchecked(100.0, 100.0, 0.0, 0.05, 0.2), 0.0);
        assert_eq!(vega_unchecked(100.0, 100.0, 1e-300, 0.05, 1e-200), 0.0);
    }

    #[test]
    fn test_per_pct_scaling() {
        let g = greeks(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Call).unwrap();
        assert!((g.vega_per_pct() * 100.0 - g.vega).abs() < 1e-12);
        assert!((g.rho_per_pct() * 100.0 - g.rho).abs() < 1e-12);
    }
}
