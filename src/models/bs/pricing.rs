//! Black-Scholes closed-form prices for European calls and puts.
//!
//! Inputs follow the textbook notation: `S` spot, `K` strike, `T` time to
//! expiry in years, `r` continuously-compounded rate, `sigma` annualized
//! volatility. At `T = 0` or `sigma = 0` the price collapses to the
//! discounted intrinsic value `max(S - K e^{-rT}, 0)` (resp. the put analogue).

#![allow(non_snake_case)]

use super::normal::norm_cdf;
use crate::error::{PricingError, Result};
use crate::option::OptionType;

/// Validates the contract-level inputs shared by pricing, Greeks and the solver.
pub(crate) fn validate_contract(S: f64, K: f64, T: f64, r: f64) -> Result<()> {
    if !S.is_finite() || S <= 0.0 {
        return Err(PricingError::invalid_input(
            "S",
            S,
            "spot price must be positive and finite",
        ));
    }
    if !K.is_finite() || K <= 0.0 {
        return Err(PricingError::invalid_input(
            "K",
            K,
            "strike price must be positive and finite",
        ));
    }
    if !T.is_finite() || T < 0.0 {
        return Err(PricingError::invalid_input(
            "T",
            T,
            "time to expiry must be non-negative and finite",
        ));
    }
    if !r.is_finite() {
        return Err(PricingError::invalid_input(
            "r",
            r,
            "risk-free rate must be finite",
        ));
    }
    Ok(())
}

pub(crate) fn validate_volatility(sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(PricingError::invalid_input(
            "sigma",
            sigma,
            "volatility must be non-negative and finite",
        ));
    }
    Ok(())
}

/// Checks every Black-Scholes input without evaluating anything.
pub fn validate_inputs(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<()> {
    validate_contract(S, K, T, r)?;
    validate_volatility(sigma)
}

/// True when `sigma √T` is zero, including products that underflow.
pub(crate) fn is_boundary(T: f64, sigma: f64) -> bool {
    sigma * T.sqrt() == 0.0
}

pub(crate) fn boundary_reason(T: f64, sigma: f64) -> &'static str {
    if T == 0.0 {
        "time to expiry is zero"
    } else if sigma == 0.0 {
        "volatility is zero"
    } else {
        "sigma * sqrt(T) underflows to zero"
    }
}

pub(crate) fn d1_unchecked(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> f64 {
    ((S / K).ln() + (r + 0.5 * sigma * sigma) * T) / (sigma * T.sqrt())
}

/// `d1 = (ln(S/K) + (r + sigma²/2) T) / (sigma √T)`.
///
/// Fails with [`PricingError::UndefinedAtBoundary`] when `T = 0`, `sigma = 0`
/// or `sigma √T` is too small to represent.
pub fn d1(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<f64> {
    validate_inputs(S, K, T, r, sigma)?;
    if is_boundary(T, sigma) {
        return Err(PricingError::at_boundary("d1", boundary_reason(T, sigma)));
    }
    Ok(d1_unchecked(S, K, T, r, sigma))
}

/// `d2 = d1 - sigma √T`.
pub fn d2(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<f64> {
    validate_inputs(S, K, T, r, sigma)?;
    if is_boundary(T, sigma) {
        return Err(PricingError::at_boundary("d2", boundary_reason(T, sigma)));
    }
    Ok(d1_unchecked(S, K, T, r, sigma) - sigma * T.sqrt())
}

/// Discounted intrinsic value, i.e. the price in the `T = 0` / `sigma = 0` limit.
pub(crate) fn intrinsic_unchecked(S: f64, K: f64, T: f64, r: f64, option_type: OptionType) -> f64 {
    let discounted_strike = K * (-r * T).exp();
    match option_type {
        OptionType::Call => (S - discounted_strike).max(0.0),
        OptionType::Put => (discounted_strike - S).max(0.0),
    }
}

/// Supremum of the model price over all volatilities: `S` for a call, `K e^{-rT}` for a put.
pub(crate) fn upper_bound_unchecked(S: f64, K: f64, T: f64, r: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => S,
        OptionType::Put => K * (-r * T).exp(),
    }
}

/// Price assuming the inputs were already validated.
pub(crate) fn price_unchecked(
    S: f64,
    K: f64,
    T: f64,
    r: f64,
    sigma: f64,
    option_type: OptionType,
) -> f64 {
    if is_boundary(T, sigma) {
        return intrinsic_unchecked(S, K, T, r, option_type);
    }

    let sqrt_t = T.sqrt();
    let d1 = d1_unchecked(S, K, T, r, sigma);
    let d2 = d1 - sigma * sqrt_t;
    let discounted_strike = K * (-r * T).exp();

    let price = match option_type {
        OptionType::Call => S * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
        OptionType::Put => discounted_strike * norm_cdf(-d2) - S * norm_cdf(-d1),
    };

    // Cancellation deep out of the money can leave a few ulps below zero.
    price.max(0.0)
}

/// Black-Scholes price of a European option.
pub fn price(S: f64, K: f64, T: f64, r: f64, sigma: f64, option_type: OptionType) -> Result<f64> {
    validate_inputs(S, K, T, r, sigma)?;
    Ok(price_unchecked(S, K, T, r, sigma, option_type))
}

/// `C = S N(d1) - K e^{-rT} N(d2)`.
pub fn call_price(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<f64> {
    price(S, K, T, r, sigma, OptionType::Call)
}

/// `P = K e^{-rT} N(-d2) - S N(-d1)`.
pub fn put_price(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<f64> {
    price(S, K, T, r, sigma, OptionType::Put)
}

/// Discounted intrinsic value `max(S - K e^{-rT}, 0)` for calls, `max(K e^{-rT} - S, 0)` for puts.
///
/// This is the lowest price the model can produce for any volatility.
pub fn intrinsic_value(S: f64, K: f64, T: f64, r: f64, option_type: OptionType) -> Result<f64> {
    validate_contract(S, K, T, r)?;
    Ok(intrinsic_unchecked(S, K, T, r, option_type))
}

/// Upper no-arbitrage bound of the model price (approached as `sigma -> inf`).
pub fn price_upper_bound(S: f64, K: f64, T: f64, r: f64, option_type: OptionType) -> Result<f64> {
    validate_contract(S, K, T, r)?;
    Ok(upper_bound_unchecked(S, K, T, r, option_type))
}
