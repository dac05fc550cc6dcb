//! Black-Scholes model for European options on a non-dividend-paying underlying.
//!
//! Provides:
//! - Standard normal CDF/PDF
//! - Closed-form call and put prices
//! - Analytic Greeks

pub mod greeks;
pub mod normal;
pub mod pricing;

pub use greeks::{delta, gamma, greeks, rho, theta, theta_per_day, vega, Greeks, DAYS_PER_YEAR};
pub use normal::{norm_cdf, norm_pdf};
pub use pricing::{
    call_price, d1, d2, intrinsic_value, price, price_upper_bound, put_price, validate_inputs,
};
