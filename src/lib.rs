//! # bsm-lib: Black-Scholes Pricing, Greeks and Implied Volatility
//!
//! `bsm-lib` evaluates the Black-Scholes formula family for European options on a
//! non-dividend-paying underlying: closed-form call/put prices, analytic Greeks and
//! an implied volatility solver.
//!
//! ## Core Features
//!
//! - **Pricing**: `d1`, `d2`, call and put prices, with the `T = 0` / `sigma = 0`
//!   boundary handled as the discounted intrinsic value
//! - **Greeks**: Delta, Gamma, Vega, Theta (annual and per day) and Rho
//! - **Implied Volatility**: Newton-Raphson with bisection fallback, pure bisection
//!   or Brent's method, all bracketed and bounded by `max_iterations`
//! - **Explicit Errors**: invalid inputs, boundary cases, out-of-range prices and
//!   non-convergence are distinct [`PricingError`] variants, never NaN
//!
//! ## Quick Start
//!
//! ```rust
//! use bsm_lib::{EuropeanOption, SolverConfig};
//!
//! let option = EuropeanOption::call(100.0, 105.0, 0.5, 0.05, 0.25)?;
//! let price = option.price()?;
//! let greeks = option.greeks()?;
//! println!("price {:.4}, delta {:.4}, vega {:.4}", price, greeks.delta, greeks.vega);
//!
//! // Recover the volatility from the price
//! let iv = option.implied_volatility_with(price, &SolverConfig::production())?;
//! assert!((iv.volatility - 0.25).abs() < 1e-6);
//! # Ok::<(), bsm_lib::PricingError>(())
//! ```
//!
//! ## Conventions
//!
//! - Vega is reported per unit volatility and Rho per unit rate (raw partial
//!   derivatives); [`Greeks::vega_per_pct`] and [`Greeks::rho_per_pct`] give the
//!   per-1% figures.
//! - Theta is annualized; `theta_per_day` divides by 365 calendar days.
//!
//! ## Solver Presets
//!
//! See [`default_configs`] for ready-made [`SolverConfig`] values.

// ================================================================================================
// MODULES
// ================================================================================================

pub mod error;
pub mod models;
pub mod option;
pub mod solver;
pub mod visualization;

// ================================================================================================
// IMPORTS
// ================================================================================================

use tracing::debug;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Errors
pub use error::{PricingError, Result};

// Contract types
pub use option::{EuropeanOption, OptionQuote, OptionType};

// Black-Scholes pricing and Greeks
pub use models::bs::{
    call_price, d1, d2, delta, gamma, greeks, intrinsic_value, norm_cdf, norm_pdf, price,
    price_upper_bound, put_price, rho, theta, theta_per_day, validate_inputs, vega, Greeks,
    DAYS_PER_YEAR,
};

// Implied volatility
pub use solver::{implied_volatility, IvResult, SolverConfig, SolverMethod};

// Charts
pub use visualization::{plot_greek_profile, plot_price_profile, GreekKind, PlotConfig};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured implied volatility solver settings.
///
/// # Available Configurations
///
/// - [`standard()`]: 100 iterations, price tolerance 1e-5 (same as `SolverConfig::default()`)
/// - [`production()`]: Price tolerance 1e-8 for pricing and risk systems
/// - [`fast()`]: Reduced iteration budget
/// - [`research()`]: Price tolerance 1e-10 over a wider volatility range
/// - [`minimal()`]: Quick validation settings
pub mod default_configs {
    use crate::solver::SolverConfig;

    /// Default settings: 100 iterations, price tolerance 1e-5, Newton-Raphson
    /// with bisection fallback.
    pub fn standard() -> SolverConfig {
        SolverConfig::default()
    }

    /// Production-grade settings.
    ///
    /// **Characteristics:**
    /// - Maximum iterations: 100
    /// - Price tolerance: 1e-8
    ///
    /// # Example
    ///
    /// ```rust
    /// use bsm_lib::default_configs;
    ///
    /// let config = default_configs::production();
    /// assert_eq!(config.tolerance, 1e-8);
    /// ```
    pub fn production() -> SolverConfig {
        SolverConfig::production()
    }

    /// Default tolerance with at most 50 iterations.
    pub fn fast() -> SolverConfig {
        SolverConfig::fast()
    }

    /// High-precision settings.
    ///
    /// **Characteristics:**
    /// - Maximum iterations: 200
    /// - Price tolerance: 1e-10
    /// - Initial bracket up to 1000% volatility
    pub fn research() -> SolverConfig {
        SolverConfig::research()
    }

    /// Minimal settings for quick checks: 20 iterations, price tolerance 1e-4.
    pub fn minimal() -> SolverConfig {
        SolverConfig::minimal()
    }
}

// ================================================================================================
// BATCH EVALUATION
// ================================================================================================

/// Price a batch of options.
///
/// Each element is evaluated independently; a failing element yields an `Err`
/// in its slot without affecting the others. Results keep the input order.
///
/// # Example
///
/// ```rust
/// use bsm_lib::{price_batch, EuropeanOption};
///
/// let options: Vec<EuropeanOption> = [90.0, 100.0, 110.0]
///     .iter()
///     .map(|&k| EuropeanOption::call(100.0, k, 1.0, 0.05, 0.2))
///     .collect::<Result<_, _>>()?;
///
/// let prices = price_batch(&options);
/// assert!(prices.iter().all(|p| p.is_ok()));
/// # Ok::<(), bsm_lib::PricingError>(())
/// ```
pub fn price_batch(options: &[EuropeanOption]) -> Vec<Result<f64>> {
    let results: Vec<Result<f64>> = options.iter().map(EuropeanOption::price).collect();
    log_failures("price", &results);
    results
}

/// Greeks for a batch of options; options at the `T = 0` / `sigma = 0`
/// boundary yield [`PricingError::UndefinedAtBoundary`] in their slot.
pub fn greeks_batch(options: &[EuropeanOption]) -> Vec<Result<Greeks>> {
    let results: Vec<Result<Greeks>> = options.iter().map(EuropeanOption::greeks).collect();
    log_failures("greeks", &results);
    results
}

/// Implied volatilities for a batch of market quotes, solved with `config`.
pub fn implied_volatility_batch(
    quotes: &[OptionQuote],
    config: &SolverConfig,
) -> Vec<Result<IvResult>> {
    let results: Vec<Result<IvResult>> = quotes
        .iter()
        .map(|quote| quote.implied_volatility(config))
        .collect();
    log_failures("implied volatility", &results);
    results
}

fn log_failures<T>(operation: &str, results: &[Result<T>]) {
    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        debug!(
            operation,
            failed,
            total = results.len(),
            "Batch evaluation had failing elements"
        );
    }
}
