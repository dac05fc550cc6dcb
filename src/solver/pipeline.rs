//! Implied volatility root finding.
//!
//! All methods share the same front end: validate the contract, reject target
//! prices outside the no-arbitrage band `[intrinsic, upper bound)` before any
//! iteration, then bracket the root in volatility. Bracketing is always
//! possible inside the band because the Black-Scholes price is strictly
//! increasing in volatility.

#![allow(non_snake_case)]

use std::cell::Cell;

use roots::{find_root_brent, Convergency};
use tracing::{debug, trace, warn};

use crate::error::{PricingError, Result};
use crate::models::bs::greeks::vega_unchecked;
use crate::models::bs::pricing::{
    intrinsic_unchecked, price_unchecked, upper_bound_unchecked, validate_contract,
};
use crate::option::OptionType;
use crate::solver::config::SolverConfig;
use crate::solver::types::{IvResult, SolverMethod};

/// One implied volatility problem: find sigma with `price(sigma) = target`.
struct IvProblem {
    S: f64,
    K: f64,
    T: f64,
    r: f64,
    option_type: OptionType,
    target: f64,
}

impl IvProblem {
    /// Model price minus target price.
    fn residual(&self, sigma: f64) -> f64 {
        price_unchecked(self.S, self.K, self.T, self.r, sigma, self.option_type) - self.target
    }

    fn vega(&self, sigma: f64) -> f64 {
        vega_unchecked(self.S, self.K, self.T, self.r, sigma)
    }

    /// Brenner-Subrahmanyam estimate: sigma ≈ sqrt(2π/T) * price / S.
    fn initial_estimate(&self) -> f64 {
        (2.0 * std::f64::consts::PI / self.T).sqrt() * self.target / self.S
    }
}

/// Volatility interval whose end points straddle the root.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    lo: f64,
    hi: f64,
}

enum BracketOutcome {
    Bracketed(Bracket),
    /// An edge already prices the target within tolerance.
    Edge { sigma: f64, residual: f64 },
}

fn bracket_root(problem: &IvProblem, config: &SolverConfig) -> Result<BracketOutcome> {
    let mut lo = config.min_volatility;
    let mut hi = config.max_volatility;
    let mut f_lo = problem.residual(lo);
    let mut f_hi = problem.residual(hi);

    for _ in 0..config.max_bracket_expansions {
        if f_hi >= 0.0 {
            break;
        }
        lo = hi;
        f_lo = f_hi;
        hi *= 2.0;
        f_hi = problem.residual(hi);
        trace!(hi, f_hi, "Expanded upper volatility bracket");
    }

    for _ in 0..config.max_bracket_expansions {
        if f_lo <= 0.0 {
            break;
        }
        hi = lo;
        f_hi = f_lo;
        lo /= 10.0;
        f_lo = problem.residual(lo);
        trace!(lo, f_lo, "Expanded lower volatility bracket");
    }

    if f_lo.abs() < config.tolerance {
        return Ok(BracketOutcome::Edge {
            sigma: lo,
            residual: f_lo,
        });
    }
    if f_hi.abs() < config.tolerance {
        return Ok(BracketOutcome::Edge {
            sigma: hi,
            residual: f_hi,
        });
    }
    if f_lo > 0.0 || f_hi < 0.0 {
        return Err(PricingError::PriceOutOfRange {
            price: problem.target,
            lower: f_lo + problem.target,
            upper: f_hi + problem.target,
        });
    }

    Ok(BracketOutcome::Bracketed(Bracket { lo, hi }))
}

/// Solve for the volatility that reproduces `option_price`.
///
/// # Arguments
///
/// * `option_price` - Observed price to match, must be > 0
/// * `S`, `K`, `T`, `r` - Spot, strike, time to expiry (years) and rate
/// * `option_type` - Call or put
/// * `config` - Solver settings; [`SolverConfig::default()`] uses 100
///   iterations and a price tolerance of 1e-5
///
/// # Errors
///
/// * [`PricingError::InvalidInput`] for invalid contract inputs, a non-positive
///   price or an unusable configuration
/// * [`PricingError::UndefinedAtBoundary`] when `T = 0` (the price no longer
///   depends on volatility)
/// * [`PricingError::PriceOutOfRange`] when the price is below the discounted
///   intrinsic value or at/above `S` (call) / `K e^{-rT}` (put); raised
///   before any iteration
/// * [`PricingError::NonConvergence`] when `max_iterations` is exhausted
///
/// # Example
///
/// ```rust
/// use bsm_lib::{call_price, implied_volatility, OptionType, SolverConfig};
///
/// let price = call_price(100.0, 105.0, 0.5, 0.05, 0.25)?;
/// let config = SolverConfig::production();
/// let result = implied_volatility(price, 100.0, 105.0, 0.5, 0.05, OptionType::Call, &config)?;
/// assert!((result.volatility - 0.25).abs() < 1e-6);
/// # Ok::<(), bsm_lib::PricingError>(())
/// ```
pub fn implied_volatility(
    option_price: f64,
    S: f64,
    K: f64,
    T: f64,
    r: f64,
    option_type: OptionType,
    config: &SolverConfig,
) -> Result<IvResult> {
    config.validate()?;
    validate_contract(S, K, T, r)?;
    if !option_price.is_finite() || option_price <= 0.0 {
        return Err(PricingError::invalid_input(
            "option_price",
            option_price,
            "target price must be positive and finite",
        ));
    }
    if T == 0.0 {
        return Err(PricingError::at_boundary(
            "implied volatility",
            "time to expiry is zero",
        ));
    }

    let lower = intrinsic_unchecked(S, K, T, r, option_type);
    let upper = upper_bound_unchecked(S, K, T, r, option_type);
    if option_price < lower || option_price >= upper {
        return Err(PricingError::PriceOutOfRange {
            price: option_price,
            lower,
            upper,
        });
    }

    let problem = IvProblem {
        S,
        K,
        T,
        r,
        option_type,
        target: option_price,
    };

    let bracket = match bracket_root(&problem, config)? {
        BracketOutcome::Bracketed(bracket) => bracket,
        BracketOutcome::Edge { sigma, residual } => {
            debug!(sigma, residual, "Target priced at bracket edge");
            return Ok(IvResult {
                volatility: sigma,
                iterations: 0,
                method: config.method,
                residual,
            });
        }
    };

    let result = match config.method {
        SolverMethod::NewtonBisection => newton_bisection(&problem, bracket, config),
        SolverMethod::Bisection => bisection(&problem, bracket, config),
        SolverMethod::Brent => brent(&problem, bracket, config),
    };

    match &result {
        Ok(iv) => debug!(
            method = %iv.method,
            volatility = iv.volatility,
            iterations = iv.iterations,
            "Implied volatility converged"
        ),
        Err(err) => warn!(%err, option_price, S, K, T, r, "Implied volatility failed"),
    }
    result
}

/// The bracket shrank below `volatility_tolerance` without the price matching
/// within `tolerance`: the target cannot be resolved at this precision.
fn bracket_collapsed(
    method: SolverMethod,
    iterations: usize,
    last_estimate: f64,
    residual: f64,
) -> PricingError {
    debug!(
        %method,
        iterations,
        last_estimate,
        residual,
        "Volatility bracket collapsed before the price converged"
    );
    PricingError::NonConvergence {
        method: method.name(),
        iterations,
        last_estimate,
        residual,
    }
}

/// Newton-Raphson safeguarded by a shrinking bisection bracket.
fn newton_bisection(
    problem: &IvProblem,
    bracket: Bracket,
    config: &SolverConfig,
) -> Result<IvResult> {
    let method = SolverMethod::NewtonBisection;
    let Bracket { mut lo, mut hi } = bracket;
    let mut sigma = config
        .initial_guess
        .unwrap_or_else(|| problem.initial_estimate())
        .clamp(lo, hi);
    let mut residual = f64::NAN;

    for iteration in 1..=config.max_iterations {
        residual = problem.residual(sigma);
        trace!(iteration, sigma, residual, "Newton iteration");

        if residual.abs() < config.tolerance {
            return Ok(IvResult {
                volatility: sigma,
                iterations: iteration,
                method,
                residual,
            });
        }

        // Price is increasing in sigma, so the sign of the residual tells
        // which side of the root we are on.
        if residual > 0.0 {
            hi = sigma;
        } else {
            lo = sigma;
        }
        if hi - lo < config.volatility_tolerance {
            return Err(bracket_collapsed(method, iteration, 0.5 * (lo + hi), residual));
        }

        let vega = problem.vega(sigma);
        let newton = sigma - residual / vega;
        let inside = newton.is_finite() && newton > lo && newton < hi;
        sigma = if vega > config.min_vega && inside {
            newton
        } else {
            trace!(vega, newton, lo, hi, "Newton step rejected, bisecting");
            0.5 * (lo + hi)
        };
    }

    Err(PricingError::NonConvergence {
        method: method.name(),
        iterations: config.max_iterations,
        last_estimate: sigma,
        residual,
    })
}

/// Plain bisection on the bracket.
fn bisection(problem: &IvProblem, bracket: Bracket, config: &SolverConfig) -> Result<IvResult> {
    let method = SolverMethod::Bisection;
    let Bracket { mut lo, mut hi } = bracket;
    let mut mid = 0.5 * (lo + hi);
    let mut residual = f64::NAN;

    for iteration in 1..=config.max_iterations {
        mid = 0.5 * (lo + hi);
        residual = problem.residual(mid);

        if residual.abs() < config.tolerance {
            return Ok(IvResult {
                volatility: mid,
                iterations: iteration,
                method,
                residual,
            });
        }
        if 0.5 * (hi - lo) < config.volatility_tolerance {
            return Err(bracket_collapsed(method, iteration, mid, residual));
        }

        if residual > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Err(PricingError::NonConvergence {
        method: method.name(),
        iterations: config.max_iterations,
        last_estimate: mid,
        residual,
    })
}

/// Stopping rule handed to `roots`: price tolerance, volatility tolerance and
/// iteration budget from the solver configuration.
struct PriceConvergency {
    price_tolerance: f64,
    volatility_tolerance: f64,
    max_iterations: usize,
    iterations: usize,
}

impl Convergency<f64> for PriceConvergency {
    fn is_root_found(&mut self, y: f64) -> bool {
        y.abs() < self.price_tolerance
    }

    fn is_converged(&mut self, x1: f64, x2: f64) -> bool {
        (x1 - x2).abs() < self.volatility_tolerance
    }

    fn is_iteration_limit_reached(&mut self, iter: usize) -> bool {
        self.iterations = iter;
        iter >= self.max_iterations
    }
}

/// Brent's method via the `roots` crate.
fn brent(problem: &IvProblem, bracket: Bracket, config: &SolverConfig) -> Result<IvResult> {
    let method = SolverMethod::Brent;
    let last_sigma = Cell::new(f64::NAN);
    let objective = |sigma: f64| {
        last_sigma.set(sigma);
        problem.residual(sigma)
    };
    let mut convergency = PriceConvergency {
        price_tolerance: config.tolerance,
        volatility_tolerance: config.volatility_tolerance,
        max_iterations: config.max_iterations,
        iterations: 0,
    };

    match find_root_brent(bracket.lo, bracket.hi, &objective, &mut convergency) {
        Ok(sigma) => {
            let residual = problem.residual(sigma);
            let iterations = convergency.iterations.max(1);
            // `roots` also stops once the bracket is narrower than the
            // volatility tolerance, which does not imply a matched price.
            if residual.abs() >= config.tolerance {
                return Err(bracket_collapsed(method, iterations, sigma, residual));
            }
            Ok(IvResult {
                volatility: sigma,
                iterations,
                method,
                residual,
            })
        }
        Err(err) => {
            let last_estimate = last_sigma.get();
            debug!(?err, last_estimate, "Brent search stopped");
            Err(PricingError::NonConvergence {
                method: method.name(),
                iterations: convergency.iterations,
                last_estimate,
                residual: problem.residual(last_estimate),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bs::pricing::price;

    const TOLERANCE: f64 = 1e-4;

    fn solve(
        target_vol: f64,
        S: f64,
        K: f64,
        T: f64,
        r: f64,
        option_type: OptionType,
        method: SolverMethod,
    ) -> f64 {
        let market_price = price(S, K, T, r, target_vol, option_type).unwrap();
        let config = SolverConfig::production().with_method(method);
        implied_volatility(market_price, S, K, T, r, option_type, &config)
            .unwrap()
            .volatility
    }

    #[test]
    fn test_methods_recover_volatility() {
        for method in [
            SolverMethod::NewtonBisection,
            SolverMethod::Bisection,
            SolverMethod::Brent,
        ] {
            for (S, K, option_type) in [
                (100.0, 100.0, OptionType::Call),
                (100.0, 120.0, OptionType::Call),
                (110.0, 100.0, OptionType::Put),
                (90.0, 100.0, OptionType::Put),
            ] {
                let iv = solve(0.3, S, K, 0.5, 0.05, option_type, method);
                assert!(
                    (iv - 0.3).abs() < TOLERANCE,
                    "{} failed for S={} K={} {}: {}",
                    method,
                    S,
                    K,
                    option_type,
                    iv
                );
            }
        }
    }

    #[test]
    fn test_high_volatility_needs_bracket_expansion() {
        let iv = solve(
            7.5,
            100.0,
            100.0,
            1.0,
            0.0,
            OptionType::Call,
            SolverMethod::NewtonBisection,
        );
        assert!((iv - 7.5).abs() < TOLERANCE, "iv = {}", iv);
    }

    #[test]
    fn test_initial_estimate_is_reasonable() {
        let problem = IvProblem {
            S: 100.0,
            K: 100.0,
            T: 0.25,
            r: 0.0,
            option_type: OptionType::Call,
            target: price(100.0, 100.0, 0.25, 0.0, 0.25, OptionType::Call).unwrap(),
        };
        let guess = problem.initial_estimate();
        assert!((guess - 0.25).abs() < 0.01, "guess = {}", guess);
    }

    #[test]
    fn test_newton_converges_quickly() {
        let market_price = price(100.0, 100.0, 0.25, 0.05, 0.25, OptionType::Call).unwrap();
        let result = implied_volatility(
            market_price,
            100.0,
            100.0,
            0.25,
            0.05,
            OptionType::Call,
            &SolverConfig::production(),
        )
        .unwrap();
        assert!(result.iterations <= 10, "iterations = {}", result.iterations);
        assert!(result.residual.abs() < 1e-8);
    }

    #[test]
    fn test_collapsed_bracket_is_not_converged() {
        let market_price = price(100.0, 100.0, 1.0, 0.05, 0.3, OptionType::Call).unwrap();
        let coarse = SolverConfig {
            volatility_tolerance: 0.5,
            ..SolverConfig::default()
        };

        let bisect = coarse.clone().with_method(SolverMethod::Bisection);
        match implied_volatility(market_price, 100.0, 100.0, 1.0, 0.05, OptionType::Call, &bisect) {
            Err(PricingError::NonConvergence {
                method,
                iterations,
                last_estimate,
                residual,
            }) => {
                assert_eq!(method, "bisection");
                assert_eq!(iterations, 4);
                assert!((last_estimate - 0.3125).abs() < 1e-5, "estimate {}", last_estimate);
                assert!(residual.abs() >= bisect.tolerance);
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }

        // A huge vega threshold turns every Newton step into bisection.
        let mut newton = coarse.with_method(SolverMethod::NewtonBisection);
        newton.min_vega = 1e12;
        let err = implied_volatility(market_price, 100.0, 100.0, 1.0, 0.05, OptionType::Call, &newton)
            .unwrap_err();
        assert!(err.is_non_convergence(), "{:?}", err);
    }
}
