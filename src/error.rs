//! Error types for pricing, Greeks and implied volatility.
//!
//! Every numeric entry point returns [`Result`], so a caller can always tell a
//! rejected input, a boundary case, an out-of-range target price and an
//! exhausted solver apart.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A scalar input violates the domain of the model.
    #[error("Invalid input: {param} = {value} ({reason})")]
    InvalidInput {
        param: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid input: unrecognized option type {0:?} (expected \"call\" or \"put\")")]
    UnknownOptionType(String),

    /// The quantity divides by `sigma * sqrt(T)` and has no value at T=0 or sigma=0.
    #[error("{quantity} is undefined at the boundary: {reason}")]
    UndefinedAtBoundary {
        quantity: &'static str,
        reason: &'static str,
    },

    #[error(
        "{method} did not converge after {iterations} iterations \
         (last estimate {last_estimate:.6}, residual {residual:.3e})"
    )]
    NonConvergence {
        method: &'static str,
        iterations: usize,
        last_estimate: f64,
        residual: f64,
    },

    /// Target price lies outside the no-arbitrage band of the model.
    #[error("Target price {price:.6} is outside the attainable range [{lower:.6}, {upper:.6})")]
    PriceOutOfRange { price: f64, lower: f64, upper: f64 },
}

pub type Result<T> = std::result::Result<T, PricingError>;

impl PricingError {
    pub fn invalid_input(param: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidInput {
            param,
            value,
            reason,
        }
    }

    pub fn at_boundary(quantity: &'static str, reason: &'static str) -> Self {
        Self::UndefinedAtBoundary { quantity, reason }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::UnknownOptionType(_)
        )
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::UndefinedAtBoundary { .. })
    }

    pub fn is_non_convergence(&self) -> bool {
        matches!(self, Self::NonConvergence { .. })
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::PriceOutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PricingError::invalid_input("sigma", -0.1, "must be non-negative");
        assert_eq!(
            err.to_string(),
            "Invalid input: sigma = -0.1 (must be non-negative)"
        );
        assert!(err.is_invalid_input());

        let err = PricingError::UnknownOptionType("straddle".to_string());
        assert!(err.to_string().contains("straddle"));
        assert!(err.is_invalid_input());

        let err = PricingError::at_boundary("gamma", "time to expiry is zero");
        assert!(err.to_string().contains("gamma is undefined"));
        assert!(err.is_boundary());

        let err = PricingError::NonConvergence {
            method: "bisection",
            iterations: 100,
            last_estimate: 0.25,
            residual: 1e-3,
        };
        assert!(err.to_string().contains("100 iterations"));
        assert!(err.is_non_convergence());

        let err = PricingError::PriceOutOfRange {
            price: 5.0,
            lower: 10.0,
            upper: 110.0,
        };
        assert!(err.to_string().contains("outside the attainable range"));
        assert!(err.is_out_of_range());
        assert!(!err.is_invalid_input());
    }
}
