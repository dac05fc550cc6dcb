use std::fmt;

/// Root-finding strategy used by the implied volatility solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolverMethod {
    /// Newton-Raphson on vega, falling back to bisection whenever a step
    /// would leave the current bracket or vega vanishes
    #[default]
    NewtonBisection,
    /// Pure bracketed bisection: slow but unconditionally convergent
    Bisection,
    /// Brent's method (inverse quadratic interpolation with bisection safeguard)
    Brent,
}

impl SolverMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SolverMethod::NewtonBisection => "newton-bisection",
            SolverMethod::Bisection => "bisection",
            SolverMethod::Brent => "brent",
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A converged implied volatility.
///
/// Failures never produce an `IvResult`; they surface as
/// [`crate::PricingError::NonConvergence`] or one of the input errors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IvResult {
    /// Implied volatility (as decimal, e.g., 0.25 for 25%)
    pub volatility: f64,
    /// Iterations spent by the root finder
    pub iterations: usize,
    /// Method that produced the result
    pub method: SolverMethod,
    /// Model price minus target price at `volatility`
    pub residual: f64,
}

impl IvResult {
    /// Volatility in percent (e.g., 25.0 for 25%)
    pub fn volatility_percent(&self) -> f64 {
        self.volatility * 100.0
    }
}
