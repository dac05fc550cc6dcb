use crate::error::{PricingError, Result};
use crate::solver::types::SolverMethod;

/// Configuration of the implied volatility solver
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Hard cap on root-finder iterations
    #[cfg_attr(feature = "serde", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,

    /// Convergence tolerance on |model price - target price|
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance: f64,

    /// Root-finding strategy
    #[cfg_attr(feature = "serde", serde(default))]
    pub method: SolverMethod,

    /// Starting volatility for Newton-Raphson (None = Brenner-Subrahmanyam estimate)
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub initial_guess: Option<f64>,

    /// Lower edge of the initial search bracket
    #[cfg_attr(feature = "serde", serde(default = "default_min_volatility"))]
    pub min_volatility: f64,

    /// Upper edge of the initial search bracket
    #[cfg_attr(feature = "serde", serde(default = "default_max_volatility"))]
    pub max_volatility: f64,

    /// How many times each bracket edge may be pushed outward when the
    /// target price is not enclosed (upper edge doubles, lower edge shrinks 10x)
    #[cfg_attr(feature = "serde", serde(default = "default_max_bracket_expansions"))]
    pub max_bracket_expansions: usize,

    /// Below this vega a Newton step is replaced by bisection
    #[cfg_attr(feature = "serde", serde(default = "default_min_vega"))]
    pub min_vega: f64,

    /// Bracket width at which the search stops; reaching it without matching
    /// the price within `tolerance` is a non-convergence
    #[cfg_attr(feature = "serde", serde(default = "default_volatility_tolerance"))]
    pub volatility_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            method: SolverMethod::default(),
            initial_guess: None,
            min_volatility: default_min_volatility(),
            max_volatility: default_max_volatility(),
            max_bracket_expansions: default_max_bracket_expansions(),
            min_vega: default_min_vega(),
            volatility_tolerance: default_volatility_tolerance(),
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight tolerance for pricing and risk systems
    pub fn production() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
            ..Self::default()
        }
    }

    /// Default tolerance with a smaller iteration budget
    pub fn fast() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-5,
            ..Self::default()
        }
    }

    /// Near machine-precision solves over a wide volatility range
    pub fn research() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
            max_volatility: 10.0,
            volatility_tolerance: 1e-14,
            ..Self::default()
        }
    }

    /// Quick validation settings
    pub fn minimal() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-4,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: SolverMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = Some(initial_guess);
        self
    }

    pub fn with_bounds(mut self, min_volatility: f64, max_volatility: f64) -> Self {
        self.min_volatility = min_volatility;
        self.max_volatility = max_volatility;
        self
    }

    /// Reject settings the solver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(PricingError::invalid_input(
                "max_iterations",
                0.0,
                "at least one iteration is required",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(PricingError::invalid_input(
                "tolerance",
                self.tolerance,
                "tolerance must be positive and finite",
            ));
        }
        if !self.min_volatility.is_finite() || self.min_volatility <= 0.0 {
            return Err(PricingError::invalid_input(
                "min_volatility",
                self.min_volatility,
                "lower bracket edge must be positive and finite",
            ));
        }
        if !self.max_volatility.is_finite() || self.max_volatility <= self.min_volatility {
            return Err(PricingError::invalid_input(
                "max_volatility",
                self.max_volatility,
                "upper bracket edge must be finite and above the lower edge",
            ));
        }
        if let Some(guess) = self.initial_guess {
            if !guess.is_finite() || guess <= 0.0 {
                return Err(PricingError::invalid_input(
                    "initial_guess",
                    guess,
                    "initial guess must be positive and finite",
                ));
            }
        }
        if !self.min_vega.is_finite() || self.min_vega < 0.0 {
            return Err(PricingError::invalid_input(
                "min_vega",
                self.min_vega,
                "vega threshold must be non-negative and finite",
            ));
        }
        if !self.volatility_tolerance.is_finite() || self.volatility_tolerance < 0.0 {
            return Err(PricingError::invalid_input(
                "volatility_tolerance",
                self.volatility_tolerance,
                "volatility tolerance must be non-negative and finite",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl SolverConfig {
    /// Parse a configuration from TOML; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let config: Self = toml::from_str(source).context("Failed to parse solver config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read solver config {}", path.display()))?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }
}

fn default_max_iterations() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-5
}

fn default_min_volatility() -> f64 {
    1e-6
}

fn default_max_volatility() -> f64 {
    5.0
}

fn default_max_bracket_expansions() -> usize {
    10
}

fn default_min_vega() -> f64 {
    1e-8
}

fn default_volatility_tolerance() -> f64 {
    1e-12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.tolerance, 1e-5);
        assert_eq!(config.method, SolverMethod::NewtonBisection);
        assert!(config.initial_guess.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        for config in [
            SolverConfig::production(),
            SolverConfig::fast(),
            SolverConfig::research(),
            SolverConfig::minimal(),
        ] {
            assert!(config.validate().is_ok(), "invalid preset {:?}", config);
        }
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::new()
            .with_method(SolverMethod::Brent)
            .with_max_iterations(50)
            .with_tolerance(1e-6)
            .with_initial_guess(0.3)
            .with_bounds(0.01, 3.0);

        assert_eq!(config.method, SolverMethod::Brent);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.initial_guess, Some(0.3));
        assert_eq!(config.min_volatility, 0.01);
        assert_eq!(config.max_volatility, 3.0);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(SolverConfig::new().with_max_iterations(0).validate().is_err());
        assert!(SolverConfig::new().with_tolerance(0.0).validate().is_err());
        assert!(SolverConfig::new().with_bounds(0.5, 0.1).validate().is_err());
        assert!(SolverConfig::new().with_initial_guess(-0.2).validate().is_err());
    }
}
