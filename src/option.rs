//! European option contract and its bound pricing operations.
//!
//! [`EuropeanOption`] is a validated, immutable bundle of the five model
//! inputs plus the option type. Every method delegates to the free functions
//! in [`crate::models::bs`] and [`crate::solver`]; no numeric logic lives here.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{PricingError, Result};
use crate::models::bs::{self, pricing, Greeks};
use crate::models::utils::log_moneyness;
use crate::solver::{self, IvResult, SolverConfig};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            _ => Err(PricingError::UnknownOptionType(s.to_string())),
        }
    }
}

/// A European option contract: `(S, K, T, r, sigma, option_type)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EuropeanOption {
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
    volatility: f64,
    option_type: OptionType,
}

impl EuropeanOption {
    /// Create a validated option.
    ///
    /// # Errors
    ///
    /// [`PricingError::InvalidInput`] if `spot <= 0`, `strike <= 0`,
    /// `time_to_expiry < 0`, `volatility < 0` or any input is not finite.
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Result<Self> {
        pricing::validate_inputs(spot, strike, time_to_expiry, rate, volatility)?;
        Ok(Self {
            spot,
            strike,
            time_to_expiry,
            rate,
            volatility,
            option_type,
        })
    }

    pub fn call(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        volatility: f64,
    ) -> Result<Self> {
        Self::new(spot, strike, time_to_expiry, rate, volatility, OptionType::Call)
    }

    pub fn put(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        volatility: f64,
    ) -> Result<Self> {
        Self::new(spot, strike, time_to_expiry, rate, volatility, OptionType::Put)
    }

    /// Same contract with a different volatility.
    pub fn with_volatility(&self, volatility: f64) -> Result<Self> {
        Self::new(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            volatility,
            self.option_type,
        )
    }

    /// Same contract with a different spot.
    pub fn with_spot(&self, spot: f64) -> Result<Self> {
        Self::new(
            spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.volatility,
            self.option_type,
        )
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn d1(&self) -> Result<f64> {
        bs::d1(self.spot, self.strike, self.time_to_expiry, self.rate, self.volatility)
    }

    pub fn d2(&self) -> Result<f64> {
        bs::d2(self.spot, self.strike, self.time_to_expiry, self.rate, self.volatility)
    }

    pub fn price(&self) -> Result<f64> {
        bs::price(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.volatility,
            self.option_type,
        )
    }

    /// Discounted intrinsic value, the price floor over all volatilities.
    pub fn intrinsic_value(&self) -> Result<f64> {
        bs::intrinsic_value(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.option_type,
        )
    }

    pub fn delta(&self) -> Result<f64> {
        bs::delta(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.volatility,
            self.option_type,
        )
    }

    pub fn gamma(&self) -> Result<f64> {
        bs::gamma(self.spot, self.strike, self.time_to_expiry, self.rate, self.volatility)
    }

    /// Vega per unit volatility.
    pub fn vega(&self) -> Result<f64> {
        bs::vega(self.spot, self.strike, self.time_to_expiry, self.rate, self.volatility)
    }

    pub fn theta(&self) -> Result<f64> {
        bs::theta(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.volatility,
            self.option_type,
        )
    }

    pub fn theta_per_day(&self) -> Result<f64> {
        bs::theta_per_day(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.volatility,
            self.option_type,
        )
    }

    /// Rho per unit rate.
    pub fn rho(&self) -> Result<f64> {
        bs::rho(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.volatility,
            self.option_type,
        )
    }

    pub fn greeks(&self) -> Result<Greeks> {
        bs::greeks(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.volatility,
            self.option_type,
        )
    }

    /// Greeks keyed by `delta`, `gamma`, `vega`, `theta`, `theta_per_day`, `rho`.
    pub fn greeks_map(&self) -> Result<BTreeMap<&'static str, f64>> {
        Ok(self.greeks()?.to_map())
    }

    /// Volatility that reproduces `market_price`, solved with the default configuration.
    ///
    /// The option's own volatility plays no part in the solve.
    pub fn implied_volatility(&self, market_price: f64) -> Result<f64> {
        self.implied_volatility_with(market_price, &SolverConfig::default())
            .map(|result| result.volatility)
    }

    pub fn implied_volatility_with(
        &self,
        market_price: f64,
        config: &SolverConfig,
    ) -> Result<IvResult> {
        solver::implied_volatility(
            market_price,
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.option_type,
            config,
        )
    }

    /// Log-moneyness ln(K/S)
    pub fn log_moneyness(&self) -> f64 {
        log_moneyness(self.strike, self.spot)
    }

    pub fn is_itm(&self) -> bool {
        match self.option_type {
            OptionType::Call => self.spot > self.strike,
            OptionType::Put => self.spot < self.strike,
        }
    }

    /// Is the strike within `tolerance` (relative) of spot?
    pub fn is_atm(&self, tolerance: f64) -> bool {
        (self.strike - self.spot).abs() / self.spot < tolerance
    }

    pub fn is_otm(&self) -> bool {
        !self.is_itm() && !self.is_atm(0.001)
    }

    /// Multi-line report of the inputs, price and Greeks.
    ///
    /// Greeks are reported as undefined at the expiry/zero-volatility boundary
    /// instead of failing the whole rendering.
    pub fn summary(&self) -> String {
        let mut out = format!("{}\n", self);
        match self.price() {
            Ok(price) => out.push_str(&format!("  {:<14}{:>14.6}\n", "price", price)),
            Err(e) => out.push_str(&format!("  {:<14}{:>14}\n", "price", e)),
        }
        if let Ok(intrinsic) = self.intrinsic_value() {
            out.push_str(&format!("  {:<14}{:>14.6}\n", "intrinsic", intrinsic));
        }
        match self.greeks() {
            Ok(greeks) => {
                let map = greeks.to_map();
                for name in Greeks::KEYS {
                    out.push_str(&format!("  {:<14}{:>14.6}\n", name, map[name]));
                }
            }
            Err(PricingError::UndefinedAtBoundary { reason, .. }) => {
                out.push_str(&format!("  greeks        undefined ({})\n", reason));
            }
            Err(e) => out.push_str(&format!("  greeks        {}\n", e)),
        }
        out
    }
}

/// Observed market price of a European option, the input row for implied volatility
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionQuote {
    /// Option type (Call or Put)
    pub option_type: OptionType,
    /// Underlying spot price
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Time to expiration in years
    pub time_to_expiry: f64,
    /// Continuously-compounded risk-free rate
    pub rate: f64,
    /// Observed option price
    pub market_price: f64,
}

impl OptionQuote {
    pub fn implied_volatility(&self, config: &SolverConfig) -> Result<IvResult> {
        solver::implied_volatility(
            self.market_price,
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate,
            self.option_type,
            config,
        )
    }
}

impl fmt::Display for EuropeanOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "European {} | S={:.4} K={:.4} T={:.4}y r={:.2}% sigma={:.2}%",
            self.option_type,
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.rate * 100.0,
            self.volatility * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type() {
        assert_eq!("Call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!(" put ".parse::<OptionType>().unwrap(), OptionType::Put);
        assert_eq!("p".parse::<OptionType>().unwrap(), OptionType::Put);
        assert_eq!(OptionType::Call.to_string(), "call");

        let err = "straddle".parse::<OptionType>().unwrap_err();
        assert_eq!(err, PricingError::UnknownOptionType("straddle".to_string()));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_moneyness() {
        let opt = EuropeanOption::call(100.0, 100.0, 0.5, 0.05, 0.2).unwrap();
        assert!(opt.is_atm(0.01));
        assert!(!opt.is_itm());
        assert!(!opt.is_otm());
        assert_eq!(opt.log_moneyness(), 0.0);

        let itm_put = EuropeanOption::put(90.0, 100.0, 0.5, 0.05, 0.2).unwrap();
        assert!(itm_put.is_itm());

        let otm_call = EuropeanOption::call(90.0, 100.0, 0.5, 0.05, 0.2).unwrap();
        assert!(otm_call.is_otm());
    }

    #[test]
    fn test_display() {
        let opt = EuropeanOption::put(100.0, 105.0, 0.5, 0.05, 0.25).unwrap();
        let text = opt.to_string();
        assert!(text.starts_with("European put"));
        assert!(text.contains("sigma=25.00%"));
    }
}
