//! Implied volatility solver.
//!
//! Inverts the Black-Scholes price in volatility with one of three
//! bracketed root finders (see [`SolverMethod`]), configured through
//! [`SolverConfig`].

pub mod config;
pub mod pipeline;
pub mod types;

pub use config::SolverConfig;
pub use pipeline::implied_volatility;
pub use types::{IvResult, SolverMethod};
