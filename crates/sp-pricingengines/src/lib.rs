//! # sp-pricingengines
//!
//! Pricing engines for option contracts and fixed-income instruments.
//!
//! ## Engines
//!
//! - [`AnalyticEuropeanEngine`]: Black–Scholes–Merton closed forms, with
//!   digital, barrier ([`reiner_rubinstein`]) and American
//!   ([`barone_adesi_whaley`]) variants
//! - [`TreeEngine`]: trinomial lattice with cash dividends and pruning
//! - [`MonteCarloEngine`]: path simulation, Longstaff–Schwartz and autocall
//!   probabilities
//! - [`DiscountingBondEngine`]: discounted cashflows off a yield curve
//!
//! Option engines implement [`OptionEngine`]; [`price`] and [`greeks`]
//! dispatch on a [`Pricer`] profile.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_barrier_engine;
pub mod analytic_european_engine;
pub mod barone_adesi_whaley_engine;
pub mod context;
pub mod discounting_bond_engine;
pub mod engine;
pub mod greeks;
pub mod implied_volatility;
pub mod manager;
pub mod monte_carlo_engine;
pub mod pricer;
pub mod tree_engine;

pub use analytic_barrier_engine::reiner_rubinstein;
pub use analytic_european_engine::{
    black_scholes_merton, cash_or_nothing, european_monitored_barrier, AnalyticEuropeanEngine,
};
pub use barone_adesi_whaley_engine::barone_adesi_whaley;
pub use context::{time_between, PricingContext};
pub use discounting_bond_engine::DiscountingBondEngine;
pub use engine::OptionEngine;
pub use greeks::{finite_difference_greeks, Greeks};
pub use implied_volatility::{
    implied_volatility, implied_volatility_surface, ImpliedVolatilitySettings, OptionQuote,
};
pub use manager::{engine_for, greeks, price};
pub use monte_carlo_engine::MonteCarloEngine;
pub use pricer::{MonteCarloSettings, Pricer, PricerKind, TreeSettings};
pub use tree_engine::TreeEngine;
