//! # structpricer
//!
//! Pricing of options, certificates, structured products and bonds under
//! Black–Scholes closed forms, a trinomial lattice and Monte Carlo.
//!
//! This crate is a façade re-exporting the `sp-*` workspace crates, plus
//! TOML configuration ([`config`]) and subscriber setup ([`logging`]).
//!
//! ```rust
//! use structpricer::instruments::{OptionContract, OptionType};
//! use structpricer::market::{Dividend, Market};
//! use structpricer::pricingengines::{price, Pricer};
//! use structpricer::time::Date;
//!
//! let market = Market::new(100.0, 0.2, 0.02, Dividend::Continuous { yield_rate: 0.035 })?;
//! let call = OptionContract::european(OptionType::Call, 100.0, Date::from_ymd_opt(2026, 1, 1).unwrap())?;
//! let pricer = Pricer::black_scholes(Date::from_ymd_opt(2025, 1, 1).unwrap());
//! let npv = price(&market, &call, &pricer)?.npv;
//! assert!((npv - 7.04).abs() < 0.1);
//! # Ok::<(), structpricer::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod logging;

/// Error taxonomy and numeric aliases.
pub use sp_core as core;

/// Dates, day counts and schedules.
pub use sp_time as time;

/// Distributions, random numbers, statistics, regression, interpolation.
pub use sp_math as math;

/// Market snapshot, curves and volatility.
pub use sp_market as market;

/// Option contracts, payoffs and fixed-income instruments.
pub use sp_instruments as instruments;

/// Trinomial lattice and Monte Carlo machinery.
pub use sp_methods as methods;

/// Pricing engines and dispatch.
pub use sp_pricingengines as pricingengines;

/// Strategies, certificates and structured products.
pub use sp_strategies as strategies;

pub use config::PricingConfig;
pub use logging::init_logging;
