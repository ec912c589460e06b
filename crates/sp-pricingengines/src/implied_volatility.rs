//! Implied volatility by Newton–Raphson on the Black–Scholes price.

use serde::{Deserialize, Serialize};
use sp_core::errors::{Error, Result};
use sp_core::{ensure, Real, Time, Volatility};
use sp_instruments::OptionType;
use sp_market::{Market, VolatilitySurface};
use sp_time::Date;
use tracing::debug;

use crate::analytic_european_engine::black_scholes_merton;
use crate::context::time_between;

/// Newton iteration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpliedVolatilitySettings {
    /// Starting volatility.
    pub initial_guess: Volatility,
    /// Restart point when vega vanishes at the first guess.
    pub fallback_guess: Volatility,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Absolute price tolerance.
    pub tolerance: Real,
}

impl Default for ImpliedVolatilitySettings {
    fn default() -> Self {
        Self {
            initial_guess: 0.65,
            fallback_guess: 0.45,
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

/// A quoted European option premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike.
    pub strike: Real,
    /// Expiry date.
    pub maturity: Date,
    /// Premium.
    pub price: Real,
}

/// Volatility reproducing `price` under Black–Scholes.
///
/// Fails with `InvalidArgument` when the price is outside the no-arbitrage
/// bounds and with `NumericalInstability` when Newton does not converge.
pub fn implied_volatility(
    option_type: OptionType,
    price: Real,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    t: Time,
    settings: &ImpliedVolatilitySettings,
) -> Result<Volatility> {
    ensure!(t > 0.0, "implied volatility needs a positive maturity, got {t}");
    let (df_r, df_q) = ((-r * t).exp(), (-q * t).exp());
    let lower = option_type.intrinsic(spot * df_q, strike * df_r);
    let upper = match option_type {
        OptionType::Call => spot * df_q,
        OptionType::Put => strike * df_r,
    };
    if price <= lower || price >= upper {
        return Err(Error::InvalidArgument(format!(
            "price {price} outside the arbitrage bounds ({lower}, {upper})"
        )));
    }

    let value = |sigma: Volatility| {
        let (p, g) = black_scholes_merton(option_type, spot, strike, r, q, sigma, t);
        // vega back to absolute units
        (p - price, g.vega * 100.0)
    };

    let mut sigma = settings.initial_guess;
    if value(sigma).1 <= Real::EPSILON {
        sigma = settings.fallback_guess;
    }
    for iteration in 0..settings.max_iterations {
        let (diff, vega) = value(sigma);
        if diff.abs() < settings.tolerance {
            debug!(iteration, sigma, "implied volatility converged");
            return Ok(sigma);
        }
        if vega <= Real::EPSILON {
            break;
        }
        let next = sigma - diff / vega;
        sigma = if next > 0.0 { next } else { sigma / 2.0 };
    }
    Err(Error::NumericalInstability(format!(
        "implied volatility did not converge for price {price}, strike {strike}"
    )))
}

/// Implied volatilities of `quotes` on `market`'s spot, rates and yield,
/// assembled into a surface.
pub fn implied_volatility_surface(
    quotes: &[OptionQuote],
    market: &Market,
    pricing_date: Date,
    settings: &ImpliedVolatilitySettings,
) -> Result<VolatilitySurface> {
    let points = quotes
        .iter()
        .map(|quote| {
            let t = time_between(pricing_date, quote.maturity);
            let sigma = implied_volatility(
                quote.option_type,
                quote.price,
                market.spot(),
                quote.strike,
                market.rate(t),
                market.dividend_yield(),
                t,
                settings,
            )?;
            Ok((quote.strike, t, sigma))
        })
        .collect::<Result<Vec<_>>>()?;
    VolatilitySurface::from_quotes(&points)
}
