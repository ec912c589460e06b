//! Engine dispatch.
//!
//! The single integration point for callers: pick the engine from the
//! pricer profile, price, and compute Greeks.

use sp_core::errors::Result;
use sp_instruments::{OptionContract, PayoffKind, PricingResults};
use sp_market::Market;
use tracing::debug;

use crate::analytic_european_engine::AnalyticEuropeanEngine;
use crate::engine::OptionEngine;
use crate::greeks::{finite_difference_greeks, Greeks};
use crate::monte_carlo_engine::MonteCarloEngine;
use crate::pricer::{Pricer, PricerKind};
use crate::tree_engine::TreeEngine;

/// The engine a pricer profile selects.
pub fn engine_for(pricer: &Pricer) -> Result<Box<dyn OptionEngine>> {
    Ok(match pricer.kind {
        PricerKind::MonteCarlo(settings) => Box::new(MonteCarloEngine::new(pricer.pricing_date, settings)?),
        PricerKind::Tree(settings) => Box::new(TreeEngine::new(pricer.pricing_date, settings)?),
        PricerKind::BlackScholes => Box::new(AnalyticEuropeanEngine::new(pricer.pricing_date)),
    })
}

/// Price `option` on `market` with `pricer`.
pub fn price(market: &Market, option: &OptionContract, pricer: &Pricer) -> Result<PricingResults> {
    debug!(
        engine = pricer.kind.name(),
        payoff = option.payoff().name(),
        "dispatching option"
    );
    engine_for(pricer)?.calculate(market, option)
}

/// Greeks of `option`.
///
/// Closed form for European options under the Black–Scholes profile,
/// central finite differences otherwise. An unseeded Monte Carlo profile
/// is pinned to one entropy seed for all bumps.
pub fn greeks(market: &Market, option: &OptionContract, pricer: &Pricer) -> Result<Greeks> {
    if let (PricerKind::BlackScholes, PayoffKind::European) = (&pricer.kind, option.payoff()) {
        let results = price(market, option, pricer)?;
        if let (Some(delta), Some(gamma), Some(vega), Some(theta), Some(rho)) = (
            results.result("delta"),
            results.result("gamma"),
            results.result("vega"),
            results.result("theta"),
            results.result("rho"),
        ) {
            return Ok(Greeks {
                delta,
                gamma,
                vega,
                theta,
                rho,
            });
        }
    }

    let pricer = pricer.pinned();
    let engine = engine_for(&pricer)?;
    finite_difference_greeks(market, pricer.pricing_date, |shocked, date| {
        if date == pricer.pricing_date {
            engine.calculate(shocked, option).map(|r| r.npv)
        } else {
            price(shocked, option, &pricer.with_pricing_date(date)).map(|r| r.npv)
        }
    })
}
