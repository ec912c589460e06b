//! Black–Scholes–Merton closed forms.
//!
//! The Black–Scholes profile prices every payoff family it has a closed
//! form for:
//!
//! * European: the Black–Scholes–Merton formula, with Greeks
//! * Digital: cash-or-nothing, `e^{-rT} N(φ d₂)`
//! * Barrier, European monitoring: vanilla payoff restricted to the side of
//!   the level where the option is alive, decomposed into vanillas and
//!   digitals
//! * Barrier, American monitoring: Reiner–Rubinstein
//!   ([`crate::analytic_barrier_engine`])
//! * American: Barone-Adesi–Whaley ([`crate::barone_adesi_whaley_engine`])
//!
//! A cash dividend is handled with the escrowed model: the spot is reduced
//! by the dividend's present value.

use sp_core::errors::{Error, Result};
use sp_core::{Real, Time};
use sp_instruments::{
    Barrier, BarrierDirection, BarrierKind, BarrierMonitoring, OptionContract, OptionType, PayoffKind,
    PricingResults,
};
use sp_market::Market;
use sp_math::distributions::{normal_cdf, normal_pdf};
use sp_time::Date;
use tracing::debug;

use crate::analytic_barrier_engine::reiner_rubinstein;
use crate::barone_adesi_whaley_engine::barone_adesi_whaley;
use crate::context::PricingContext;
use crate::engine::OptionEngine;
use crate::greeks::{Greeks, TRADING_DAYS};

/// Closed-form engine.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticEuropeanEngine {
    pricing_date: Date,
}

impl AnalyticEuropeanEngine {
    /// Engine valuing at `pricing_date`.
    pub fn new(pricing_date: Date) -> Self {
        Self { pricing_date }
    }
}

/// Black–Scholes–Merton price and Greeks.
///
/// Greeks are quoted per volatility point (vega), per trading day (theta)
/// and per rate point (rho). A zero strike prices the call as the
/// dividend-discounted spot; zero volatility prices the discounted
/// intrinsic value of the forward.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    sigma: Real,
    t: Time,
) -> (Real, Greeks) {
    let phi = option_type.sign();
    if t <= 0.0 {
        return (option_type.intrinsic(spot, strike), Greeks::default());
    }

    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let std_dev = sigma * t.sqrt();

    if strike <= 0.0 {
        return match option_type {
            OptionType::Call => (
                spot * df_q,
                Greeks {
                    delta: df_q,
                    theta: q * spot * df_q / TRADING_DAYS,
                    ..Greeks::default()
                },
            ),
            OptionType::Put => (0.0, Greeks::default()),
        };
    }

    if std_dev <= 1e-15 {
        let forward = spot * ((r - q) * t).exp();
        if phi * (forward - strike) <= 0.0 {
            return (0.0, Greeks::default());
        }
        let theta = phi * (q * spot * df_q - r * strike * df_r);
        return (
            phi * (spot * df_q - strike * df_r),
            Greeks {
                delta: phi * df_q,
                theta: theta / TRADING_DAYS,
                rho: phi * strike * t * df_r / 100.0,
                ..Greeks::default()
            },
        );
    }

    let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
    let d2 = d1 - std_dev;
    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let theta = -(spot * df_q * npd1 * sigma) / (2.0 * t.sqrt()) - phi * r * strike * df_r * nd2
        + phi * q * spot * df_q * nd1;

    (
        price,
        Greeks {
            delta: phi * df_q * nd1,
            gamma: df_q * npd1 / (spot * std_dev),
            vega: spot * df_q * npd1 * t.sqrt() / 100.0,
            theta: theta / TRADING_DAYS,
            rho: phi * strike * t * df_r * nd2 / 100.0,
        },
    )
}

/// Second-order cross Greeks `(vanna, vomma)` in absolute units.
pub fn vanna_vomma(spot: Real, strike: Real, r: Real, q: Real, sigma: Real, t: Time) -> (Real, Real) {
    let std_dev = sigma * t.sqrt();
    if strike <= 0.0 || std_dev <= 1e-15 {
        return (0.0, 0.0);
    }
    let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
    let d2 = d1 - std_dev;
    let df_q = (-q * t).exp();
    let vanna = -df_q * normal_pdf(d1) * d2 / sigma;
    let vomma = spot * df_q * normal_pdf(d1) * t.sqrt() * d1 * d2 / sigma;
    (vanna, vomma)
}

/// Cash-or-nothing digital paying 1.
pub fn cash_or_nothing(option_type: OptionType, spot: Real, strike: Real, r: Real, q: Real, sigma: Real, t: Time) -> Real {
    let df_r = (-r * t).exp();
    if strike <= 0.0 {
        return match option_type {
            OptionType::Call => df_r,
            OptionType::Put => 0.0,
        };
    }
    let phi = option_type.sign();
    let std_dev = sigma * t.sqrt();
    if std_dev <= 1e-15 {
        let forward = spot * ((r - q) * t).exp();
        return if phi * (forward - strike) > 0.0 { df_r } else { 0.0 };
    }
    let d2 = ((spot / strike).ln() + (r - q - 0.5 * sigma * sigma) * t) / std_dev;
    df_r * normal_cdf(phi * d2)
}

/// Barrier observed at maturity only.
///
/// `above(L)` is the value of the vanilla payoff restricted to `S_T > L`:
///
/// ```text
/// call: C(M) + (M − K)·D_call(M),         M = max(K, L)
/// put:  P(K) − P(L) − (K − L)·D_put(L),   L < K (zero otherwise)
/// ```
///
/// Up-and-in and down-and-out options are worth `above(H)`; the other two
/// are the vanilla minus `above(H)`.
pub fn european_monitored_barrier(
    option_type: OptionType,
    barrier: &Barrier,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    sigma: Real,
    t: Time,
) -> Real {
    let vanilla = |k: Real| black_scholes_merton(option_type, spot, k, r, q, sigma, t).0;
    let level = barrier.level;
    let above = match option_type {
        OptionType::Call => {
            let m = strike.max(level);
            vanilla(m) + (m - strike) * cash_or_nothing(option_type, spot, m, r, q, sigma, t)
        }
        OptionType::Put if level < strike => {
            vanilla(strike) - vanilla(level) - (strike - level) * cash_or_nothing(option_type, spot, level, r, q, sigma, t)
        }
        OptionType::Put => 0.0,
    };
    let value = match (barrier.direction, barrier.kind) {
        (BarrierDirection::Up, BarrierKind::In) | (BarrierDirection::Down, BarrierKind::Out) => above,
        (BarrierDirection::Up, BarrierKind::Out) | (BarrierDirection::Down, BarrierKind::In) => vanilla(strike) - above,
    };
    value.max(0.0)
}

impl OptionEngine for AnalyticEuropeanEngine {
    fn calculate(&self, market: &Market, option: &OptionContract) -> Result<PricingResults> {
        let ctx = PricingContext::new(market, option, self.pricing_date)?;
        let spot = match ctx.dividend {
            Some(d) => {
                let escrowed = ctx.spot - d.amount * market.discount(d.time);
                if escrowed <= 0.0 {
                    return Err(Error::NumericalInstability(format!(
                        "cash dividend {} exceeds the spot {}",
                        d.amount, ctx.spot
                    )));
                }
                escrowed
            }
            None => ctx.spot,
        };
        let (k, r, q, sigma, t) = (
            option.strike(),
            ctx.rate,
            ctx.dividend_yield,
            ctx.volatility,
            ctx.time_to_maturity,
        );
        let option_type = option.option_type();
        debug!(payoff = option.payoff().name(), spot, sigma, r, q, t, "closed-form pricing");

        match option.payoff() {
            PayoffKind::European => {
                let (price, greeks) = black_scholes_merton(option_type, spot, k, r, q, sigma, t);
                let (vanna, vomma) = vanna_vomma(spot, k, r, q, sigma, t);
                Ok(PricingResults::from_npv(price)
                    .with_result("delta", greeks.delta)
                    .with_result("gamma", greeks.gamma)
                    .with_result("vega", greeks.vega)
                    .with_result("theta", greeks.theta)
                    .with_result("rho", greeks.rho)
                    .with_result("vanna", vanna)
                    .with_result("vomma", vomma))
            }
            PayoffKind::Digital => Ok(PricingResults::from_npv(cash_or_nothing(option_type, spot, k, r, q, sigma, t))),
            PayoffKind::Barrier(b) if b.monitoring == BarrierMonitoring::European => Ok(PricingResults::from_npv(
                european_monitored_barrier(option_type, b, spot, k, r, q, sigma, t),
            )),
            PayoffKind::Barrier(b) => Ok(PricingResults::from_npv(reiner_rubinstein(
                option_type,
                b,
                spot,
                k,
                r,
                q,
                sigma,
                t,
            )?)),
            PayoffKind::American { .. } => Ok(PricingResults::from_npv(barone_adesi_whaley(
                option_type,
                spot,
                k,
                r,
                q,
                sigma,
                t,
            ))),
            PayoffKind::Asian { .. } => Err(Error::NotImplemented(
                "no closed form for arithmetic Asian options".into(),
            )),
        }
    }
}
