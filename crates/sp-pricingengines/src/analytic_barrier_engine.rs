//! Continuously monitored single barriers (Reiner & Rubinstein, 1991).
//!
//! Rebates are not modelled, so the `E` and `F` terms of the Reiner–Rubinstein
//! decomposition vanish.

use sp_core::errors::{Error, Result};
use sp_core::{Real, Time};
use sp_instruments::{Barrier, BarrierDirection, BarrierKind, OptionType};
use sp_math::distributions::normal_cdf;

use crate::analytic_european_engine::black_scholes_merton;

/// Reiner–Rubinstein price of a knock-in or knock-out vanilla.
///
/// A barrier already breached at inception leaves a knock-out worthless and
/// turns a knock-in into the vanilla.
pub fn reiner_rubinstein(
    option_type: OptionType,
    barrier: &Barrier,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    sigma: Real,
    t: Time,
) -> Result<Real> {
    if barrier.is_breached(spot) {
        return Ok(match barrier.kind {
            BarrierKind::Out => 0.0,
            BarrierKind::In => black_scholes_merton(option_type, spot, strike, r, q, sigma, t).0,
        });
    }
    if sigma <= 0.0 || t <= 0.0 {
        return Err(Error::NumericalInstability(format!(
            "barrier closed form needs positive volatility and time, got σ = {sigma}, T = {t}"
        )));
    }

    let h = barrier.level;
    let sigma2 = sigma * sigma;
    let sst = sigma * t.sqrt();
    let mu = (r - q - 0.5 * sigma2) / sigma2;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();

    let phi = option_type.sign();
    let eta = match barrier.direction {
        BarrierDirection::Down => 1.0,
        BarrierDirection::Up => -1.0,
    };

    let x1 = (spot / strike).ln() / sst + (1.0 + mu) * sst;
    let x2 = (spot / h).ln() / sst + (1.0 + mu) * sst;
    let y1 = (h * h / (spot * strike)).ln() / sst + (1.0 + mu) * sst;
    let y2 = (h / spot).ln() / sst + (1.0 + mu) * sst;
    let reflect_s = (h / spot).powf(2.0 * (mu + 1.0));
    let reflect_k = (h / spot).powf(2.0 * mu);

    let a = phi * spot * df_q * normal_cdf(phi * x1) - phi * strike * df_r * normal_cdf(phi * (x1 - sst));
    let b = phi * spot * df_q * normal_cdf(phi * x2) - phi * strike * df_r * normal_cdf(phi * (x2 - sst));
    let c = phi * spot * df_q * reflect_s * normal_cdf(eta * y1)
        - phi * strike * df_r * reflect_k * normal_cdf(eta * (y1 - sst));
    let d = phi * spot * df_q * reflect_s * normal_cdf(eta * y2)
        - phi * strike * df_r * reflect_k * normal_cdf(eta * (y2 - sst));

    let above = strike >= h;
    let price = match (barrier.direction, barrier.kind, option_type) {
        (BarrierDirection::Down, BarrierKind::In, OptionType::Call) if above => c,
        (BarrierDirection::Down, BarrierKind::In, OptionType::Call) => a - b + d,
        (BarrierDirection::Down, BarrierKind::In, OptionType::Put) if above => b - c + d,
        (BarrierDirection::Down, BarrierKind::In, OptionType::Put) => a,

        (BarrierDirection::Up, BarrierKind::In, OptionType::Call) if above => a,
        (BarrierDirection::Up, BarrierKind::In, OptionType::Call) => b - c + d,
        (BarrierDirection::Up, BarrierKind::In, OptionType::Put) if above => a - b + d,
        (BarrierDirection::Up, BarrierKind::In, OptionType::Put) => c,

        (BarrierDirection::Down, BarrierKind::Out, OptionType::Call) if above => a - c,
        (BarrierDirection::Down, BarrierKind::Out, OptionType::Call) => b - d,
        (BarrierDirection::Down, BarrierKind::Out, OptionType::Put) if above => a - b + c - d,
        (BarrierDirection::Down, BarrierKind::Out, OptionType::Put) => 0.0,

        (BarrierDirection::Up, BarrierKind::Out, OptionType::Call) if above => 0.0,
        (BarrierDirection::Up, BarrierKind::Out, OptionType::Call) => a - b + c - d,
        (BarrierDirection::Up, BarrierKind::Out, OptionType::Put) if above => b - d,
        (BarrierDirection::Up, BarrierKind::Out, OptionType::Put) => a - c,
    };
    Ok(price.max(0.0))
}
