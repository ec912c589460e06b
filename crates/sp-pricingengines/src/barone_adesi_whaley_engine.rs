//! Barone-Adesi–Whaley quadratic approximation for American options.
//!
//! The early-exercise premium is approximated by `A·(S/S*)^q`, where the
//! critical price `S*` solves the smooth-pasting condition by Newton's
//! method. An American call on an asset paying no dividend yield is never
//! exercised early and prices as the European.

use sp_core::{Real, Time};
use sp_instruments::OptionType;
use sp_math::distributions::{normal_cdf, normal_pdf};
use tracing::warn;

use crate::analytic_european_engine::black_scholes_merton;

const MAX_ITERATIONS: usize = 200;

fn d1(s: Real, k: Real, r: Real, q: Real, sigma: Real, t: Time) -> Real {
    ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

fn european(option_type: OptionType, s: Real, k: Real, r: Real, q: Real, sigma: Real, t: Time) -> Real {
    black_scholes_merton(option_type, s, k, r, q, sigma, t).0
}

/// Barone-Adesi–Whaley American price.
pub fn barone_adesi_whaley(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    sigma: Real,
    t: Time,
) -> Real {
    let value = european(option_type, spot, strike, r, q, sigma, t);
    if t <= 0.0 || strike <= 0.0 || sigma <= 0.0 {
        return value.max(option_type.intrinsic(spot, strike));
    }

    let sigma2 = sigma * sigma;
    let m = 2.0 * r / sigma2;
    let n = 2.0 * (r - q) / sigma2;
    let big_k = 1.0 - (-r * t).exp();
    if big_k.abs() < 1e-15 {
        return value;
    }

    match option_type {
        OptionType::Call if q <= 0.0 => value,
        OptionType::Call => {
            let q2 = (-(n - 1.0) + ((n - 1.0).powi(2) + 4.0 * m / big_k).sqrt()) / 2.0;
            if q2 <= 1.0 {
                return value;
            }
            let s_star = critical_call(strike, r, q, sigma, t, q2);
            if spot >= s_star {
                spot - strike
            } else {
                let a2 = (s_star / q2) * (1.0 - (-q * t).exp() * normal_cdf(d1(s_star, strike, r, q, sigma, t)));
                value + a2 * (spot / s_star).powf(q2)
            }
        }
        OptionType::Put => {
            let q1 = (-(n - 1.0) - ((n - 1.0).powi(2) + 4.0 * m / big_k).sqrt()) / 2.0;
            let s_star = critical_put(strike, r, q, sigma, t, q1);
            if spot <= s_star {
                strike - spot
            } else {
                let a1 = -(s_star / q1) * (1.0 - (-q * t).exp() * normal_cdf(-d1(s_star, strike, r, q, sigma, t)));
                value + a1 * (spot / s_star).powf(q1)
            }
        }
    }
}

/// `S*` with `S* − K = C(S*) + (S*/q₂)(1 − e^{-qT} N(d₁(S*)))`.
fn critical_call(strike: Real, r: Real, q: Real, sigma: Real, t: Time, q2: Real) -> Real {
    let s_inf = strike / (1.0 - 2.0 / q2);
    let h2 = -((r - q) * t + 2.0 * sigma * t.sqrt()) * strike / (s_inf - strike);
    let mut si = (s_inf + (strike - s_inf) * (-h2).exp()).max(strike * 1.001);
    let eq = (-q * t).exp();
    let sst = sigma * t.sqrt();

    for _ in 0..MAX_ITERATIONS {
        let d = d1(si, strike, r, q, sigma, t);
        let nd1 = normal_cdf(d);
        let g = (si - strike) - european(OptionType::Call, si, strike, r, q, sigma, t) - (si / q2) * (1.0 - eq * nd1);
        if g.abs() < 1e-8 * strike {
            return si;
        }
        let slope = 1.0 - eq * nd1 - (1.0 / q2) * (1.0 - eq * nd1) + eq * normal_pdf(d) / (q2 * sst);
        if slope.abs() < 1e-15 {
            break;
        }
        si = (si - g / slope).clamp(strike * 1.001, strike * 100.0);
    }
    warn!(strike, critical = si, "critical call price did not converge");
    si
}

/// `S*` with `K − S* = P(S*) − (S*/q₁)(1 − e^{-qT} N(−d₁(S*)))`.
fn critical_put(strike: Real, r: Real, q: Real, sigma: Real, t: Time, q1: Real) -> Real {
    let s_zero = strike / (1.0 - 2.0 / q1);
    let h1 = ((r - q) * t - 2.0 * sigma * t.sqrt()) * strike / (strike - s_zero);
    let mut si = (s_zero + (strike - s_zero) * (-h1).exp()).clamp(1e-10, strike * 0.999);
    let eq = (-q * t).exp();
    let sst = sigma * t.sqrt();

    for _ in 0..MAX_ITERATIONS {
        let d = d1(si, strike, r, q, sigma, t);
        let nmd1 = normal_cdf(-d);
        let g = (strike - si) - european(OptionType::Put, si, strike, r, q, sigma, t) + (si / q1) * (1.0 - eq * nmd1);
        if g.abs() < 1e-8 * strike {
            return si;
        }
        let slope = -1.0 + eq * nmd1 + (1.0 / q1) * (1.0 - eq * nmd1) + eq * normal_pdf(d) / (q1 * sst);
        if slope.abs() < 1e-15 {
            break;
        }
        si = (si - g / slope).clamp(1e-10, strike * 0.999);
    }
    warn!(strike, critical = si, "critical put price did not converge");
    si
}
