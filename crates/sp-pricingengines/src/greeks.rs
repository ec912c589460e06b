//! Option sensitivities.
//!
//! All engines report Greeks in the same units as the closed form:
//! vega per volatility point, theta per trading day, rho per rate point.
//! Numerical engines use central finite differences with fixed bumps.

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};
use sp_core::errors::Result;
use sp_core::Real;
use sp_market::Market;
use sp_time::Date;

/// Relative spot bump.
pub const SPOT_BUMP: Real = 0.01;
/// Absolute volatility bump.
pub const VOLATILITY_BUMP: Real = 0.01;
/// Absolute rate bump.
pub const RATE_BUMP: Real = 0.01;
/// Trading days per year used to quote theta.
pub const TRADING_DAYS: Real = 252.0;
/// Calendar days per year of the time bump.
pub const CALENDAR_DAYS: Real = 365.0;

/// First- and second-order sensitivities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// ∂V/∂S.
    pub delta: Real,
    /// ∂²V/∂S².
    pub gamma: Real,
    /// ∂V/∂σ per volatility point.
    pub vega: Real,
    /// ∂V/∂t per trading day.
    pub theta: Real,
    /// ∂V/∂r per rate point.
    pub rho: Real,
}

impl Greeks {
    /// `[delta, gamma, vega, theta, rho]`.
    pub fn to_array(&self) -> [Real; 5] {
        [self.delta, self.gamma, self.vega, self.theta, self.rho]
    }
}

impl Add for Greeks {
    type Output = Greeks;

    fn add(self, rhs: Greeks) -> Greeks {
        Greeks {
            delta: self.delta + rhs.delta,
            gamma: self.gamma + rhs.gamma,
            vega: self.vega + rhs.vega,
            theta: self.theta + rhs.theta,
            rho: self.rho + rhs.rho,
        }
    }
}

impl Mul<Real> for Greeks {
    type Output = Greeks;

    fn mul(self, quantity: Real) -> Greeks {
        Greeks {
            delta: self.delta * quantity,
            gamma: self.gamma * quantity,
            vega: self.vega * quantity,
            theta: self.theta * quantity,
            rho: self.rho * quantity,
        }
    }
}

impl std::iter::Sum for Greeks {
    fn sum<I: Iterator<Item = Greeks>>(iter: I) -> Greeks {
        iter.fold(Greeks::default(), Add::add)
    }
}

/// Central finite-difference Greeks of `price(market, pricing_date)`.
///
/// Every bump reprices an independent shocked copy of `market`; the base
/// market is never modified. Theta moves the pricing date one calendar day
/// either way, so it needs at least two days to maturity.
pub fn finite_difference_greeks<F>(market: &Market, pricing_date: Date, price: F) -> Result<Greeks>
where
    F: Fn(&Market, Date) -> Result<Real>,
{
    let spot = market.spot();
    let h = SPOT_BUMP * spot;
    let base = price(market, pricing_date)?;
    let up = price(&market.with_spot(spot + h)?, pricing_date)?;
    let down = price(&market.with_spot(spot - h)?, pricing_date)?;

    let vol_up = price(&market.with_volatility_shift(VOLATILITY_BUMP), pricing_date)?;
    let vol_down = price(&market.with_volatility_shift(-VOLATILITY_BUMP), pricing_date)?;

    let rate_up = price(&market.with_rate_shift(RATE_BUMP), pricing_date)?;
    let rate_down = price(&market.with_rate_shift(-RATE_BUMP), pricing_date)?;

    let later = pricing_date + chrono::Days::new(1);
    let earlier = pricing_date - chrono::Days::new(1);
    let theta_annual = (price(market, later)? - price(market, earlier)?) * CALENDAR_DAYS / 2.0;

    Ok(Greeks {
        delta: (up - down) / (2.0 * h),
        gamma: (up - 2.0 * base + down) / (h * h),
        // per point: (∂V/∂σ) · 0.01
        vega: (vol_up - vol_down) / (2.0 * VOLATILITY_BUMP) * 0.01,
        theta: theta_annual / TRADING_DAYS,
        rho: (rate_up - rate_down) / (2.0 * RATE_BUMP) * 0.01,
    })
}
