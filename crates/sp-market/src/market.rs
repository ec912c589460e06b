//! The market snapshot.

use std::sync::Arc;

use sp_core::errors::Result;
use sp_core::{ensure, DiscountFactor, Rate, Real, Time, Volatility};

use crate::dividend::Dividend;
use crate::rates::{FlatRate, ShiftedCurve, YieldCurve};
use crate::volatility::{FlatVolatility, ShiftedVolatility, VolatilitySource};

/// Spot, volatility, rates and dividends of one underlying.
///
/// A `Market` is never mutated. Bumped scenarios are new values sharing the
/// unchanged sources through `Arc`.
#[derive(Debug, Clone)]
pub struct Market {
    spot: Real,
    volatility: Arc<dyn VolatilitySource>,
    curve: Arc<dyn YieldCurve>,
    dividend: Dividend,
}

impl Market {
    /// A market with a flat volatility and a flat rate.
    pub fn new(spot: Real, volatility: Volatility, rate: Rate, dividend: Dividend) -> Result<Self> {
        Self::with_sources(
            spot,
            Arc::new(FlatVolatility::new(volatility)?),
            Arc::new(FlatRate::new(rate)),
            dividend,
        )
    }

    /// A market from arbitrary volatility and rate sources.
    pub fn with_sources(
        spot: Real,
        volatility: Arc<dyn VolatilitySource>,
        curve: Arc<dyn YieldCurve>,
        dividend: Dividend,
    ) -> Result<Self> {
        ensure!(spot > 0.0 && spot.is_finite(), "spot must be positive, got {spot}");
        if let Dividend::Discrete { amount, .. } = dividend {
            ensure!(amount >= 0.0, "dividend amount must be non-negative, got {amount}");
        }
        Ok(Self {
            spot,
            volatility,
            curve,
            dividend,
        })
    }

    /// Spot price.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// The dividend description.
    pub fn dividend(&self) -> Dividend {
        self.dividend
    }

    /// Continuous dividend yield (zero for discrete or no dividends).
    pub fn dividend_yield(&self) -> Rate {
        self.dividend.yield_rate()
    }

    /// Volatility for `strike` at time `t`.
    pub fn volatility(&self, strike: Real, t: Time) -> Result<Volatility> {
        self.volatility.volatility(strike, t)
    }

    /// Zero rate to `t`.
    pub fn rate(&self, t: Time) -> Rate {
        self.curve.zero_rate(t)
    }

    /// Discount factor to `t`.
    pub fn discount(&self, t: Time) -> DiscountFactor {
        self.curve.discount(t)
    }

    /// Forward rate between `t1` and `t2`.
    pub fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        self.curve.forward_rate(t1, t2)
    }

    /// The yield curve.
    pub fn curve(&self) -> &Arc<dyn YieldCurve> {
        &self.curve
    }

    /// The volatility source.
    pub fn volatility_source(&self) -> &Arc<dyn VolatilitySource> {
        &self.volatility
    }

    /// A copy with a different spot.
    pub fn with_spot(&self, spot: Real) -> Result<Self> {
        ensure!(spot > 0.0 && spot.is_finite(), "spot must be positive, got {spot}");
        Ok(Self {
            spot,
            ..self.clone()
        })
    }

    /// A copy with every volatility shifted by `shift`.
    pub fn with_volatility_shift(&self, shift: Volatility) -> Self {
        Self {
            volatility: Arc::new(ShiftedVolatility::new(self.volatility.clone(), shift)),
            ..self.clone()
        }
    }

    /// A copy with the curve shifted in parallel by `shift`.
    pub fn with_rate_shift(&self, shift: Rate) -> Self {
        Self {
            curve: Arc::new(ShiftedCurve::new(self.curve.clone(), shift)),
            ..self.clone()
        }
    }
}
