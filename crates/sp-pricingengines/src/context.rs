//! Immutable pricing context.
//!
//! Everything an engine needs about one option on one market, derived once
//! from the pricing date: times are `calendar days / 365`.

use sp_core::errors::{Error, Result};
use sp_core::{DiscountFactor, Rate, Real, Time, Volatility};
use sp_instruments::OptionContract;
use sp_market::Market;
use sp_methods::CashDividend;
use sp_time::{Date, DayCount};
use tracing::debug;

/// Day count of option times.
pub const OPTION_DAY_COUNT: DayCount = DayCount::Actual365Fixed;

/// Market inputs resolved for one option.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingContext {
    /// Pricing date.
    pub pricing_date: Date,
    /// Years to maturity.
    pub time_to_maturity: Time,
    /// Spot.
    pub spot: Real,
    /// Volatility at the option's strike and maturity.
    pub volatility: Volatility,
    /// Zero rate to maturity.
    pub rate: Rate,
    /// Continuous dividend yield.
    pub dividend_yield: Rate,
    /// Cash dividend falling inside `(pricing_date, maturity]`.
    pub dividend: Option<CashDividend>,
}

impl PricingContext {
    /// Resolve `option` against `market` at `pricing_date`.
    pub fn new(market: &Market, option: &OptionContract, pricing_date: Date) -> Result<Self> {
        Self::for_underlying(market, option.strike(), option.maturity(), pricing_date)
    }

    /// Resolve the underlying up to `maturity`, reading the volatility at
    /// `strike`.
    pub fn for_underlying(market: &Market, strike: Real, maturity: Date, pricing_date: Date) -> Result<Self> {
        let t = time_between(pricing_date, maturity);
        if t < 0.0 {
            return Err(Error::Date(format!(
                "maturity {maturity} precedes pricing date {pricing_date}"
            )));
        }
        if t == 0.0 {
            return Err(Error::NumericalInstability(format!(
                "option matures on the pricing date {pricing_date}"
            )));
        }

        let dividend = market.dividend().discrete().and_then(|(amount, date)| {
            let time = time_between(pricing_date, date);
            if time > 0.0 && time <= t {
                Some(CashDividend { amount, time })
            } else {
                debug!(%date, "cash dividend outside the option's life ignored");
                None
            }
        });

        Ok(Self {
            pricing_date,
            time_to_maturity: t,
            spot: market.spot(),
            volatility: market.volatility(strike, t)?,
            rate: market.rate(t),
            dividend_yield: market.dividend_yield(),
            dividend,
        })
    }

    /// Discount factor to maturity.
    pub fn discount(&self) -> DiscountFactor {
        (-self.rate * self.time_to_maturity).exp()
    }

    /// Years to the cash dividend, if one falls inside the option's life.
    pub fn time_to_dividend(&self) -> Option<Time> {
        self.dividend.map(|d| d.time)
    }
}

/// `calendar days / 365` between two dates.
pub fn time_between(start: Date, end: Date) -> Time {
    OPTION_DAY_COUNT.year_fraction(start, end)
}

/// Forward rate of each of `steps` equal steps up to `maturity`.
pub fn step_forward_rates(market: &Market, maturity: Time, steps: usize) -> Vec<Rate> {
    let dt = maturity / steps as Real;
    (0..steps)
        .map(|i| market.forward_rate(i as Real * dt, (i + 1) as Real * dt))
        .collect()
}
