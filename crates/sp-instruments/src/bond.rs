//! Fixed-income instruments.
//!
//! Every instrument reduces to a list of dated [`CashFlow`]s; the
//! discounting engine prices them off a yield curve. Coupon-bearing
//! instruments also expose their [`CouponPeriod`]s so that accrued interest
//! can be computed at any date.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::Serialize;
use sp_core::errors::Result;
use sp_core::{ensure, Rate, Real};
use sp_market::YieldCurve;
use sp_time::{Date, DayCount, Frequency, Schedule};

/// A dated payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CashFlow {
    /// Payment date.
    pub date: Date,
    /// Amount (negative when paid).
    pub amount: Real,
}

/// An accrual period with the rate that accrues over it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CouponPeriod {
    /// Accrual start.
    pub start: Date,
    /// Accrual end (= payment date).
    pub end: Date,
    /// Annual rate accruing over the period.
    pub rate: Rate,
}

/// A fixed-income instrument.
pub trait FixedIncome: Debug + Send + Sync {
    /// Notional amount.
    fn notional(&self) -> Real;

    /// Issue (start) date.
    fn issue_date(&self) -> Date;

    /// Maturity date.
    fn maturity_date(&self) -> Date;

    /// Accrual convention.
    fn day_count(&self) -> DayCount;

    /// All cashflows, ordered by date.
    fn cashflows(&self) -> Vec<CashFlow>;

    /// Coupon accrual periods; empty for instruments without coupons.
    fn coupon_periods(&self) -> Vec<CouponPeriod> {
        Vec::new()
    }

    /// Interest accrued since the start of the period containing `date`.
    fn accrued_interest(&self, date: Date) -> Real {
        self.coupon_periods()
            .iter()
            .find(|p| p.start <= date && date < p.end)
            .map_or(0.0, |p| {
                self.notional() * p.rate * self.day_count().year_fraction(p.start, date)
            })
    }
}

fn coupon_schedule(issue: Date, maturity: Date, frequency: Frequency) -> Result<Vec<(Date, Date)>> {
    let schedule = Schedule::new(issue, maturity, frequency)?;
    let mut periods = Vec::with_capacity(schedule.len());
    let mut previous = issue;
    for &date in schedule.dates().iter().filter(|&&d| d > issue) {
        periods.push((previous, date));
        previous = date;
    }
    Ok(periods)
}

fn with_redemption(mut flows: Vec<CashFlow>, notional: Real) -> Vec<CashFlow> {
    if let Some(last) = flows.last_mut() {
        last.amount += notional;
    }
    flows
}

// ── Zero coupon ───────────────────────────────────────────────────────────────

/// Pays the notional at maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCouponBond {
    notional: Real,
    issue: Date,
    maturity: Date,
}

impl ZeroCouponBond {
    /// A zero-coupon bond.
    pub fn new(notional: Real, issue: Date, maturity: Date) -> Result<Self> {
        ensure!(issue <= maturity, "issue date {issue} is after maturity {maturity}");
        Ok(Self {
            notional,
            issue,
            maturity,
        })
    }
}

impl FixedIncome for ZeroCouponBond {
    fn notional(&self) -> Real {
        self.notional
    }

    fn issue_date(&self) -> Date {
        self.issue
    }

    fn maturity_date(&self) -> Date {
        self.maturity
    }

    fn day_count(&self) -> DayCount {
        DayCount::Actual36525
    }

    fn cashflows(&self) -> Vec<CashFlow> {
        vec![CashFlow {
            date: self.maturity,
            amount: self.notional,
        }]
    }
}

// ── Fixed rate ────────────────────────────────────────────────────────────────

/// Fixed coupons `N · rate · accrual` plus the notional on the last date.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRateBond {
    notional: Real,
    issue: Date,
    maturity: Date,
    coupon_rate: Rate,
    day_count: DayCount,
    periods: Vec<(Date, Date)>,
}

impl FixedRateBond {
    /// A fixed-rate bond paying at `frequency`.
    pub fn new(
        notional: Real,
        issue: Date,
        maturity: Date,
        coupon_rate: Rate,
        frequency: Frequency,
        day_count: DayCount,
    ) -> Result<Self> {
        Ok(Self {
            notional,
            issue,
            maturity,
            coupon_rate,
            day_count,
            periods: coupon_schedule(issue, maturity, frequency)?,
        })
    }

    /// Annual coupon rate.
    pub fn coupon_rate(&self) -> Rate {
        self.coupon_rate
    }
}

impl FixedIncome for FixedRateBond {
    fn notional(&self) -> Real {
        self.notional
    }

    fn issue_date(&self) -> Date {
        self.issue
    }

    fn maturity_date(&self) -> Date {
        self.maturity
    }

    fn day_count(&self) -> DayCount {
        self.day_count
    }

    fn cashflows(&self) -> Vec<CashFlow> {
        let coupons = self
            .periods
            .iter()
            .map(|&(start, end)| CashFlow {
                date: end,
                amount: self.notional * self.coupon_rate * self.day_count.year_fraction(start, end),
            })
            .collect();
        with_redemption(coupons, self.notional)
    }

    fn coupon_periods(&self) -> Vec<CouponPeriod> {
        self.periods
            .iter()
            .map(|&(start, end)| CouponPeriod {
                start,
                end,
                rate: self.coupon_rate,
            })
            .collect()
    }
}

// ── Floating rate ─────────────────────────────────────────────────────────────

/// Coupons fixed off an index curve: the index zero rate at the payment
/// date (ACT/365.25 from issue) plus a spread.
#[derive(Debug, Clone)]
pub struct FloatingRateBond {
    notional: Real,
    issue: Date,
    maturity: Date,
    index: Arc<dyn YieldCurve>,
    spread: Rate,
    day_count: DayCount,
    periods: Vec<(Date, Date)>,
}

impl FloatingRateBond {
    /// A floating-rate bond on `index`.
    pub fn new(
        notional: Real,
        issue: Date,
        maturity: Date,
        index: Arc<dyn YieldCurve>,
        spread: Rate,
        frequency: Frequency,
        day_count: DayCount,
    ) -> Result<Self> {
        Ok(Self {
            notional,
            issue,
            maturity,
            index,
            spread,
            day_count,
            periods: coupon_schedule(issue, maturity, frequency)?,
        })
    }

    fn period_rate(&self, end: Date) -> Rate {
        let t = DayCount::Actual36525.year_fraction(self.issue, end);
        self.index.zero_rate(t) + self.spread
    }
}

impl FixedIncome for FloatingRateBond {
    fn notional(&self) -> Real {
        self.notional
    }

    fn issue_date(&self) -> Date {
        self.issue
    }

    fn maturity_date(&self) -> Date {
        self.maturity
    }

    fn day_count(&self) -> DayCount {
        self.day_count
    }

    fn cashflows(&self) -> Vec<CashFlow> {
        let coupons = self
            .coupon_periods()
            .into_iter()
            .map(|p| CashFlow {
                date: p.end,
                amount: self.notional * p.rate * self.day_count.year_fraction(p.start, p.end),
            })
            .collect();
        with_redemption(coupons, self.notional)
    }

    fn coupon_periods(&self) -> Vec<CouponPeriod> {
        self.periods
            .iter()
            .map(|&(start, end)| CouponPeriod {
                start,
                end,
                rate: self.period_rate(end),
            })
            .collect()
    }
}

// ── Swap ──────────────────────────────────────────────────────────────────────

/// Receive floating, pay fixed, on a common schedule.
///
/// Flows are netted per date; the notional exchanges cancel and dates
/// whose net amount is zero are dropped.
#[derive(Debug, Clone)]
pub struct InterestRateSwap {
    fixed: FixedRateBond,
    floating: FloatingRateBond,
}

impl InterestRateSwap {
    /// A payer swap (fixed paid, floating received).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        notional: Real,
        issue: Date,
        maturity: Date,
        fixed_rate: Rate,
        index: Arc<dyn YieldCurve>,
        spread: Rate,
        frequency: Frequency,
        day_count: DayCount,
    ) -> Result<Self> {
        Ok(Self {
            fixed: FixedRateBond::new(notional, issue, maturity, fixed_rate, frequency, day_count)?,
            floating: FloatingRateBond::new(notional, issue, maturity, index, spread, frequency, day_count)?,
        })
    }
}

impl FixedIncome for InterestRateSwap {
    fn notional(&self) -> Real {
        self.fixed.notional()
    }

    fn issue_date(&self) -> Date {
        self.fixed.issue_date()
    }

    fn maturity_date(&self) -> Date {
        self.fixed.maturity_date()
    }

    fn day_count(&self) -> DayCount {
        self.fixed.day_count()
    }

    fn cashflows(&self) -> Vec<CashFlow> {
        let mut net: BTreeMap<Date, Real> = BTreeMap::new();
        for cf in self.floating.cashflows() {
            *net.entry(cf.date).or_default() += cf.amount;
        }
        for cf in self.fixed.cashflows() {
            *net.entry(cf.date).or_default() -= cf.amount;
        }
        net.into_iter()
            .filter(|(_, amount)| *amount != 0.0)
            .map(|(date, amount)| CashFlow { date, amount })
            .collect()
    }

    fn coupon_periods(&self) -> Vec<CouponPeriod> {
        self.floating
            .coupon_periods()
            .into_iter()
            .map(|p| CouponPeriod {
                rate: p.rate - self.fixed.coupon_rate(),
                ..p
            })
            .collect()
    }
}
