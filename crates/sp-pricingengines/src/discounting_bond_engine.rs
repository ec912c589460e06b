//! Discounting engine for fixed-income instruments.
//!
//! NPV = Σ cf.amount × discount(t(cf.date)) over the cashflows paid after
//! the pricing date, with `t` measured by the engine's day count. The
//! clean price subtracts the interest accrued at the pricing date.

use std::sync::Arc;

use sp_core::errors::Result;
use sp_core::Real;
use sp_instruments::{FixedIncome, PricingResults};
use sp_market::{ShiftedCurve, YieldCurve};
use sp_time::{Date, DayCount};

const BASIS_POINT: Real = 1e-4;

/// Discounting engine.
#[derive(Debug, Clone)]
pub struct DiscountingBondEngine {
    curve: Arc<dyn YieldCurve>,
    pricing_date: Date,
    day_count: DayCount,
}

impl DiscountingBondEngine {
    /// Engine discounting on `curve` from `pricing_date`, ACT/365.25.
    pub fn new(curve: Arc<dyn YieldCurve>, pricing_date: Date) -> Self {
        Self {
            curve,
            pricing_date,
            day_count: DayCount::default(),
        }
    }

    /// The same engine with another discounting day count.
    pub fn with_day_count(self, day_count: DayCount) -> Self {
        Self { day_count, ..self }
    }

    fn dirty_price(&self, curve: &dyn YieldCurve, instrument: &dyn FixedIncome) -> Real {
        instrument
            .cashflows()
            .iter()
            .filter(|cf| cf.date > self.pricing_date)
            .map(|cf| cf.amount * curve.discount(self.day_count.year_fraction(self.pricing_date, cf.date)))
            .sum()
    }

    /// Dirty price, accrued interest, clean price and DV01.
    pub fn calculate(&self, instrument: &dyn FixedIncome) -> Result<PricingResults> {
        let dirty = self.dirty_price(self.curve.as_ref(), instrument);
        let accrued = instrument.accrued_interest(self.pricing_date);
        let bumped = |shift: Real| {
            let curve = ShiftedCurve::new(Arc::clone(&self.curve), shift);
            self.dirty_price(&curve, instrument)
        };
        let dv01 = (bumped(-BASIS_POINT) - bumped(BASIS_POINT)) / 2.0;
        Ok(PricingResults::from_npv(dirty)
            .with_result("dirty_price", dirty)
            .with_result("accrued_interest", accrued)
            .with_result("clean_price", dirty - accrued)
            .with_result("dv01", dv01))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sp_instruments::{FixedRateBond, ZeroCouponBond};
    use sp_market::FlatRate;
    use sp_time::Frequency;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn zero_coupon_is_one_discount_factor() {
        let curve = Arc::new(FlatRate::new(0.04));
        let engine = DiscountingBondEngine::new(curve, date(2025, 1, 1)).with_day_count(DayCount::Actual365Fixed);
        let zc = ZeroCouponBond::new(100.0, date(2025, 1, 1), date(2027, 1, 1)).unwrap();
        let results = engine.calculate(&zc).unwrap();
        assert_abs_diff_eq!(results.npv, 100.0 * (-0.04_f64 * 730.0 / 365.0).exp(), epsilon = 1e-10);
        assert_eq!(results.result("accrued_interest"), Some(0.0));
        assert!(results.result("dv01").unwrap() > 0.0);
    }

    #[test]
    fn past_flows_are_ignored_and_accrual_is_removed() {
        let curve = Arc::new(FlatRate::new(0.03));
        let bond = FixedRateBond::new(
            100.0,
            date(2024, 1, 1),
            date(2027, 1, 1),
            0.05,
            Frequency::Annual,
            DayCount::Actual365Fixed,
        )
        .unwrap();
        let engine = DiscountingBondEngine::new(curve, date(2025, 7, 1));
        let results = engine.calculate(&bond).unwrap();
        let dirty = results.result("dirty_price").unwrap();
        let clean = results.result("clean_price").unwrap();
        let accrued = results.result("accrued_interest").unwrap();
        assert!(accrued > 2.0 && accrued < 3.0, "accrued = {accrued}");
        assert_abs_diff_eq!(dirty - clean, accrued, epsilon = 1e-12);
        // two remaining flows: 5 and 105
        assert!(dirty > 100.0 && dirty < 110.0, "dirty = {dirty}");
    }
}
