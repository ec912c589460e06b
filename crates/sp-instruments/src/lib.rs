//! # sp-instruments
//!
//! What gets priced: option contracts carrying a [`PayoffKind`], the
//! fixed-income instruments and their cashflows, and the
//! [`PricingResults`] every engine returns.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bond;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use bond::{
    CashFlow, CouponPeriod, FixedIncome, FixedRateBond, FloatingRateBond, InterestRateSwap,
    ZeroCouponBond,
};
pub use instrument::PricingResults;
pub use option::OptionContract;
pub use payoff::{Barrier, BarrierDirection, BarrierKind, BarrierMonitoring, OptionType, PayoffKind};
