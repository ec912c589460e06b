//! Certificates.
//!
//! Every certificate but the airbag holds the underlying through a
//! zero-strike call and adds options around it. The protective leg is a
//! down-and-out put monitored continuously.

use sp_core::errors::Result;
use sp_core::{ensure, Real};
use sp_instruments::{BarrierDirection, BarrierKind, BarrierMonitoring, OptionContract, OptionType};
use sp_time::Date;

use crate::strategy::{Leg, Strategy};

/// The underlying held as a zero-strike call.
pub fn base(maturity: Date) -> Result<Strategy> {
    Ok(Strategy::new(
        "Certificate",
        vec![Leg::new(OptionContract::european(OptionType::Call, 0.0, maturity)?, 1.0)],
    ))
}

fn down_and_out_put(strike: Real, barrier: Real, maturity: Date) -> Result<OptionContract> {
    OptionContract::barrier(
        OptionType::Put,
        strike,
        maturity,
        BarrierDirection::Down,
        BarrierKind::Out,
        barrier,
        BarrierMonitoring::American,
    )
}

/// Underlying capped at `cap`.
pub fn discount(cap: Real, maturity: Date) -> Result<Strategy> {
    let mut s = base(maturity)?;
    s.push(OptionContract::european(OptionType::Call, cap, maturity)?, -1.0);
    Ok(s.renamed("Discount"))
}

/// Underlying with a floor at `bonus` as long as `barrier` is never touched.
pub fn bonus(bonus: Real, barrier: Real, maturity: Date) -> Result<Strategy> {
    ensure!(barrier < bonus, "barrier {barrier} must sit below the bonus level {bonus}");
    let mut s = base(maturity)?;
    s.push(down_and_out_put(bonus, barrier, maturity)?, 1.0);
    Ok(s.renamed("Bonus"))
}

/// Bonus certificate capped at `cap`.
pub fn capped_bonus(bonus: Real, barrier: Real, cap: Real, maturity: Date) -> Result<Strategy> {
    ensure!(barrier < bonus, "barrier {barrier} must sit below the bonus level {bonus}");
    ensure!(cap >= bonus, "cap {cap} must not be below the bonus level {bonus}");
    let mut s = base(maturity)?;
    s.push(down_and_out_put(bonus, barrier, maturity)?, 1.0);
    s.push(OptionContract::european(OptionType::Call, cap, maturity)?, -1.0);
    Ok(s.renamed("Capped Bonus"))
}

/// Bonus certificate with `participation` in the upside above `bonus`.
pub fn outperformance_bonus(bonus: Real, barrier: Real, participation: Real, maturity: Date) -> Result<Strategy> {
    ensure!(barrier < bonus, "barrier {barrier} must sit below the bonus level {bonus}");
    ensure!(participation >= 0.0, "participation must be non-negative, got {participation}");
    let mut s = base(maturity)?;
    s.push(down_and_out_put(bonus, barrier, maturity)?, 1.0);
    s.push(OptionContract::european(OptionType::Call, bonus, maturity)?, participation - 1.0);
    Ok(s.renamed("Outperformance Bonus"))
}

/// Gains on both sides of `strike` while `barrier` holds.
pub fn twin_win(strike: Real, barrier: Real, maturity: Date) -> Result<Strategy> {
    ensure!(barrier < strike, "barrier {barrier} must sit below the strike {strike}");
    let mut s = base(maturity)?;
    s.push(down_and_out_put(strike, barrier, maturity)?, 2.0);
    Ok(s.renamed("Twin Win"))
}

/// Flat at `k2` between `k1` and `k2`, leveraged `k2 / k1` below `k1`.
pub fn airbag(k1: Real, k2: Real, maturity: Date) -> Result<Strategy> {
    ensure!(k1 > 0.0 && k1 < k2, "airbag needs 0 < k1 < k2, got {k1} and {k2}");
    let leverage = k2 / k1;
    let call = |k| OptionContract::european(OptionType::Call, k, maturity);
    Ok(Strategy::new(
        "Airbag",
        vec![
            Leg::new(call(0.0)?, leverage),
            Leg::new(call(k1)?, -leverage),
            Leg::new(call(k2)?, 1.0),
        ],
    ))
}
