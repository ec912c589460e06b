//! Option strategies on European legs sharing one maturity.

use sp_core::errors::Result;
use sp_core::{ensure, Real};
use sp_instruments::{OptionContract, OptionType};
use sp_time::Date;

use crate::strategy::{Leg, Strategy};

fn leg(option_type: OptionType, strike: Real, maturity: Date, quantity: Real) -> Result<Leg> {
    Ok(Leg::new(OptionContract::european(option_type, strike, maturity)?, quantity))
}

fn ensure_increasing(strikes: &[Real]) -> Result<()> {
    ensure!(
        strikes.windows(2).all(|w| w[0] < w[1]),
        "strikes must be strictly increasing, got {strikes:?}"
    );
    Ok(())
}

/// A single option held long.
pub fn vanilla(option: OptionContract) -> Strategy {
    Strategy::new("Vanilla", vec![Leg::new(option, 1.0)])
}

/// Long call at `k1`, short call at `k2 > k1`.
pub fn call_spread(k1: Real, k2: Real, maturity: Date) -> Result<Strategy> {
    ensure_increasing(&[k1, k2])?;
    Ok(Strategy::new(
        "Call Spread",
        vec![
            leg(OptionType::Call, k1, maturity, 1.0)?,
            leg(OptionType::Call, k2, maturity, -1.0)?,
        ],
    ))
}

/// Short put at `k1`, long put at `k2 > k1`.
pub fn put_spread(k1: Real, k2: Real, maturity: Date) -> Result<Strategy> {
    ensure_increasing(&[k1, k2])?;
    Ok(Strategy::new(
        "Put Spread",
        vec![
            leg(OptionType::Put, k1, maturity, -1.0)?,
            leg(OptionType::Put, k2, maturity, 1.0)?,
        ],
    ))
}

/// Calls at `k1 < k2 < k3` held `[1, -2, 1]`.
pub fn butterfly(k1: Real, k2: Real, k3: Real, maturity: Date) -> Result<Strategy> {
    ensure_increasing(&[k1, k2, k3])?;
    Ok(Strategy::new(
        "Butterfly Spread",
        vec![
            leg(OptionType::Call, k1, maturity, 1.0)?,
            leg(OptionType::Call, k2, maturity, -2.0)?,
            leg(OptionType::Call, k3, maturity, 1.0)?,
        ],
    ))
}

/// Calls at four increasing strikes held `[1, -1, -1, 1]`.
pub fn condor(k1: Real, k2: Real, k3: Real, k4: Real, maturity: Date) -> Result<Strategy> {
    ensure_increasing(&[k1, k2, k3, k4])?;
    Ok(Strategy::new(
        "Condor Spread",
        vec![
            leg(OptionType::Call, k1, maturity, 1.0)?,
            leg(OptionType::Call, k2, maturity, -1.0)?,
            leg(OptionType::Call, k3, maturity, -1.0)?,
            leg(OptionType::Call, k4, maturity, 1.0)?,
        ],
    ))
}

/// Long call and long put at the same strike.
pub fn straddle(strike: Real, maturity: Date) -> Result<Strategy> {
    Ok(Strategy::new(
        "Straddle",
        vec![
            leg(OptionType::Call, strike, maturity, 1.0)?,
            leg(OptionType::Put, strike, maturity, 1.0)?,
        ],
    ))
}

/// Long put at `k1`, long call at `k2 > k1`.
pub fn strangle(k1: Real, k2: Real, maturity: Date) -> Result<Strategy> {
    ensure_increasing(&[k1, k2])?;
    Ok(Strategy::new(
        "Strangle",
        vec![
            leg(OptionType::Put, k1, maturity, 1.0)?,
            leg(OptionType::Call, k2, maturity, 1.0)?,
        ],
    ))
}

/// Short put at `k1`, long call at `k2 > k1`.
pub fn risk_reversal(k1: Real, k2: Real, maturity: Date) -> Result<Strategy> {
    ensure_increasing(&[k1, k2])?;
    Ok(Strategy::new(
        "Risk Reversal",
        vec![
            leg(OptionType::Put, k1, maturity, -1.0)?,
            leg(OptionType::Call, k2, maturity, 1.0)?,
        ],
    ))
}

/// `notional` digitals struck at `strike`, replicated by a spread over
/// `(strike − ε, strike)` scaled by `notional / ε`.
///
/// The put side is long the upper put and short the lower one, so both
/// sides pay a positive `notional` in the limit.
pub fn digital_replication(
    option_type: OptionType,
    strike: Real,
    epsilon: Real,
    notional: Real,
    maturity: Date,
) -> Result<Strategy> {
    ensure!(epsilon > 0.0, "replication width must be positive, got {epsilon}");
    let gearing = notional / epsilon;
    let spread = match option_type {
        OptionType::Call => call_spread(strike - epsilon, strike, maturity)?,
        OptionType::Put => put_spread(strike - epsilon, strike, maturity)?,
    };
    let legs = spread
        .legs()
        .iter()
        .map(|l| Leg::new(l.option, l.quantity.signum() * gearing))
        .collect();
    Ok(Strategy::new("Digital Replication", legs))
}

/// Arbitrary European legs given as `(type, strike, quantity)`.
pub fn portfolio(positions: &[(OptionType, Real, Real)], maturity: Date) -> Result<Strategy> {
    let legs = positions
        .iter()
        .map(|&(option_type, strike, quantity)| leg(option_type, strike, maturity, quantity))
        .collect::<Result<Vec<_>>>()?;
    Ok(Strategy::new("Portfolio", legs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sp_market::{Dividend, Market};
    use sp_pricingengines::{price, Pricer};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Market, Pricer, Date) {
        let market = Market::new(100.0, 0.25, 0.03, Dividend::Continuous { yield_rate: 0.01 }).unwrap();
        (market, Pricer::black_scholes(date(2025, 1, 1)), date(2026, 1, 1))
    }

    fn quantities(s: &Strategy) -> Vec<Real> {
        s.legs().iter().map(|l| l.quantity).collect()
    }

    #[test]
    fn leg_quantities() {
        let m = date(2026, 1, 1);
        assert_eq!(quantities(&call_spread(90.0, 110.0, m).unwrap()), [1.0, -1.0]);
        assert_eq!(quantities(&put_spread(90.0, 110.0, m).unwrap()), [-1.0, 1.0]);
        assert_eq!(quantities(&butterfly(90.0, 100.0, 110.0, m).unwrap()), [1.0, -2.0, 1.0]);
        assert_eq!(quantities(&condor(80.0, 90.0, 110.0, 120.0, m).unwrap()), [1.0, -1.0, -1.0, 1.0]);
        assert_eq!(quantities(&straddle(100.0, m).unwrap()), [1.0, 1.0]);
        assert_eq!(quantities(&strangle(90.0, 110.0, m).unwrap()), [1.0, 1.0]);
        assert_eq!(quantities(&risk_reversal(90.0, 110.0, m).unwrap()), [-1.0, 1.0]);
        assert_eq!(
            quantities(&digital_replication(OptionType::Call, 100.0, 0.5, 3.0, m).unwrap()),
            [6.0, -6.0]
        );
    }

    #[test]
    fn misordered_strikes_are_rejected() {
        let m = date(2026, 1, 1);
        assert!(call_spread(110.0, 90.0, m).is_err());
        assert!(butterfly(90.0, 90.0, 110.0, m).is_err());
        assert!(digital_replication(OptionType::Call, 100.0, 0.0, 1.0, m).is_err());
        assert!(portfolio(&[(OptionType::Call, -1.0, 1.0)], m).is_err());
    }

    #[test]
    fn spreads_respect_their_payoff_bounds() {
        let (market, pricer, m) = setup();
        let df = market.discount(1.0);
        let cs = call_spread(90.0, 110.0, m).unwrap().price(&market, &pricer).unwrap();
        assert!(cs > 0.0 && cs < 20.0 * df, "call spread {cs}");
        let ps = put_spread(90.0, 110.0, m).unwrap().price(&market, &pricer).unwrap();
        assert!(ps > 0.0 && ps < 20.0 * df, "put spread {ps}");
        // bull call spread + bear put spread = (k2 - k1) discounted
        assert_abs_diff_eq!(cs + ps, 20.0 * df, epsilon = 1e-10);

        let fly = butterfly(90.0, 100.0, 110.0, m).unwrap().price(&market, &pricer).unwrap();
        assert!(fly > 0.0 && fly < 10.0 * df);
        let wide = condor(80.0, 90.0, 110.0, 120.0, m).unwrap().price(&market, &pricer).unwrap();
        assert!(wide > fly);
    }

    #[test]
    fn straddle_and_risk_reversal_from_their_legs() {
        let (market, pricer, m) = setup();
        let call = |k| price(&market, &OptionContract::european(OptionType::Call, k, m).unwrap(), &pricer).unwrap().npv;
        let put = |k| price(&market, &OptionContract::european(OptionType::Put, k, m).unwrap(), &pricer).unwrap().npv;
        assert_abs_diff_eq!(
            straddle(100.0, m).unwrap().price(&market, &pricer).unwrap(),
            call(100.0) + put(100.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            risk_reversal(90.0, 110.0, m).unwrap().price(&market, &pricer).unwrap(),
            call(110.0) - put(90.0),
            epsilon = 1e-12
        );
        let p = portfolio(&[(OptionType::Call, 100.0, 2.0), (OptionType::Put, 95.0, -1.0)], m).unwrap();
        assert_abs_diff_eq!(
            p.price(&market, &pricer).unwrap(),
            2.0 * call(100.0) - put(95.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn digital_replication_approaches_the_digital() {
        let (market, pricer, m) = setup();
        for option_type in [OptionType::Call, OptionType::Put] {
            let digital = OptionContract::digital(option_type, 100.0, m).unwrap();
            let target = 10.0 * price(&market, &digital, &pricer).unwrap().npv;
            let replicated = digital_replication(option_type, 100.0, 0.01, 10.0, m)
                .unwrap()
                .price(&market, &pricer)
                .unwrap();
            assert!((replicated - target).abs() < 0.01, "{option_type:?}: {replicated} vs {target}");
        }
    }
}
