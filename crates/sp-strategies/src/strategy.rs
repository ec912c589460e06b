//! Weighted compositions of option legs.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sp_core::errors::Result;
use sp_core::Real;
use sp_instruments::OptionContract;
use sp_market::Market;
use sp_pricingengines::{greeks, price, Greeks, Pricer};
use tracing::debug;

/// One option held in a signed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// The contract.
    pub option: OptionContract,
    /// Signed holding; negative is short.
    pub quantity: Real,
}

impl Leg {
    /// A leg of `quantity` units of `option`.
    pub fn new(option: OptionContract, quantity: Real) -> Self {
        Self { option, quantity }
    }
}

/// A named, ordered list of legs.
///
/// Legs share nothing, so they are priced in parallel. An unseeded Monte
/// Carlo profile is pinned to one seed first so every leg sees the same
/// random numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    name: String,
    legs: Vec<Leg>,
}

impl Strategy {
    /// A strategy over `legs`.
    pub fn new(name: impl Into<String>, legs: Vec<Leg>) -> Self {
        Self {
            name: name.into(),
            legs,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The legs, in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Number of legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Whether there are no legs.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Append a leg.
    pub fn push(&mut self, option: OptionContract, quantity: Real) {
        self.legs.push(Leg::new(option, quantity));
    }

    /// Append every leg of `other`.
    pub fn extend(&mut self, other: Strategy) {
        self.legs.extend(other.legs);
    }

    /// The same legs under another name.
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Per-unit price of each leg.
    pub fn leg_prices(&self, market: &Market, pricer: &Pricer) -> Result<Vec<Real>> {
        let pricer = pricer.pinned();
        debug!(strategy = %self.name, legs = self.legs.len(), engine = pricer.kind.name(), "pricing strategy");
        self.legs
            .par_iter()
            .map(|leg| price(market, &leg.option, &pricer).map(|r| r.npv))
            .collect()
    }

    /// Σ quantity × leg price.
    pub fn price(&self, market: &Market, pricer: &Pricer) -> Result<Real> {
        let prices = self.leg_prices(market, pricer)?;
        Ok(self.legs.iter().zip(prices).map(|(leg, p)| leg.quantity * p).sum())
    }

    /// Σ quantity × leg Greeks.
    pub fn greeks(&self, market: &Market, pricer: &Pricer) -> Result<Greeks> {
        let pricer = pricer.pinned();
        let weighted = self
            .legs
            .par_iter()
            .map(|leg| greeks(market, &leg.option, &pricer).map(|g| g * leg.quantity))
            .collect::<Result<Vec<_>>>()?;
        Ok(weighted.into_iter().sum())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} legs)", self.name, self.legs.len())?;
        for (i, leg) in self.legs.iter().enumerate() {
            writeln!(
                f,
                "  {}: {:+} × {} {:?} K={} T={}",
                i + 1,
                leg.quantity,
                leg.option.payoff().name(),
                leg.option.option_type(),
                leg.option.strike(),
                leg.option.maturity()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sp_instruments::OptionType;
    use sp_market::Dividend;
    use sp_time::Date;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn call(strike: Real) -> OptionContract {
        OptionContract::european(OptionType::Call, strike, date(2026, 1, 1)).unwrap()
    }

    #[test]
    fn price_is_the_weighted_sum_of_legs() {
        let market = Market::new(100.0, 0.2, 0.03, Dividend::None).unwrap();
        let pricer = Pricer::black_scholes(date(2025, 1, 1));
        let strategy = Strategy::new("test", vec![Leg::new(call(90.0), 2.0), Leg::new(call(110.0), -0.5)]);
        let legs = strategy.leg_prices(&market, &pricer).unwrap();
        assert_eq!(legs.len(), 2);
        assert_abs_diff_eq!(
            strategy.price(&market, &pricer).unwrap(),
            2.0 * legs[0] - 0.5 * legs[1],
            epsilon = 1e-12
        );
    }

    #[test]
    fn greeks_are_weighted_and_empty_is_zero() {
        let market = Market::new(100.0, 0.2, 0.03, Dividend::None).unwrap();
        let pricer = Pricer::black_scholes(date(2025, 1, 1));
        let single = greeks(&market, &call(100.0), &pricer).unwrap();
        let doubled = Strategy::new("x2", vec![Leg::new(call(100.0), 2.0)]).greeks(&market, &pricer).unwrap();
        assert_abs_diff_eq!(doubled.delta, 2.0 * single.delta, epsilon = 1e-12);
        assert_abs_diff_eq!(doubled.vega, 2.0 * single.vega, epsilon = 1e-12);

        let empty = Strategy::new("empty", Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.price(&market, &pricer).unwrap(), 0.0);
        assert_eq!(empty.greeks(&market, &pricer).unwrap(), Greeks::default());
    }

    #[test]
    fn extend_keeps_order_and_display_lists_legs() {
        let mut a = Strategy::new("a", vec![Leg::new(call(90.0), 1.0)]);
        a.extend(Strategy::new("b", vec![Leg::new(call(110.0), -1.0)]));
        a.push(call(120.0), 3.0);
        assert_eq!(a.len(), 3);
        assert_eq!(a.legs()[1].option.strike(), 110.0);
        let shown = a.renamed("combo").to_string();
        assert!(shown.starts_with("combo (3 legs)"));
        assert!(shown.contains("-1 × european"));
    }

    #[test]
    fn unseeded_monte_carlo_legs_share_random_numbers() {
        let market = Market::new(100.0, 0.2, 0.03, Dividend::None).unwrap();
        let pricer = Pricer::monte_carlo(date(2025, 1, 1), 1, 2_000, None).unwrap();
        // identical legs see identical paths
        let strategy = Strategy::new("twins", vec![Leg::new(call(100.0), 1.0), Leg::new(call(100.0), -1.0)]);
        assert_abs_diff_eq!(strategy.price(&market, &pricer).unwrap(), 0.0, epsilon = 1e-12);
    }
}
