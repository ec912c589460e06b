//! Monte Carlo engine.
//!
//! The discretization follows the product:
//!
//! 1. a cash dividend inside the option's life: full paths with the
//!    dividend dropped on its step;
//! 2. otherwise path-dependent payoffs (Asian, American, continuously
//!    monitored barriers): full incremental paths;
//! 3. otherwise a single step to maturity.
//!
//! American options go through Longstaff–Schwartz, everything else is the
//! discounted mean of the path payoff. The price's standard error is
//! reported as the error estimate, and left out for a single draw.

use sp_core::errors::{Error, Result};
use sp_core::{DiscountFactor, Real, Size, Time};
use sp_instruments::{OptionContract, PayoffKind, PricingResults};
use sp_market::Market;
use sp_math::{RngStreams, Statistics};
use sp_methods::{
    autocall_probabilities, longstaff_schwartz, AutocallProbabilities, Discretization, GbmModel, MonteCarloModel,
};
use sp_time::{Date, Frequency, Schedule};
use tracing::{debug, warn};

use crate::context::{step_forward_rates, PricingContext, OPTION_DAY_COUNT};
use crate::engine::OptionEngine;
use crate::pricer::MonteCarloSettings;

/// Grid steps of observation times: nearest step, at least the first,
/// with the last observation on the final step.
pub fn observation_steps(times: &[Time], maturity: Time, steps: Size) -> Vec<usize> {
    let dt = maturity / steps as Real;
    let mut grid: Vec<usize> = times
        .iter()
        .map(|t| ((t / dt).round() as usize).clamp(1, steps))
        .collect();
    if let Some(last) = grid.last_mut() {
        *last = steps;
    }
    grid
}

/// Monte Carlo engine.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloEngine {
    pricing_date: Date,
    settings: MonteCarloSettings,
}

impl MonteCarloEngine {
    /// Engine valuing at `pricing_date`.
    pub fn new(pricing_date: Date, settings: MonteCarloSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { pricing_date, settings })
    }

    /// The random streams: seeded, or seeded once from OS entropy.
    pub fn streams(&self) -> RngStreams {
        match self.settings.seed {
            Some(seed) => RngStreams::new(self.settings.rng, seed),
            None => {
                let streams = RngStreams::from_entropy(self.settings.rng);
                debug!(seed = streams.seed(), "monte carlo seed drawn from entropy");
                streams
            }
        }
    }

    /// Path discretization for `option`.
    pub fn discretization(option: &OptionContract, ctx: &PricingContext) -> Discretization {
        match ctx.dividend {
            Some(d) if d.amount > 0.0 => Discretization::DiscreteDividend,
            _ if option.payoff().is_path_dependent() => Discretization::Incremental,
            _ => Discretization::Terminal,
        }
    }

    fn model(&self, market: &Market, ctx: &PricingContext) -> GbmModel {
        GbmModel {
            spot: ctx.spot,
            volatility: ctx.volatility,
            dividend_yield: ctx.dividend_yield,
            maturity: ctx.time_to_maturity,
            step_rates: step_forward_rates(market, ctx.time_to_maturity, self.settings.steps),
            dividend: ctx.dividend,
        }
    }

    fn averaging_steps(&self, maturity: Date, ctx: &PricingContext, frequency: Frequency) -> Result<Vec<usize>> {
        let schedule = Schedule::new(self.pricing_date, maturity, frequency)?;
        let times = schedule.times_from(self.pricing_date, OPTION_DAY_COUNT);
        Ok(observation_steps(&times, ctx.time_to_maturity, self.settings.steps))
    }

    fn statistics(&self, market: &Market, option: &OptionContract, ctx: &PricingContext) -> Result<Statistics> {
        let discretization = Self::discretization(option, ctx);
        let model = self.model(market, ctx);
        let streams = self.streams();
        debug!(
            payoff = option.payoff().name(),
            ?discretization,
            draws = self.settings.draws,
            steps = self.settings.steps,
            seed = streams.seed(),
            "monte carlo pricing"
        );

        match option.payoff() {
            PayoffKind::American { regression } => {
                let paths = model.simulate(discretization, self.settings.draws, streams)?;
                let dt = model.dt();
                let step_discounts: Vec<DiscountFactor> =
                    model.step_rates.iter().map(|r| (-r * dt).exp()).collect();
                let scale = if option.strike() > 0.0 { option.strike() } else { ctx.spot };
                longstaff_schwartz(&paths, |s| option.intrinsic(s), regression, &step_discounts, scale)
            }
            PayoffKind::Asian {
                averaging: Some(frequency),
            } => {
                let averaging = self.averaging_steps(option.maturity(), ctx, *frequency)?;
                let mc = MonteCarloModel::new(model, discretization, self.settings.draws, streams)?;
                mc.estimate(ctx.discount(), |p| option.path_payoff(p, Some(&averaging)))
            }
            _ => {
                let mc = MonteCarloModel::new(model, discretization, self.settings.draws, streams)?;
                mc.estimate(ctx.discount(), |p| option.path_payoff(p, None))
            }
        }
    }

    /// Probabilities of an autocall redeeming on each observation date of a
    /// `frequency` schedule up to `maturity`, i.e. of the underlying first
    /// closing strictly above `barrier` there.
    pub fn autocall_probabilities(
        &self,
        market: &Market,
        barrier: Real,
        maturity: Date,
        frequency: Frequency,
    ) -> Result<AutocallProbabilities> {
        let ctx = PricingContext::for_underlying(market, barrier, maturity, self.pricing_date)?;
        let discretization = match ctx.dividend {
            Some(d) if d.amount > 0.0 => Discretization::DiscreteDividend,
            _ => Discretization::Incremental,
        };
        let paths = self.model(market, &ctx).simulate(discretization, self.settings.draws, self.streams())?;
        let schedule = Schedule::new(self.pricing_date, maturity, frequency)?;
        let times = schedule.times_from(self.pricing_date, OPTION_DAY_COUNT);
        let steps = observation_steps(&times, ctx.time_to_maturity, self.settings.steps);
        autocall_probabilities(&paths, barrier, &steps, &times)
    }
}

impl OptionEngine for MonteCarloEngine {
    fn calculate(&self, market: &Market, option: &OptionContract) -> Result<PricingResults> {
        let ctx = PricingContext::new(market, option, self.pricing_date)?;
        let stats = self.statistics(market, option, &ctx)?;
        let Some(npv) = stats.mean() else {
            return Err(Error::Runtime("no Monte Carlo samples".into()));
        };
        if !npv.is_finite() {
            return Err(Error::NumericalInstability(format!("Monte Carlo mean is {npv}")));
        }
        let results = PricingResults::from_npv(npv).with_result("draws", stats.samples() as Real);
        match stats.error_estimate() {
            Some(error) => Ok(results.with_error_estimate(error)),
            None => {
                warn!(draws = stats.samples(), "too few draws for a standard error");
                Ok(results)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_instruments::OptionType;
    use sp_market::Dividend;
    use sp_math::RngKind;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine(steps: usize, draws: usize) -> MonteCarloEngine {
        MonteCarloEngine::new(
            date(2025, 1, 1),
            MonteCarloSettings {
                steps,
                draws,
                seed: Some(42),
                rng: RngKind::MersenneTwister,
            },
        )
        .unwrap()
    }

    #[test]
    fn observation_steps_round_to_the_grid() {
        assert_eq!(observation_steps(&[0.25, 0.5, 0.75, 1.0], 1.0, 12), vec![3, 6, 9, 12]);
        assert_eq!(observation_steps(&[0.01, 0.99], 1.0, 4), vec![1, 4]);
        assert!(observation_steps(&[], 1.0, 4).is_empty());
    }

    #[test]
    fn discretization_follows_the_product() {
        let maturity = date(2026, 1, 1);
        let plain = Market::new(100.0, 0.2, 0.05, Dividend::None).unwrap();
        let paying = Market::new(
            100.0,
            0.2,
            0.05,
            Dividend::Discrete {
                amount: 2.0,
                date: date(2025, 6, 1),
            },
        )
        .unwrap();
        let call = OptionContract::european(OptionType::Call, 100.0, maturity).unwrap();
        let asian = OptionContract::asian(OptionType::Call, 100.0, maturity, None).unwrap();
        let ctx = |m: &Market, o: &OptionContract| PricingContext::new(m, o, date(2025, 1, 1)).unwrap();

        assert_eq!(MonteCarloEngine::discretization(&call, &ctx(&plain, &call)), Discretization::Terminal);
        assert_eq!(MonteCarloEngine::discretization(&asian, &ctx(&plain, &asian)), Discretization::Incremental);
        assert_eq!(
            MonteCarloEngine::discretization(&call, &ctx(&paying, &call)),
            Discretization::DiscreteDividend
        );
    }

    #[test]
    fn one_draw_is_a_price() {
        let market = Market::new(100.0, 0.2, 0.05, Dividend::None).unwrap();
        let call = OptionContract::european(OptionType::Call, 100.0, date(2026, 1, 1)).unwrap();
        let results = engine(1, 1).calculate(&market, &call).unwrap();
        assert!(results.npv >= 0.0);
        assert_eq!(results.error_estimate, None);
        let two = engine(1, 2).calculate(&market, &call).unwrap();
        assert!(two.error_estimate.is_some());
    }

    #[test]
    fn seeded_prices_repeat() {
        let market = Market::new(100.0, 0.2, 0.05, Dividend::None).unwrap();
        let asian = OptionContract::asian(OptionType::Put, 100.0, date(2026, 1, 1), Some(Frequency::Monthly)).unwrap();
        let first = engine(24, 2000).calculate(&market, &asian).unwrap();
        let second = engine(24, 2000).calculate(&market, &asian).unwrap();
        assert_eq!(first, second);
        assert!(first.error_estimate.unwrap() > 0.0);
    }

    #[test]
    fn averaging_beats_the_vanilla() {
        // averaging lowers the volatility of the payoff
        let market = Market::new(100.0, 0.3, 0.03, Dividend::None).unwrap();
        let maturity = date(2026, 1, 1);
        let vanilla = OptionContract::european(OptionType::Call, 100.0, maturity).unwrap();
        let asian = OptionContract::asian(OptionType::Call, 100.0, maturity, Some(Frequency::Quarterly)).unwrap();
        let v = engine(52, 20_000).calculate(&market, &vanilla).unwrap().npv;
        let a = engine(52, 20_000).calculate(&market, &asian).unwrap().npv;
        assert!(a < v, "asian {a} vanilla {v}");
    }

    #[test]
    fn autocall_mass_is_one() {
        let market = Market::new(100.0, 0.25, 0.02, Dividend::None).unwrap();
        let result = engine(48, 5000)
            .autocall_probabilities(&market, 105.0, date(2027, 1, 1), Frequency::Semiannual)
            .unwrap();
        assert_eq!(result.probabilities.len(), 4);
        let total: f64 = result.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(result.expected_duration > 0.4 && result.expected_duration <= 2.0);
    }
}
