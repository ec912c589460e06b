//! Structured products.

use serde::Serialize;
use sp_core::errors::Result;
use sp_core::{ensure, Real};
use sp_instruments::{BarrierDirection, BarrierKind, BarrierMonitoring, OptionContract, OptionType};
use sp_market::Market;
use sp_methods::AutocallProbabilities;
use sp_pricingengines::{MonteCarloEngine, MonteCarloSettings, Pricer, PricerKind};
use sp_time::{Date, Frequency, Schedule};
use tracing::debug;

use crate::certificates::base;
use crate::options::digital_replication;
use crate::strategy::Strategy;

/// Width of the call spreads replicating autocall digitals.
pub const AUTOCALL_REPLICATION_WIDTH: Real = 0.05;

/// Nominal the autocall pays back and its coupons are quoted on.
pub const AUTOCALL_NOMINAL: Real = 100.0;

fn down_and_in_put(strike: Real, barrier: Real, maturity: Date) -> Result<OptionContract> {
    OptionContract::barrier(
        OptionType::Put,
        strike,
        maturity,
        BarrierDirection::Down,
        BarrierKind::In,
        barrier,
        BarrierMonitoring::American,
    )
}

/// Underlying plus a short put at `strike`.
pub fn reverse_convertible(strike: Real, maturity: Date) -> Result<Strategy> {
    let mut s = base(maturity)?;
    s.push(OptionContract::european(OptionType::Put, strike, maturity)?, -1.0);
    Ok(s.renamed("Reverse Convertible"))
}

/// Underlying plus a short down-and-in put at `strike`, knocked in at
/// `barrier`.
pub fn barrier_reverse_convertible(strike: Real, barrier: Real, maturity: Date) -> Result<Strategy> {
    ensure!(barrier < strike, "barrier {barrier} must sit below the strike {strike}");
    let mut s = base(maturity)?;
    s.push(down_and_in_put(strike, barrier, maturity)?, -1.0);
    Ok(s.renamed("Barrier Reverse Convertible"))
}

/// Price of an autocall together with its redemption profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocallValuation {
    /// Σ quantity × leg price.
    pub price: Real,
    /// Redemption probability per observation date.
    pub redemption: AutocallProbabilities,
}

/// An autocallable note on one underlying.
///
/// Legs: a digital paying `coupon × nominal` above `strike` on each
/// observation date, a short down-and-in put at `strike` knocked in at
/// `barrier`, and the nominal paid at maturity.
#[derive(Debug, Clone)]
pub struct Autocall {
    strike: Real,
    barrier: Real,
    coupon: Real,
    frequency: Frequency,
    maturity: Date,
    observation_dates: Vec<Date>,
    strategy: Strategy,
}

impl Autocall {
    /// Autocall observed every `frequency` period from `start` to `maturity`.
    pub fn new(
        strike: Real,
        barrier: Real,
        coupon: Real,
        frequency: Frequency,
        start: Date,
        maturity: Date,
    ) -> Result<Self> {
        ensure!(strike > 0.0, "autocall strike must be positive, got {strike}");
        ensure!(
            barrier > 0.0 && barrier < strike,
            "barrier {barrier} must be positive and below the strike {strike}"
        );
        ensure!(coupon >= 0.0, "coupon must be non-negative, got {coupon}");
        let schedule = Schedule::new(start, maturity, frequency)?;
        let observation_dates = schedule.dates().to_vec();

        let gearing = coupon * AUTOCALL_NOMINAL;
        let mut strategy = Strategy::new("Autocall", Vec::new());
        for &date in &observation_dates {
            strategy.extend(digital_replication(
                OptionType::Call,
                strike,
                AUTOCALL_REPLICATION_WIDTH,
                gearing,
                date,
            )?);
        }
        strategy.push(down_and_in_put(strike, barrier, maturity)?, -1.0);
        strategy.push(OptionContract::digital(OptionType::Call, 0.0, maturity)?, AUTOCALL_NOMINAL);

        Ok(Self {
            strike,
            barrier,
            coupon,
            frequency,
            maturity,
            observation_dates,
            strategy,
        })
    }

    /// Redemption trigger and put strike.
    pub fn strike(&self) -> Real {
        self.strike
    }

    /// Knock-in level of the protection put.
    pub fn barrier(&self) -> Real {
        self.barrier
    }

    /// Coupon rate per observation.
    pub fn coupon(&self) -> Real {
        self.coupon
    }

    /// Final date.
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Observation dates, the last being maturity.
    pub fn observation_dates(&self) -> &[Date] {
        &self.observation_dates
    }

    /// The replicating legs.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Probability of redeeming at each observation, simulated from the
    /// pricing date.
    ///
    /// Uses the pricer's Monte Carlo settings, or the defaults for the
    /// other profiles.
    pub fn redemption_probabilities(&self, market: &Market, pricer: &Pricer) -> Result<AutocallProbabilities> {
        let settings = match pricer.pinned().kind {
            PricerKind::MonteCarlo(settings) => settings,
            _ => MonteCarloSettings::default(),
        };
        let engine = MonteCarloEngine::new(pricer.pricing_date, settings)?;
        engine.autocall_probabilities(market, self.strike, self.maturity, self.frequency)
    }

    /// Price and redemption profile.
    pub fn valuation(&self, market: &Market, pricer: &Pricer) -> Result<AutocallValuation> {
        let pricer = pricer.pinned();
        let price = self.strategy.price(market, &pricer)?;
        let redemption = self.redemption_probabilities(market, &pricer)?;
        debug!(
            price,
            expected_duration = redemption.expected_duration,
            observations = redemption.probabilities.len(),
            "autocall valued"
        );
        Ok(AutocallValuation { price, redemption })
    }

    /// Σ quantity × leg price.
    pub fn price(&self, market: &Market, pricer: &Pricer) -> Result<Real> {
        self.strategy.price(market, pricer)
    }
}
