//! Trinomial tree engine.
//!
//! Maps option contracts onto [`TrinomialTree`]: the lattice is built from
//! the pricing context (per-layer forward rates, dividend yield, cash
//! dividend) and valued backward with a payoff adapter.
//!
//! | Payoff | Lattice treatment |
//! |---|---|
//! | European, Digital | terminal payoff |
//! | American | early exercise at every node |
//! | Barrier, European monitoring | terminal payoff switched by the level |
//! | Barrier, American monitoring | knock-outs zero breached nodes; knock-ins are vanilla − knock-out |
//! | Asian | not supported |

use std::time::{Duration, Instant};

use sp_core::errors::{Error, Result};
use sp_core::Real;
use sp_instruments::{Barrier, BarrierKind, BarrierMonitoring, OptionContract, PayoffKind, PricingResults};
use sp_market::Market;
use sp_methods::{LatticePayoff, TreeParameters, TrinomialTree};
use sp_time::Date;
use tracing::debug;

use crate::context::{step_forward_rates, PricingContext};
use crate::engine::OptionEngine;
use crate::pricer::TreeSettings;

#[derive(Debug, Clone, Copy)]
enum Rule {
    Terminal,
    EarlyExercise,
    TerminalBarrier(Barrier),
    KnockOut(Barrier),
}

/// An option contract seen through the lattice's payoff callbacks.
#[derive(Debug, Clone, Copy)]
struct TreePayoff<'a> {
    option: &'a OptionContract,
    rule: Rule,
}

impl LatticePayoff for TreePayoff<'_> {
    fn terminal(&self, spot: Real) -> Real {
        match &self.rule {
            Rule::TerminalBarrier(b) if !b.is_active(b.is_breached(spot)) => 0.0,
            _ => self.option.intrinsic(spot),
        }
    }

    fn exercise(&self, spot: Real) -> Option<Real> {
        match self.rule {
            Rule::EarlyExercise => Some(self.option.intrinsic(spot)),
            _ => None,
        }
    }

    fn is_knocked_out(&self, spot: Real) -> bool {
        match &self.rule {
            Rule::KnockOut(b) => b.is_breached(spot),
            _ => false,
        }
    }
}

/// Trinomial tree engine.
#[derive(Debug, Clone, Copy)]
pub struct TreeEngine {
    pricing_date: Date,
    settings: TreeSettings,
}

impl TreeEngine {
    /// Engine valuing at `pricing_date`.
    pub fn new(pricing_date: Date, settings: TreeSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { pricing_date, settings })
    }

    /// Lattice inputs for `option` on `market`.
    pub fn parameters(&self, market: &Market, option: &OptionContract) -> Result<TreeParameters> {
        let ctx = PricingContext::new(market, option, self.pricing_date)?;
        Ok(TreeParameters {
            spot: ctx.spot,
            volatility: ctx.volatility,
            dividend_yield: ctx.dividend_yield,
            maturity: ctx.time_to_maturity,
            rates: step_forward_rates(market, ctx.time_to_maturity, self.settings.steps),
            dividend: ctx.dividend,
            pruning_limit: self.settings.effective_pruning_limit(),
            policy: self.settings.policy,
            deadline: self
                .settings
                .deadline_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        })
    }

    /// Build the lattice and value `option` on it, returning the valued
    /// tree for inspection (node prices and exercise flags are filled in).
    pub fn priced_tree(&self, market: &Market, option: &OptionContract) -> Result<(Real, TrinomialTree)> {
        let rule = match option.payoff() {
            PayoffKind::European | PayoffKind::Digital => Rule::Terminal,
            PayoffKind::American { .. } => Rule::EarlyExercise,
            PayoffKind::Barrier(b) if b.monitoring == BarrierMonitoring::European => Rule::TerminalBarrier(*b),
            PayoffKind::Barrier(b) if b.kind == BarrierKind::Out => Rule::KnockOut(*b),
            PayoffKind::Barrier(b) => Rule::KnockOut(b.opposite()),
            PayoffKind::Asian { .. } => {
                return Err(Error::NotImplemented("the trinomial tree does not price Asian options".into()))
            }
        };

        let mut tree = TrinomialTree::build(self.parameters(market, option)?)?;
        let value = tree.price(&TreePayoff { option, rule })?;

        let value = match option.barrier_spec() {
            Some(b) if b.monitoring == BarrierMonitoring::American && b.kind == BarrierKind::In => {
                let knock_out = value;
                let vanilla = tree.price(&TreePayoff {
                    option,
                    rule: Rule::Terminal,
                })?;
                (vanilla - knock_out).max(0.0)
            }
            _ => value,
        };
        debug!(
            payoff = option.payoff().name(),
            steps = self.settings.steps,
            nodes = tree.nodes().len(),
            value,
            "tree valuation"
        );
        Ok((value, tree))
    }
}

impl OptionEngine for TreeEngine {
    fn calculate(&self, market: &Market, option: &OptionContract) -> Result<PricingResults> {
        let (value, tree) = self.priced_tree(market, option)?;
        let exercised = tree.nodes().iter().filter(|n| n.is_exercised).count();
        Ok(PricingResults::from_npv(value)
            .with_result("nodes", tree.nodes().len() as Real)
            .with_result("negative_probabilities", tree.negative_probability_count() as Real)
            .with_result("exercised_nodes", exercised as Real))
    }
}
