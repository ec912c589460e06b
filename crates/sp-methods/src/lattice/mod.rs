//! Trinomial lattice for single-asset options.
//!
//! # Overview
//!
//! * [`TrinomialTree`]: lattice built column by column in a node arena
//! * [`Node`] / [`NodeId`]: lattice nodes and their arena indices
//! * [`TreeParameters`]: dynamics and build settings
//! * [`LatticePayoff`]: what the backward pass values

pub mod node;
pub mod trinomial_tree;

pub use node::{Node, NodeId};
pub use trinomial_tree::TrinomialTree;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use sp_core::errors::Result;
use sp_core::{ensure, Rate, Real, Time, Volatility};

use crate::CashDividend;

// ─── Payoff callbacks ────────────────────────────────────────────────────────

/// Payoff seen by the lattice's backward pass.
pub trait LatticePayoff {
    /// Value at maturity for underlying level `spot`.
    fn terminal(&self, spot: Real) -> Real;

    /// Immediate exercise value, for payoffs with early exercise.
    fn exercise(&self, _spot: Real) -> Option<Real> {
        None
    }

    /// Whether a node at `spot` is knocked out (valued at zero).
    fn is_knocked_out(&self, _spot: Real) -> bool {
        false
    }
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// What to do when moment matching yields a negative probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeProbabilityPolicy {
    /// Log a warning and keep the probabilities.
    #[default]
    Warn,
    /// Log a warning, clamp at zero and renormalise.
    Clamp,
    /// Fail with `Error::NumericalInstability`.
    Reject,
}

/// Inputs of a lattice build.
#[derive(Debug, Clone)]
pub struct TreeParameters {
    /// Spot at the root.
    pub spot: Real,
    /// Lognormal volatility.
    pub volatility: Volatility,
    /// Continuous dividend yield.
    pub dividend_yield: Rate,
    /// Time to maturity in years.
    pub maturity: Time,
    /// Forward rate of each layer; its length is the number of steps.
    pub rates: Vec<Rate>,
    /// Optional cash dividend.
    pub dividend: Option<CashDividend>,
    /// Cumulative probability below which edge branches are cut; 0 disables.
    pub pruning_limit: Real,
    /// Negative-probability handling.
    pub policy: NegativeProbabilityPolicy,
    /// Abort the build after this instant.
    pub deadline: Option<Instant>,
}

impl TreeParameters {
    /// Flat-rate parameters without dividends, pruning or deadline.
    pub fn flat(spot: Real, volatility: Volatility, rate: Rate, maturity: Time, steps: usize) -> Self {
        Self {
            spot,
            volatility,
            dividend_yield: 0.0,
            maturity,
            rates: vec![rate; steps],
            dividend: None,
            pruning_limit: 0.0,
            policy: NegativeProbabilityPolicy::default(),
            deadline: None,
        }
    }

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.rates.len()
    }

    /// Length of one step.
    pub fn dt(&self) -> Time {
        self.maturity / self.steps() as Real
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(self.spot > 0.0, "spot must be positive, got {}", self.spot);
        ensure!(self.maturity > 0.0, "maturity must be positive, got {}", self.maturity);
        ensure!(!self.rates.is_empty(), "a lattice needs at least one step");
        ensure!(self.volatility >= 0.0, "volatility must be non-negative");
        ensure!(self.pruning_limit >= 0.0, "pruning limit must be non-negative");
        Ok(())
    }
}
