//! # sp-methods
//!
//! The two numerical cores of the pricer.
//!
//! * [`lattice`]: a trinomial tree built node by node in an arena, with
//!   discrete-dividend reconnection, probability pruning and backward
//!   valuation.
//! * [`monte_carlo`]: batched, seed-reproducible Brownian paths, geometric
//!   Brownian motion reconstruction, Longstaff–Schwartz regression and
//!   autocall first-touch probabilities.
//!
//! Both work on plain numbers and payoff callbacks; mapping instruments and
//! markets onto them is the job of the pricing engines.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Trinomial lattice.
pub mod lattice;

/// Monte Carlo simulation.
pub mod monte_carlo;

use serde::{Deserialize, Serialize};
use sp_core::{Real, Time};

/// A single cash dividend, `time` years after the valuation date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashDividend {
    /// Cash amount.
    pub amount: Real,
    /// Time of the ex-dividend date.
    pub time: Time,
}

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{
    LatticePayoff, NegativeProbabilityPolicy, Node, NodeId, TreeParameters,
    TrinomialTree,
};
pub use monte_carlo::{
    autocall_probabilities, longstaff_schwartz, AutocallProbabilities, BrownianMotion,
    Discretization, GbmModel, MonteCarloModel, PathEnsemble,
};
