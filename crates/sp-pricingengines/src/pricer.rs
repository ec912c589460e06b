//! Pricer profiles.
//!
//! A [`Pricer`] pairs a pricing date with one of three engine profiles.
//! Profiles are plain serde values so they can be read from configuration.

use serde::{Deserialize, Serialize};
use sp_core::errors::Result;
use sp_core::{ensure, Real, Size};
use sp_math::{RngKind, RngStreams};
use sp_methods::NegativeProbabilityPolicy;
use sp_time::Date;

/// Monte Carlo profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloSettings {
    /// Time steps of each path.
    pub steps: Size,
    /// Number of simulated paths.
    pub draws: Size,
    /// Seed; drawn from OS entropy when absent.
    pub seed: Option<u64>,
    /// Normal generator.
    pub rng: RngKind,
}

impl Default for MonteCarloSettings {
    fn default() -> Self {
        Self {
            steps: 100,
            draws: 10_000,
            seed: None,
            rng: RngKind::default(),
        }
    }
}

impl MonteCarloSettings {
    /// Check the ranges.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.steps >= 1, "Monte Carlo needs at least one step");
        ensure!(self.draws >= 1, "Monte Carlo needs at least one draw");
        Ok(())
    }
}

/// Trinomial tree profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Time steps.
    pub steps: Size,
    /// Whether low-probability branches are pruned.
    pub pruning: bool,
    /// Cumulative probability below which branches are cut.
    pub pruning_limit: Real,
    /// Negative-probability handling.
    pub policy: NegativeProbabilityPolicy,
    /// Build deadline in milliseconds.
    pub deadline_ms: Option<u64>,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            steps: 100,
            pruning: false,
            pruning_limit: 1e-7,
            policy: NegativeProbabilityPolicy::default(),
            deadline_ms: None,
        }
    }
}

impl TreeSettings {
    /// Check the ranges.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.steps >= 1, "a tree needs at least one step");
        ensure!(
            self.pruning_limit >= 0.0,
            "pruning limit must be non-negative, got {}",
            self.pruning_limit
        );
        Ok(())
    }

    /// The limit handed to the lattice: zero when pruning is off.
    pub fn effective_pruning_limit(&self) -> Real {
        if self.pruning {
            self.pruning_limit
        } else {
            0.0
        }
    }
}

/// Engine profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum PricerKind {
    /// Path simulation.
    MonteCarlo(MonteCarloSettings),
    /// Trinomial lattice.
    Tree(TreeSettings),
    /// Closed forms.
    BlackScholes,
}

impl PricerKind {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            PricerKind::MonteCarlo(_) => "monte_carlo",
            PricerKind::Tree(_) => "tree",
            PricerKind::BlackScholes => "black_scholes",
        }
    }
}

/// A pricing date and an engine profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricer {
    /// Valuation date.
    pub pricing_date: Date,
    /// Engine profile.
    #[serde(flatten)]
    pub kind: PricerKind,
}

impl Pricer {
    /// Monte Carlo pricer.
    pub fn monte_carlo(pricing_date: Date, steps: Size, draws: Size, seed: Option<u64>) -> Result<Self> {
        Self::new(
            pricing_date,
            PricerKind::MonteCarlo(MonteCarloSettings {
                steps,
                draws,
                seed,
                ..MonteCarloSettings::default()
            }),
        )
    }

    /// Tree pricer; `pruning_limit` is only used when `pruning` is set.
    pub fn tree(pricing_date: Date, steps: Size, pruning: bool, pruning_limit: Real) -> Result<Self> {
        Self::new(
            pricing_date,
            PricerKind::Tree(TreeSettings {
                steps,
                pruning,
                pruning_limit,
                ..TreeSettings::default()
            }),
        )
    }

    /// Black–Scholes pricer.
    pub fn black_scholes(pricing_date: Date) -> Self {
        Self {
            pricing_date,
            kind: PricerKind::BlackScholes,
        }
    }

    /// Pricer from a validated profile.
    pub fn new(pricing_date: Date, kind: PricerKind) -> Result<Self> {
        let pricer = Self { pricing_date, kind };
        pricer.validate()?;
        Ok(pricer)
    }

    /// Check the profile's settings.
    pub fn validate(&self) -> Result<()> {
        match &self.kind {
            PricerKind::MonteCarlo(s) => s.validate(),
            PricerKind::Tree(s) => s.validate(),
            PricerKind::BlackScholes => Ok(()),
        }
    }

    /// The same profile one calendar day later (used by theta).
    pub fn with_pricing_date(&self, pricing_date: Date) -> Self {
        Self { pricing_date, ..*self }
    }

    /// The same profile with the Monte Carlo seed pinned.
    pub fn with_seed(&self, seed: u64) -> Self {
        match self.kind {
            PricerKind::MonteCarlo(s) => Self {
                kind: PricerKind::MonteCarlo(MonteCarloSettings { seed: Some(seed), ..s }),
                ..*self
            },
            _ => *self,
        }
    }

    /// The same profile with an unseeded Monte Carlo seed drawn once from
    /// OS entropy, so repeated pricings share their random numbers.
    pub fn pinned(&self) -> Self {
        match self.kind {
            PricerKind::MonteCarlo(s) if s.seed.is_none() => self.with_seed(RngStreams::from_entropy(s.rng).seed()),
            _ => *self,
        }
    }
}
