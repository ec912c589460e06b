//! Geometric Brownian motion rebuilt from Brownian paths.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sp_core::errors::Result;
use sp_core::{ensure, Rate, Real, Time, Volatility};
use sp_math::RngStreams;
use tracing::{debug, warn};

use super::brownian::{BrownianMotion, PathEnsemble};
use crate::CashDividend;

/// How asset paths are reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discretization {
    /// One step straight to maturity.
    Terminal,
    /// Every grid step, with per-step forward drift.
    Incremental,
    /// Every grid step, with the cash dividend subtracted on its step.
    DiscreteDividend,
}

/// Lognormal dynamics of the underlying.
#[derive(Debug, Clone)]
pub struct GbmModel {
    /// Initial spot.
    pub spot: Real,
    /// Lognormal volatility.
    pub volatility: Volatility,
    /// Continuous dividend yield.
    pub dividend_yield: Rate,
    /// Horizon in years.
    pub maturity: Time,
    /// Forward rate of each step of the full grid.
    pub step_rates: Vec<Rate>,
    /// Cash dividend, used by [`Discretization::DiscreteDividend`].
    pub dividend: Option<CashDividend>,
}

impl GbmModel {
    /// Number of steps of the full grid.
    pub fn steps(&self) -> usize {
        self.step_rates.len()
    }

    /// Step length of the full grid.
    pub fn dt(&self) -> Time {
        self.maturity / self.steps() as Real
    }

    /// First grid step at or after the dividend date, clamped into the grid.
    ///
    /// A dividend within a tenth of a day of a grid point drops on that
    /// point, as on the lattice.
    pub fn dividend_step(&self) -> Option<usize> {
        let dividend = self.dividend?;
        let tolerance = (1.0 / 365.0) / self.steps() as Real / 10.0;
        let step = ((dividend.time - tolerance) / self.dt()).ceil().max(0.0) as usize;
        Some(step.clamp(1, self.steps()))
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.spot > 0.0, "spot must be positive, got {}", self.spot);
        ensure!(self.volatility >= 0.0, "volatility must be non-negative");
        ensure!(self.maturity > 0.0, "maturity must be positive, got {}", self.maturity);
        ensure!(!self.step_rates.is_empty(), "at least one step is required");
        Ok(())
    }

    /// Brownian driver matching `discretization`.
    pub fn brownian(&self, discretization: Discretization, draws: usize, streams: RngStreams) -> Result<BrownianMotion> {
        self.validate()?;
        let steps = match discretization {
            Discretization::Terminal => 1,
            _ => self.steps(),
        };
        BrownianMotion::new(steps, draws, self.maturity, streams)
    }

    /// Simulate asset paths.
    pub fn simulate(&self, discretization: Discretization, draws: usize, streams: RngStreams) -> Result<PathEnsemble> {
        let brownian = self.brownian(discretization, draws, streams)?.simulate();
        self.reconstruct(discretization, &brownian)
    }

    /// Turn Brownian paths into asset paths.
    pub fn reconstruct(&self, discretization: Discretization, brownian: &PathEnsemble) -> Result<PathEnsemble> {
        self.validate()?;
        let sigma = self.volatility;
        let points = brownian.points();

        let drifts: Vec<Real> = match discretization {
            Discretization::Terminal => {
                ensure!(brownian.steps() == 1, "terminal discretization expects one step");
                let dt = self.dt();
                let carry: Real = self.step_rates.iter().map(|r| r * dt).sum();
                vec![carry - self.dividend_yield * self.maturity - 0.5 * sigma * sigma * self.maturity]
            }
            _ => {
                ensure!(
                    brownian.steps() == self.steps(),
                    "brownian paths have {} steps, the model {}",
                    brownian.steps(),
                    self.steps()
                );
                let dt = self.dt();
                self.step_rates
                    .iter()
                    .map(|r| (r - self.dividend_yield - 0.5 * sigma * sigma) * dt)
                    .collect()
            }
        };
        let cut = match discretization {
            Discretization::DiscreteDividend => self.dividend_step().zip(self.dividend.map(|d| d.amount)),
            _ => None,
        };

        let mut values = vec![0.0; brownian.values().len()];
        let clamped: usize = values
            .par_chunks_mut(points)
            .zip(brownian.par_paths())
            .map(|(s, w)| {
                s[0] = self.spot;
                let mut floored = 0;
                for j in 1..points {
                    let mut next = s[j - 1] * (drifts[j - 1] + sigma * (w[j] - w[j - 1])).exp();
                    if let Some((step, amount)) = cut {
                        if j == step {
                            next -= amount;
                            if next < 0.0 {
                                next = 0.0;
                                floored = 1;
                            }
                        }
                    }
                    s[j] = next;
                }
                floored
            })
            .sum();

        if clamped > 0 {
            warn!(clamped, draws = brownian.draws(), "paths floored at zero after the cash dividend");
        }
        debug!(?discretization, draws = brownian.draws(), points, "asset paths reconstructed");
        PathEnsemble::new(values, brownian.draws(), points)
    }
}
