//! Monte Carlo estimation: path simulation plus discounted payoff statistics.
//!
//! Payoffs are evaluated in fixed-size batches of paths; each batch fills
//! its own [`Statistics`] and the batches are merged in path order, so a
//! seeded run gives the same estimate on any thread pool.

use rayon::prelude::*;
use sp_core::errors::Result;
use sp_core::{ensure, DiscountFactor, Real};
use sp_math::{RngStreams, Statistics};
use tracing::debug;

use super::brownian::PathEnsemble;
use super::gbm::{Discretization, GbmModel};

/// Paths per statistics batch.
pub const BATCH_SIZE: usize = 4096;

/// A Monte Carlo simulation orchestrator.
///
/// Couples the asset dynamics with a discretization, a number of draws and
/// the random streams, and turns path payoffs into sample statistics.
#[derive(Debug, Clone)]
pub struct MonteCarloModel {
    model: GbmModel,
    discretization: Discretization,
    draws: usize,
    streams: RngStreams,
}

impl MonteCarloModel {
    /// Create a new Monte Carlo model.
    pub fn new(model: GbmModel, discretization: Discretization, draws: usize, streams: RngStreams) -> Result<Self> {
        ensure!(draws >= 1, "draws must be at least 1");
        Ok(Self {
            model,
            discretization,
            draws,
            streams,
        })
    }

    /// Asset dynamics.
    pub fn model(&self) -> &GbmModel {
        &self.model
    }

    /// Path discretization.
    pub fn discretization(&self) -> Discretization {
        self.discretization
    }

    /// Random streams.
    pub fn streams(&self) -> RngStreams {
        self.streams
    }

    /// Simulate the asset paths.
    pub fn paths(&self) -> Result<PathEnsemble> {
        self.model.simulate(self.discretization, self.draws, self.streams)
    }

    /// Simulate, then estimate the discounted expectation of `payoff`.
    pub fn estimate<F>(&self, discount: DiscountFactor, payoff: F) -> Result<Statistics>
    where
        F: Fn(&[Real]) -> Result<Real> + Sync,
    {
        let paths = self.paths()?;
        Self::evaluate(&paths, discount, payoff)
    }

    /// Discounted statistics of `payoff` over existing paths.
    pub fn evaluate<F>(paths: &PathEnsemble, discount: DiscountFactor, payoff: F) -> Result<Statistics>
    where
        F: Fn(&[Real]) -> Result<Real> + Sync,
    {
        let batches = paths
            .values()
            .par_chunks(BATCH_SIZE * paths.points())
            .map(|batch| -> Result<Statistics> {
                let mut stats = Statistics::new();
                for path in batch.chunks_exact(paths.points()) {
                    stats.add(payoff(path)? * discount);
                }
                Ok(stats)
            })
            .collect::<Result<Vec<Statistics>>>()?;
        let stats = batches
            .iter()
            .fold(Statistics::new(), |total, batch| total.merge(batch));
        debug!(
            draws = stats.samples(),
            batches = batches.len(),
            mean = stats.mean(),
            error = stats.error_estimate(),
            "monte carlo estimate"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_math::RngKind;

    #[test]
    fn european_call_converges() {
        let gbm = GbmModel {
            spot: 100.0,
            volatility: 0.2,
            dividend_yield: 0.0,
            maturity: 1.0,
            step_rates: vec![0.05],
            dividend: None,
        };
        let mc = MonteCarloModel::new(
            gbm,
            Discretization::Terminal,
            100_000,
            RngStreams::new(RngKind::MersenneTwister, 42),
        )
        .unwrap();
        let stats = mc
            .estimate((-0.05_f64).exp(), |p| Ok((p[p.len() - 1] - 100.0).max(0.0)))
            .unwrap();
        let (price, error) = (stats.mean().unwrap(), stats.error_estimate().unwrap());
        // BS ≈ 10.4506
        assert!((price - 10.4506).abs() < 4.0 * error, "MC call = {price:.4} ± {error:.4}");
    }

    #[test]
    fn batches_merge_to_the_single_pass_statistics() {
        let draws = 2 * BATCH_SIZE + 17;
        let values: Vec<Real> = (0..draws).flat_map(|i| [100.0, 90.0 + (i % 23) as Real]).collect();
        let paths = PathEnsemble::new(values, draws, 2).unwrap();
        let stats = MonteCarloModel::evaluate(&paths, 0.5, |p| Ok(p[1])).unwrap();

        let mut single = Statistics::new();
        single.extend(paths.terminal().into_iter().map(|s| 0.5 * s));
        assert_eq!(stats.samples(), draws);
        assert!((stats.mean().unwrap() - single.mean().unwrap()).abs() < 1e-10);
        assert!((stats.variance().unwrap() - single.variance().unwrap()).abs() < 1e-9);
        assert_eq!(stats.minimum(), Some(45.0));
    }

    #[test]
    fn a_single_draw_has_a_mean_but_no_error() {
        let paths = PathEnsemble::new(vec![100.0, 104.0], 1, 2).unwrap();
        let stats = MonteCarloModel::evaluate(&paths, 1.0, |p| Ok(p[1] - 100.0)).unwrap();
        assert_eq!(stats.mean(), Some(4.0));
        assert!(stats.error_estimate().is_none());
    }

    #[test]
    fn payoff_errors_propagate() {
        let paths = PathEnsemble::new(vec![1.0, 2.0], 2, 1).unwrap();
        let result = MonteCarloModel::evaluate(&paths, 1.0, |_| {
            Err(sp_core::Error::Runtime("boom".into()))
        });
        assert!(result.is_err());
    }
}
