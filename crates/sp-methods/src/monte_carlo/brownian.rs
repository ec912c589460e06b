//! Brownian paths and the path ensemble.

use rayon::prelude::*;
use sp_core::errors::{Error, Result};
use sp_core::{ensure, Real, Time};
use sp_math::{NormalGenerator, RngStreams};
use tracing::debug;

// ─── PathEnsemble ─────────────────────────────────────────────────────────────

/// `draws` paths of `points` values each, stored path after path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnsemble {
    values: Vec<Real>,
    draws: usize,
    points: usize,
}

impl PathEnsemble {
    /// Wrap row-major path values.
    pub fn new(values: Vec<Real>, draws: usize, points: usize) -> Result<Self> {
        ensure!(points >= 1, "a path needs at least one point");
        ensure!(
            values.len() == draws * points,
            "{} values cannot form {draws} paths of {points} points",
            values.len()
        );
        Ok(Self {
            values,
            draws,
            points,
        })
    }

    /// Number of paths.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Points per path, the initial one included.
    pub fn points(&self) -> usize {
        self.points
    }

    /// Steps per path (`points − 1`).
    pub fn steps(&self) -> usize {
        self.points - 1
    }

    /// Path `i`.
    pub fn path(&self, i: usize) -> Result<&[Real]> {
        if i >= self.draws {
            return Err(Error::IndexOutOfRange {
                index: i,
                size: self.draws,
            });
        }
        Ok(&self.values[i * self.points..(i + 1) * self.points])
    }

    /// All paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &[Real]> + '_ {
        self.values.chunks_exact(self.points)
    }

    /// All paths in order, as a parallel iterator.
    pub fn par_paths(&self) -> rayon::slice::ChunksExact<'_, Real> {
        self.values.par_chunks_exact(self.points)
    }

    /// Values of every path at `step`.
    pub fn column(&self, step: usize) -> Result<Vec<Real>> {
        if step >= self.points {
            return Err(Error::IndexOutOfRange {
                index: step,
                size: self.points,
            });
        }
        Ok(self.paths().map(|p| p[step]).collect())
    }

    /// Final value of every path.
    pub fn terminal(&self) -> Vec<Real> {
        self.paths().map(|p| p[self.points - 1]).collect()
    }

    /// Raw storage.
    pub fn values(&self) -> &[Real] {
        &self.values
    }
}

// ─── BrownianMotion ───────────────────────────────────────────────────────────

/// Standard Brownian motion sampled on a uniform grid.
///
/// Paths are produced in batches of `batch_size` draws; batch `b` takes its
/// normals from stream `b` of the [`RngStreams`], so the ensemble depends
/// only on the seed and the batch size, never on the thread count.
#[derive(Debug, Clone)]
pub struct BrownianMotion {
    steps: usize,
    draws: usize,
    maturity: Time,
    streams: RngStreams,
    batch_size: usize,
}

impl BrownianMotion {
    /// Draws per batch unless overridden.
    pub const DEFAULT_BATCH_SIZE: usize = 1024;

    /// `draws` paths of `steps` steps over `[0, maturity]`.
    pub fn new(steps: usize, draws: usize, maturity: Time, streams: RngStreams) -> Result<Self> {
        ensure!(steps >= 1, "steps must be at least 1");
        ensure!(draws >= 1, "draws must be at least 1");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        Ok(Self {
            steps,
            draws,
            maturity,
            streams,
            batch_size: Self::DEFAULT_BATCH_SIZE,
        })
    }

    /// Override the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        ensure!(batch_size >= 1, "batch size must be at least 1");
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Step length.
    pub fn dt(&self) -> Time {
        self.maturity / self.steps as Real
    }

    /// Number of steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of paths.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Simulate `W`, starting at 0, on every grid point.
    pub fn simulate(&self) -> PathEnsemble {
        let points = self.steps + 1;
        let sqrt_dt = self.dt().sqrt();
        let batches = self.draws.div_ceil(self.batch_size);
        debug!(
            draws = self.draws,
            steps = self.steps,
            batches,
            batch_size = self.batch_size,
            seed = self.streams.seed(),
            "simulating brownian paths"
        );

        let mut values = vec![0.0; self.draws * points];
        values
            .par_chunks_mut(self.batch_size * points)
            .enumerate()
            .for_each(|(batch, chunk)| {
                let mut rng = self.streams.stream(batch as u64);
                for path in chunk.chunks_exact_mut(points) {
                    let mut w = 0.0;
                    for x in path.iter_mut().skip(1) {
                        w += sqrt_dt * rng.next_normal();
                        *x = w;
                    }
                }
            });

        PathEnsemble {
            values,
            draws: self.draws,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_math::{RngKind, Statistics};

    #[test]
    fn reproducible_for_a_seed() {
        let streams = RngStreams::new(RngKind::MersenneTwister, 7);
        let bm = BrownianMotion::new(4, 3000, 1.0, streams).unwrap().with_batch_size(256).unwrap();
        let a = bm.simulate();
        let b = bm.simulate();
        assert_eq!(a, b);
        assert!(a.paths().all(|p| p[0] == 0.0));
    }

    #[test]
    fn terminal_variance_is_maturity() {
        let streams = RngStreams::new(RngKind::Ziggurat, 11);
        let bm = BrownianMotion::new(8, 40_000, 2.0, streams).unwrap();
        let mut stats = Statistics::new();
        stats.extend(bm.simulate().terminal());
        assert!(stats.mean().unwrap().abs() < 0.03);
        assert!((stats.variance().unwrap() - 2.0).abs() < 0.06);
    }

    #[test]
    fn ensemble_accessors() {
        let ensemble = PathEnsemble::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(ensemble.steps(), 2);
        assert_eq!(ensemble.path(1).unwrap(), &[4.0, 5.0, 6.0]);
        assert_eq!(ensemble.column(1).unwrap(), vec![2.0, 5.0]);
        assert_eq!(ensemble.terminal(), vec![3.0, 6.0]);
        assert!(matches!(ensemble.path(2), Err(Error::IndexOutOfRange { index: 2, size: 2 })));
        assert!(PathEnsemble::new(vec![1.0; 5], 2, 3).is_err());
    }
}
