//! # sp-math
//!
//! Numerical building blocks for the pricing engines: the normal
//! distribution, seeded random number generators with per-batch streams,
//! running statistics, least-squares regression on polynomial bases and
//! linear interpolation in one and two dimensions.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Normal distribution.
pub mod distributions;

/// 1D and 2D linear interpolation.
pub mod interpolation;

/// Random number generators and stream partitioning.
pub mod random_numbers;

/// Polynomial-basis least-squares regression.
pub mod regression;

/// Statistics accumulators.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use interpolation::{BilinearInterpolation, LinearInterpolation};
pub use random_numbers::{NormalGenerator, NormalRng, RngKind, RngStreams};
pub use regression::{BasisFamily, FittedRegression, RegressionModel};
pub use statistics::Statistics;
