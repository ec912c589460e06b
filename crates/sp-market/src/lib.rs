//! # sp-market
//!
//! The market snapshot consumed by every pricing engine: spot, a
//! volatility source, a yield curve and a dividend description.
//!
//! Market objects are immutable. Shocks for finite-difference Greeks are
//! taken by building shocked copies ([`Market::with_spot`],
//! [`Market::with_volatility_shift`], [`Market::with_rate_shift`]).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Dividend descriptions.
pub mod dividend;

/// The market snapshot.
pub mod market;

/// Yield curves.
pub mod rates;

/// Volatility sources.
pub mod volatility;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use dividend::Dividend;
pub use market::Market;
pub use rates::{FlatRate, InterpolatedZeroCurve, NelsonSiegelCurve, ShiftedCurve, YieldCurve};
pub use volatility::{FlatVolatility, ShiftedVolatility, VolatilitySource, VolatilitySurface};
