//! Volatility sources.
//!
//! A [`VolatilitySource`] answers the Black volatility for a strike and a
//! time to maturity. The [`VolatilitySurface`] lookup degrades through
//! several tiers before giving up:
//!
//! 1. exact grid node;
//! 2. bilinear interpolation inside the grid;
//! 3. linear interpolation in strike on the nearest maturity slice;
//! 4. linear interpolation in maturity on the nearest strike slice;
//! 5. [`Error::Interpolation`].

use std::fmt::Debug;
use std::sync::Arc;

use sp_core::errors::{Error, Result};
use sp_core::{ensure, Real, Time, Volatility};
use sp_math::{BilinearInterpolation, LinearInterpolation};
use tracing::warn;

/// A source of Black volatilities.
pub trait VolatilitySource: Debug + Send + Sync {
    /// Volatility for `strike` at time to maturity `t` (years).
    fn volatility(&self, strike: Real, t: Time) -> Result<Volatility>;
}

// ── Flat ──────────────────────────────────────────────────────────────────────

/// The same volatility for every strike and maturity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatVolatility {
    vol: Volatility,
}

impl FlatVolatility {
    /// A flat volatility; must be non-negative.
    pub fn new(vol: Volatility) -> Result<Self> {
        ensure!(vol >= 0.0 && vol.is_finite(), "volatility must be non-negative, got {vol}");
        Ok(Self { vol })
    }
}

impl VolatilitySource for FlatVolatility {
    fn volatility(&self, _strike: Real, _t: Time) -> Result<Volatility> {
        Ok(self.vol)
    }
}

// ── Shifted ───────────────────────────────────────────────────────────────────

/// Another volatility source moved in parallel by `shift`.
#[derive(Debug, Clone)]
pub struct ShiftedVolatility {
    inner: Arc<dyn VolatilitySource>,
    shift: Volatility,
}

impl ShiftedVolatility {
    /// `inner` shifted by `shift` (absolute, e.g. `0.01` = one vol point).
    pub fn new(inner: Arc<dyn VolatilitySource>, shift: Volatility) -> Self {
        Self { inner, shift }
    }
}

impl VolatilitySource for ShiftedVolatility {
    fn volatility(&self, strike: Real, t: Time) -> Result<Volatility> {
        let vol = self.inner.volatility(strike, t)? + self.shift;
        if vol < 0.0 {
            return Err(Error::NumericalInstability(format!(
                "shifted volatility is negative ({vol})"
            )));
        }
        Ok(vol)
    }
}

// ── Surface ───────────────────────────────────────────────────────────────────

/// A strike × maturity grid of implied volatilities.
#[derive(Debug, Clone)]
pub struct VolatilitySurface {
    strikes: Vec<Real>,
    maturities: Vec<Time>,
    /// Row-major by maturity: `vols[j * strikes.len() + i] = σ(K_i, T_j)`.
    vols: Vec<Volatility>,
    bilinear: Option<BilinearInterpolation>,
}

impl VolatilitySurface {
    /// Build a surface from sorted strikes, sorted maturities (years) and
    /// the row-major volatility grid.
    pub fn new(strikes: &[Real], maturities: &[Time], vols: &[Volatility]) -> Result<Self> {
        ensure!(!strikes.is_empty(), "volatility surface needs at least one strike");
        ensure!(!maturities.is_empty(), "volatility surface needs at least one maturity");
        ensure!(
            vols.len() == strikes.len() * maturities.len(),
            "surface has {} values for a {}x{} grid",
            vols.len(),
            strikes.len(),
            maturities.len()
        );
        ensure!(
            strikes.windows(2).all(|w| w[0] < w[1]) && maturities.windows(2).all(|w| w[0] < w[1]),
            "surface axes must be strictly increasing"
        );
        ensure!(
            vols.iter().all(|v| v.is_finite() && *v >= 0.0),
            "surface volatilities must be finite and non-negative"
        );

        let bilinear = if strikes.len() >= 2 && maturities.len() >= 2 {
            Some(BilinearInterpolation::new(strikes, maturities, vols)?)
        } else {
            None
        };

        Ok(Self {
            strikes: strikes.to_vec(),
            maturities: maturities.to_vec(),
            vols: vols.to_vec(),
            bilinear,
        })
    }

    /// Build a surface from scattered `(strike, maturity, vol)` quotes.
    ///
    /// Only strikes quoted at every maturity are kept, so the grid is
    /// rectangular.
    pub fn from_quotes(quotes: &[(Real, Time, Volatility)]) -> Result<Self> {
        let mut maturities: Vec<Time> = quotes.iter().map(|q| q.1).collect();
        maturities.sort_by(|a, b| a.total_cmp(b));
        maturities.dedup();

        let mut strikes: Vec<Real> = quotes.iter().map(|q| q.0).collect();
        strikes.sort_by(|a, b| a.total_cmp(b));
        strikes.dedup();

        let lookup = |k: Real, t: Time| quotes.iter().find(|q| q.0 == k && q.1 == t).map(|q| q.2);
        strikes.retain(|&k| maturities.iter().all(|&t| lookup(k, t).is_some()));

        let mut vols = Vec::with_capacity(strikes.len() * maturities.len());
        for &t in &maturities {
            for &k in &strikes {
                vols.extend(lookup(k, t));
            }
        }
        Self::new(&strikes, &maturities, &vols)
    }

    /// Grid strikes.
    pub fn strikes(&self) -> &[Real] {
        &self.strikes
    }

    /// Grid maturities (years).
    pub fn maturities(&self) -> &[Time] {
        &self.maturities
    }

    fn at(&self, i: usize, j: usize) -> Volatility {
        self.vols[j * self.strikes.len() + i]
    }

    fn maturity_slice(&self, j: usize) -> Vec<Volatility> {
        (0..self.strikes.len()).map(|i| self.at(i, j)).collect()
    }

    fn strike_slice(&self, i: usize) -> Vec<Volatility> {
        (0..self.maturities.len()).map(|j| self.at(i, j)).collect()
    }
}

fn nearest(values: &[Real], x: Real) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
        .map_or(0, |(i, _)| i)
}

impl VolatilitySource for VolatilitySurface {
    fn volatility(&self, strike: Real, t: Time) -> Result<Volatility> {
        let i_exact = self.strikes.iter().position(|&k| k == strike);
        let j_exact = self.maturities.iter().position(|&m| m == t);
        if let (Some(i), Some(j)) = (i_exact, j_exact) {
            return Ok(self.at(i, j));
        }

        if let Some(v) = self.bilinear.as_ref().and_then(|b| b.value(strike, t)) {
            return Ok(v);
        }

        let j = nearest(&self.maturities, t);
        if let Ok(li) = LinearInterpolation::new(&self.strikes, &self.maturity_slice(j)) {
            warn!(strike, t, maturity = self.maturities[j], "vol surface: nearest maturity slice");
            return Ok(li.value(strike).max(0.0));
        }

        let i = nearest(&self.strikes, strike);
        if let Ok(li) = LinearInterpolation::new(&self.maturities, &self.strike_slice(i)) {
            warn!(strike, t, grid_strike = self.strikes[i], "vol surface: nearest strike slice");
            return Ok(li.value(t).max(0.0));
        }

        Err(Error::Interpolation(format!(
            "cannot interpolate volatility at strike {strike}, t {t}"
        )))
    }
}
