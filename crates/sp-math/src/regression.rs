//! Least-squares regression on polynomial bases.
//!
//! A [`RegressionModel`] is a stateless transform: it maps observations to a
//! design matrix of basis-function values and solves the least-squares
//! problem by SVD, returning the minimum-norm solution when the design is
//! rank-deficient. This is the continuation-value estimator of the
//! Longstaff–Schwartz method.
//!
//! Column `j` of the design matrix holds the basis polynomial of degree `j`,
//! so the constant term comes first.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use sp_core::errors::{Error, Result};
use sp_core::Real;

/// Polynomial family used to build the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisFamily {
    /// Monomials `1, x, x², …`.
    #[default]
    Classic,
    /// Laguerre polynomials `L_n`.
    Laguerre,
    /// Probabilists' Hermite polynomials `He_n`.
    Hermite,
    /// Legendre polynomials `P_n`.
    Legendre,
    /// Chebyshev polynomials of the first kind `T_n`.
    Chebyshev,
}

impl BasisFamily {
    /// Highest degree the family supports, `None` when unbounded.
    ///
    /// The orthogonal families are evaluated from closed forms that stop at
    /// degree 6.
    pub fn max_degree(&self) -> Option<usize> {
        match self {
            BasisFamily::Classic => None,
            _ => Some(MAX_ORTHOGONAL_DEGREE),
        }
    }

    /// Value of the degree-`n` member of the family at `x`.
    ///
    /// Orthogonal families are only defined for `n ≤ 6`; callers go through
    /// [`RegressionModel::new`], which enforces the bound.
    pub fn evaluate(&self, n: usize, x: Real) -> Real {
        match self {
            BasisFamily::Classic => x.powi(n as i32),
            BasisFamily::Laguerre => laguerre(n, x),
            BasisFamily::Hermite => hermite(n, x),
            BasisFamily::Legendre => legendre(n, x),
            BasisFamily::Chebyshev => chebyshev(n, x),
        }
    }
}

const MAX_ORTHOGONAL_DEGREE: usize = 6;

fn laguerre(n: usize, x: Real) -> Real {
    let x2 = x * x;
    let x3 = x2 * x;
    let x4 = x3 * x;
    let x5 = x4 * x;
    let x6 = x5 * x;
    match n {
        0 => 1.0,
        1 => 1.0 - x,
        2 => 0.5 * (x2 - 4.0 * x + 2.0),
        3 => (-x3 + 9.0 * x2 - 18.0 * x + 6.0) / 6.0,
        4 => (x4 - 16.0 * x3 + 72.0 * x2 - 96.0 * x + 24.0) / 24.0,
        5 => (-x5 + 25.0 * x4 - 200.0 * x3 + 600.0 * x2 - 600.0 * x + 120.0) / 120.0,
        6 => {
            (x6 - 36.0 * x5 + 450.0 * x4 - 2400.0 * x3 + 5400.0 * x2 - 4320.0 * x + 720.0) / 720.0
        }
        _ => Real::NAN,
    }
}

fn hermite(n: usize, x: Real) -> Real {
    let x2 = x * x;
    match n {
        0 => 1.0,
        1 => x,
        2 => x2 - 1.0,
        3 => x * (x2 - 3.0),
        4 => x2 * x2 - 6.0 * x2 + 3.0,
        5 => x * (x2 * x2 - 10.0 * x2 + 15.0),
        6 => x2 * x2 * x2 - 15.0 * x2 * x2 + 45.0 * x2 - 15.0,
        _ => Real::NAN,
    }
}

fn legendre(n: usize, x: Real) -> Real {
    let x2 = x * x;
    match n {
        0 => 1.0,
        1 => x,
        2 => 0.5 * (3.0 * x2 - 1.0),
        3 => 0.5 * x * (5.0 * x2 - 3.0),
        4 => (35.0 * x2 * x2 - 30.0 * x2 + 3.0) / 8.0,
        5 => x * (63.0 * x2 * x2 - 70.0 * x2 + 15.0) / 8.0,
        6 => (231.0 * x2 * x2 * x2 - 315.0 * x2 * x2 + 105.0 * x2 - 5.0) / 16.0,
        _ => Real::NAN,
    }
}

fn chebyshev(n: usize, x: Real) -> Real {
    let x2 = x * x;
    match n {
        0 => 1.0,
        1 => x,
        2 => 2.0 * x2 - 1.0,
        3 => x * (4.0 * x2 - 3.0),
        4 => 8.0 * x2 * x2 - 8.0 * x2 + 1.0,
        5 => x * (16.0 * x2 * x2 - 20.0 * x2 + 5.0),
        6 => 32.0 * x2 * x2 * x2 - 48.0 * x2 * x2 + 18.0 * x2 - 1.0,
        _ => Real::NAN,
    }
}

/// A basis family together with a polynomial degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionModel {
    family: BasisFamily,
    degree: usize,
}

impl Default for RegressionModel {
    fn default() -> Self {
        Self {
            family: BasisFamily::Classic,
            degree: 2,
        }
    }
}

impl RegressionModel {
    /// Create a model, rejecting degrees the family cannot evaluate.
    pub fn new(family: BasisFamily, degree: usize) -> Result<Self> {
        if let Some(max) = family.max_degree() {
            if degree > max {
                return Err(Error::InvalidArgument(format!(
                    "{family:?} basis is only available up to degree {max}, got {degree}"
                )));
            }
        }
        Ok(Self { family, degree })
    }

    /// Basis family.
    pub fn family(&self) -> BasisFamily {
        self.family
    }

    /// Polynomial degree.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of basis functions (`degree + 1`).
    pub fn basis_size(&self) -> usize {
        self.degree + 1
    }

    /// The `n × (degree + 1)` design matrix for observations `x`.
    pub fn design_matrix(&self, x: &[Real]) -> DMatrix<Real> {
        DMatrix::from_fn(x.len(), self.basis_size(), |i, j| {
            self.family.evaluate(j, x[i])
        })
    }

    /// Fit `y ≈ Σ β_j φ_j(x)` by least squares.
    pub fn fit(&self, x: &[Real], y: &[Real]) -> Result<FittedRegression> {
        if x.len() != y.len() {
            return Err(Error::InvalidArgument(format!(
                "x and y must have the same length ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        let coefficients = min_norm_least_squares(&self.design_matrix(x), y);
        Ok(FittedRegression {
            model: *self,
            coefficients,
        })
    }

    /// Evaluate the fitted expansion with `coefficients` at each `x`.
    pub fn predict(&self, coefficients: &[Real], x: &[Real]) -> Vec<Real> {
        x.iter()
            .map(|&xi| {
                coefficients
                    .iter()
                    .enumerate()
                    .map(|(j, c)| c * self.family.evaluate(j, xi))
                    .sum()
            })
            .collect()
    }
}

/// Coefficients produced by [`RegressionModel::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct FittedRegression {
    model: RegressionModel,
    coefficients: Vec<Real>,
}

impl FittedRegression {
    /// Fitted coefficients, constant term first.
    pub fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }

    /// Fitted values at `x`.
    pub fn predict(&self, x: &[Real]) -> Vec<Real> {
        self.model.predict(&self.coefficients, x)
    }
}

/// Minimum-norm least-squares solution of `a β ≈ y` via SVD.
///
/// Singular values below `max(n, m) · ε · σ_max` are treated as zero.
fn min_norm_least_squares(a: &DMatrix<Real>, y: &[Real]) -> Vec<Real> {
    let (n, m) = a.shape();
    if n == 0 || m == 0 {
        return vec![0.0; m];
    }

    let svd = a.clone().svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
        return vec![0.0; m];
    };
    let sv = &svd.singular_values;

    let sv_max = sv.iter().copied().fold(0.0_f64, f64::max);
    let threshold = n.max(m) as Real * f64::EPSILON * sv_max;

    // β = V · diag(1/sᵢ) · Uᵀ · y, keeping only sᵢ > threshold
    let ut_y = u.transpose() * DVector::from_column_slice(y);
    let mut coefficients = vec![0.0; m];
    for k in 0..sv.len() {
        let s = sv[k];
        if s > threshold {
            let ratio = ut_y[k] / s;
            for (j, c) in coefficients.iter_mut().enumerate() {
                *c += ratio * v_t[(k, j)];
            }
        }
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn grid(n: usize, lo: Real, hi: Real) -> Vec<Real> {
        (0..n)
            .map(|i| lo + (hi - lo) * i as Real / (n - 1) as Real)
            .collect()
    }

    #[test]
    fn classic_recovers_quadratic() {
        // y = 1 - 2x + 0.5x²
        let x = grid(30, -5.0, 9.5);
        let y: Vec<Real> = x.iter().map(|&xi| 1.0 - 2.0 * xi + 0.5 * xi * xi).collect();

        let fit = RegressionModel::new(BasisFamily::Classic, 2)
            .unwrap()
            .fit(&x, &y)
            .unwrap();
        let c = fit.coefficients();
        assert_abs_diff_eq!(c[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[1], -2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[2], 0.5, epsilon = 1e-8);
    }

    #[test]
    fn every_family_spans_the_same_polynomials() {
        let x = grid(40, -0.9, 0.9);
        let y: Vec<Real> = x.iter().map(|&xi| 0.3 + xi - 2.0 * xi.powi(3)).collect();
        for family in [
            BasisFamily::Classic,
            BasisFamily::Laguerre,
            BasisFamily::Hermite,
            BasisFamily::Legendre,
            BasisFamily::Chebyshev,
        ] {
            let fit = RegressionModel::new(family, 3).unwrap().fit(&x, &y).unwrap();
            for (p, t) in fit.predict(&x).iter().zip(&y) {
                assert_abs_diff_eq!(*p, *t, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn closed_forms_satisfy_recurrences() {
        for &x in &[-0.7, 0.0, 0.4, 1.3] {
            for k in 1..6 {
                let kf = k as Real;
                let he = hermite(k + 1, x) - (x * hermite(k, x) - kf * hermite(k - 1, x));
                assert_abs_diff_eq!(he, 0.0, epsilon = 1e-10);
                let p = legendre(k + 1, x)
                    - ((2.0 * kf + 1.0) * x * legendre(k, x) - kf * legendre(k - 1, x))
                        / (kf + 1.0);
                assert_abs_diff_eq!(p, 0.0, epsilon = 1e-10);
                let t = chebyshev(k + 1, x) - (2.0 * x * chebyshev(k, x) - chebyshev(k - 1, x));
                assert_abs_diff_eq!(t, 0.0, epsilon = 1e-10);
                let l = laguerre(k + 1, x)
                    - ((2.0 * kf + 1.0 - x) * laguerre(k, x) - kf * laguerre(k - 1, x))
                        / (kf + 1.0);
                assert_abs_diff_eq!(l, 0.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn orthogonal_degree_is_bounded() {
        assert!(RegressionModel::new(BasisFamily::Legendre, 6).is_ok());
        assert!(matches!(
            RegressionModel::new(BasisFamily::Hermite, 7),
            Err(Error::InvalidArgument(_))
        ));
        assert!(RegressionModel::new(BasisFamily::Classic, 9).is_ok());
    }

    #[test]
    fn rank_deficient_gives_min_norm_solution() {
        // two identical points, three unknowns: the min-norm fit still
        // reproduces the data
        let x = [2.0, 2.0];
        let y = [5.0, 5.0];
        let fit = RegressionModel::default().fit(&x, &y).unwrap();
        let pred = fit.predict(&x);
        assert_abs_diff_eq!(pred[0], 5.0, epsilon = 1e-9);
        // minimum norm: β ∝ (1, 2, 4)
        let c = fit.coefficients();
        assert_abs_diff_eq!(c[1] / c[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c[2] / c[0], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_sample_gives_zero_coefficients() {
        let fit = RegressionModel::default().fit(&[], &[]).unwrap();
        assert_eq!(fit.coefficients(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(RegressionModel::default().fit(&[1.0, 2.0], &[1.0]).is_err());
    }

    proptest! {
        #[test]
        fn exact_polynomials_are_reproduced(
            family_index in 0usize..5,
            degree in 0usize..=4,
            coefficients in proptest::collection::vec(-3.0f64..3.0, 5),
        ) {
            let family = [
                BasisFamily::Classic,
                BasisFamily::Laguerre,
                BasisFamily::Hermite,
                BasisFamily::Legendre,
                BasisFamily::Chebyshev,
            ][family_index];
            let x = grid(25, -0.9, 0.9);
            let y: Vec<Real> = x
                .iter()
                .map(|&xi| coefficients.iter().take(degree + 1).rev().fold(0.0, |acc, c| acc * xi + c))
                .collect();
            let fit = RegressionModel::new(family, degree).unwrap().fit(&x, &y).unwrap();
            prop_assert_eq!(fit.coefficients().len(), degree + 1);
            for (p, t) in fit.predict(&x).iter().zip(&y) {
                prop_assert!((p - t).abs() < 1e-7, "{:?} degree {}: {} vs {}", family, degree, p, t);
            }
        }
    }
}
