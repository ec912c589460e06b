//! Linear interpolation in one and two dimensions.
//!
//! [`LinearInterpolation`] extrapolates linearly from the end segments;
//! [`BilinearInterpolation`] only answers inside its grid and reports
//! points outside it as `None`, leaving the fallback policy to the caller.

use sp_core::{ensure, errors::Result, Real};

/// Piecewise-linear interpolation through sorted points.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`, with the
/// first and last segments extended beyond the data range.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct from strictly increasing `xs` and matching `ys`.
    ///
    /// # Errors
    /// Fails with fewer than 2 points, mismatched lengths or unsorted `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        ensure!(xs.len() >= 2, "need at least 2 points for interpolation");
        ensure!(xs.len() == ys.len(), "xs and ys must have the same length");
        ensure!(
            xs.windows(2).all(|w| w[0] < w[1]),
            "xs must be strictly increasing"
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Lower bound of the data range.
    pub fn x_min(&self) -> Real {
        self.xs[0]
    }

    /// Upper bound of the data range.
    pub fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    /// Value at `x`, extrapolating outside `[x_min, x_max]`.
    pub fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        self.ys[i] + t * (self.ys[i + 1] - self.ys[i])
    }
}

/// Bilinear interpolation on a rectangular grid.
///
/// `z` is row-major: `z[j * nx + i] = f(xs[i], ys[j])`.
#[derive(Debug, Clone)]
pub struct BilinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    z: Vec<Real>,
    nx: usize,
}

impl BilinearInterpolation {
    /// Build a bilinear interpolation on the grid `(xs × ys → z)`.
    ///
    /// Both `xs` and `ys` must be strictly increasing with at least 2 points.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        ensure!(nx >= 2, "need at least 2 x points");
        ensure!(ny >= 2, "need at least 2 y points");
        ensure!(
            z.len() == nx * ny,
            "z length ({}) must equal nx*ny ({}*{}={})",
            z.len(),
            nx,
            ny,
            nx * ny
        );
        ensure!(
            xs.windows(2).all(|w| w[0] < w[1]) && ys.windows(2).all(|w| w[0] < w[1]),
            "grid axes must be strictly increasing"
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            z: z.to_vec(),
            nx,
        })
    }

    fn z_at(&self, i: usize, j: usize) -> Real {
        self.z[j * self.nx + i]
    }

    /// Whether `(x, y)` lies inside the grid (boundary included).
    pub fn contains(&self, x: Real, y: Real) -> bool {
        x >= self.xs[0]
            && x <= self.xs[self.xs.len() - 1]
            && y >= self.ys[0]
            && y <= self.ys[self.ys.len() - 1]
    }

    /// Value at `(x, y)`, or `None` outside the grid.
    pub fn value(&self, x: Real, y: Real) -> Option<Real> {
        if !self.contains(x, y) {
            return None;
        }
        let i = locate(&self.xs, x);
        let j = locate(&self.ys, y);

        let z1 = self.z_at(i, j);
        let z2 = self.z_at(i + 1, j);
        let z3 = self.z_at(i, j + 1);
        let z4 = self.z_at(i + 1, j + 1);

        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        let u = (y - self.ys[j]) / (self.ys[j + 1] - self.ys[j]);

        Some((1.0 - t) * (1.0 - u) * z1 + t * (1.0 - u) * z2 + (1.0 - t) * u * z3 + t * u * z4)
    }
}

/// Binary search: find `k` such that `vs[k] <= v < vs[k+1]`, clamped to
/// `[0, n-2]`.
fn locate(vs: &[Real], v: Real) -> usize {
    let n = vs.len();
    if v <= vs[0] {
        return 0;
    }
    if v >= vs[n - 1] {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if vs[mid] <= v {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}
