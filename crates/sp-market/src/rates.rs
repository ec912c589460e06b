//! Yield curves.
//!
//! Every curve answers the continuously-compounded zero rate for a time `t`
//! (in years); discount factors and forward rates follow from it.

use std::fmt::Debug;
use std::sync::Arc;

use sp_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time};
use sp_math::LinearInterpolation;

/// A yield (interest-rate) curve.
pub trait YieldCurve: Debug + Send + Sync {
    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Rate;

    /// Discount factor `P(0, t)`.
    fn discount(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        (-self.zero_rate(t) * t).exp()
    }

    /// Continuously-compounded forward rate between `t1` and `t2`.
    ///
    /// Falls back to the zero rate at `t1` for an empty interval.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        if t2 <= t1 {
            return self.zero_rate(t1);
        }
        (self.discount(t1) / self.discount(t2)).ln() / (t2 - t1)
    }
}

// ── Flat ──────────────────────────────────────────────────────────────────────

/// A constant rate at every maturity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRate {
    rate: Rate,
}

impl FlatRate {
    /// A flat curve at `rate`.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// The rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl YieldCurve for FlatRate {
    fn zero_rate(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate(&self, _t1: Time, _t2: Time) -> Rate {
        self.rate
    }
}

// ── Interpolated zero curve ───────────────────────────────────────────────────

/// Zero rates linearly interpolated between pillars, extrapolated linearly
/// beyond them.
#[derive(Debug, Clone)]
pub struct InterpolatedZeroCurve {
    interpolation: LinearInterpolation,
}

impl InterpolatedZeroCurve {
    /// Build from pillar times (strictly increasing) and zero rates.
    pub fn new(times: &[Time], rates: &[Rate]) -> Result<Self> {
        ensure!(
            times.first().map_or(false, |&t| t >= 0.0),
            "pillar times must be non-negative"
        );
        Ok(Self {
            interpolation: LinearInterpolation::new(times, rates)?,
        })
    }
}

impl YieldCurve for InterpolatedZeroCurve {
    fn zero_rate(&self, t: Time) -> Rate {
        self.interpolation.value(t)
    }
}

// ── Nelson–Siegel ─────────────────────────────────────────────────────────────

/// Nelson–Siegel parametric zero curve.
///
/// `r(t) = β0 + β1·f1 + β2·(f1 − e^{−t/λ})` with `f1 = (1 − e^{−t/λ}) / (t/λ)`.
/// Parameters are taken as given; fitting them to market yields is left to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelsonSiegelCurve {
    beta0: Real,
    beta1: Real,
    beta2: Real,
    lambda: Real,
}

impl NelsonSiegelCurve {
    /// Build a curve from its four parameters; `lambda` must be positive.
    pub fn new(beta0: Real, beta1: Real, beta2: Real, lambda: Real) -> Result<Self> {
        ensure!(lambda > 0.0, "Nelson-Siegel decay must be positive, got {lambda}");
        Ok(Self {
            beta0,
            beta1,
            beta2,
            lambda,
        })
    }
}

impl YieldCurve for NelsonSiegelCurve {
    fn zero_rate(&self, t: Time) -> Rate {
        // t → 0 limit: f1 → 1, f2 → 0
        if t <= 1e-12 {
            return self.beta0 + self.beta1;
        }
        let x = t / self.lambda;
        let decay = (-x).exp();
        let f1 = (1.0 - decay) / x;
        let f2 = f1 - decay;
        self.beta0 + self.beta1 * f1 + self.beta2 * f2
    }
}

// ── Shifted ───────────────────────────────────────────────────────────────────

/// Another curve moved in parallel by `shift`.
#[derive(Debug, Clone)]
pub struct ShiftedCurve {
    inner: Arc<dyn YieldCurve>,
    shift: Rate,
}

impl ShiftedCurve {
    /// `inner` shifted by `shift` (absolute, e.g. `0.01` = 100bp).
    pub fn new(inner: Arc<dyn YieldCurve>, shift: Rate) -> Self {
        Self { inner, shift }
    }
}

impl YieldCurve for ShiftedCurve {
    fn zero_rate(&self, t: Time) -> Rate {
        self.inner.zero_rate(t) + self.shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flat_discount() {
        let c = FlatRate::new(0.05);
        assert_abs_diff_eq!(c.discount(2.0), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(c.forward_rate(1.0, 3.0), 0.05, epsilon = 1e-15);
        assert_eq!(c.discount(0.0), 1.0);
    }

    #[test]
    fn interpolated_curve_forward_rates() {
        let c = InterpolatedZeroCurve::new(&[0.0, 1.0, 2.0], &[0.01, 0.02, 0.03]).unwrap();
        assert_abs_diff_eq!(c.zero_rate(1.5), 0.025, epsilon = 1e-12);
        // P(1)/P(2) = exp(-0.02 + 0.06) → forward 4%
        assert_abs_diff_eq!(c.forward_rate(1.0, 2.0), 0.04, epsilon = 1e-12);
        assert_abs_diff_eq!(c.zero_rate(3.0), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn nelson_siegel_limits() {
        let c = NelsonSiegelCurve::new(0.04, -0.02, 0.01, 1.5).unwrap();
        assert_abs_diff_eq!(c.zero_rate(0.0), 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(c.zero_rate(1e-6), 0.02, epsilon = 1e-6);
        assert_abs_diff_eq!(c.zero_rate(500.0), 0.04, epsilon = 1e-3);
        assert!(NelsonSiegelCurve::new(0.04, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn shifted_curve() {
        let base: Arc<dyn YieldCurve> = Arc::new(FlatRate::new(0.02));
        let up = ShiftedCurve::new(base, 0.01);
        assert_abs_diff_eq!(up.zero_rate(5.0), 0.03, epsilon = 1e-15);
        assert_abs_diff_eq!(up.forward_rate(1.0, 2.0), 0.03, epsilon = 1e-12);
    }
}
