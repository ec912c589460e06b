//! Pricing results.

use std::collections::BTreeMap;

use serde::Serialize;
use sp_core::Real;

/// What an engine returns for one instrument.
///
/// Monte Carlo engines fill `error_estimate`; other engines may add named
/// by-products (e.g. `"accrued"` for bonds, `"steps"` for lattices).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Standard error of the estimate, when the method is statistical.
    pub error_estimate: Option<Real>,
    /// Additional named results.
    pub additional_results: BTreeMap<String, Real>,
}

impl PricingResults {
    /// Results holding just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            ..Self::default()
        }
    }

    /// Attach a standard error.
    pub fn with_error_estimate(mut self, error: Real) -> Self {
        self.error_estimate = Some(error);
        self
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// A named result, if present.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }
}
