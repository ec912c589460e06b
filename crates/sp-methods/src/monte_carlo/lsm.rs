//! Longstaff–Schwartz backward induction.

use sp_core::errors::Result;
use sp_core::{ensure, DiscountFactor, Real};
use sp_math::{RegressionModel, Statistics};
use tracing::{debug, warn};

use super::brownian::PathEnsemble;

/// Present value statistics of an early-exercise payoff.
///
/// `exercise(S)` is the immediate exercise value, positive only in the
/// money. Working backwards from the last step, the discounted future
/// cashflow of the in-the-money paths at each step `1..n−1` is regressed
/// on `S / scale`; paths whose exercise value beats the fitted
/// continuation exercise there. `step_discounts[i]` discounts from step
/// `i + 1` to step `i`.
pub fn longstaff_schwartz<F>(
    paths: &PathEnsemble,
    exercise: F,
    regression: &RegressionModel,
    step_discounts: &[DiscountFactor],
    scale: Real,
) -> Result<Statistics>
where
    F: Fn(Real) -> Real,
{
    let n = paths.steps();
    ensure!(n >= 1, "paths need at least one step");
    ensure!(
        step_discounts.len() == n,
        "{} step discounts for {n} steps",
        step_discounts.len()
    );
    ensure!(scale > 0.0, "regression scale must be positive, got {scale}");

    let mut cashflows: Vec<Real> = paths.terminal().into_iter().map(&exercise).collect();
    let mut exercised = 0usize;

    for step in (1..n).rev() {
        let df = step_discounts[step];
        cashflows.iter_mut().for_each(|cf| *cf *= df);

        let spots = paths.column(step)?;
        let in_the_money: Vec<usize> = (0..spots.len()).filter(|&i| exercise(spots[i]) > 0.0).collect();
        if in_the_money.is_empty() {
            continue;
        }
        if in_the_money.len() < regression.basis_size() {
            warn!(
                step,
                itm = in_the_money.len(),
                basis = regression.basis_size(),
                "too few in-the-money paths to regress, exercise skipped"
            );
            continue;
        }

        let x: Vec<Real> = in_the_money.iter().map(|&i| spots[i] / scale).collect();
        let y: Vec<Real> = in_the_money.iter().map(|&i| cashflows[i]).collect();
        let continuation = regression.fit(&x, &y)?.predict(&x);

        for (&i, cont) in in_the_money.iter().zip(continuation) {
            let value = exercise(spots[i]);
            if value > cont {
                cashflows[i] = value;
                exercised += 1;
            }
        }
    }

    let df0 = step_discounts[0];
    let mut stats = Statistics::new();
    stats.extend(cashflows.into_iter().map(|cf| cf * df0));
    debug!(steps = n, exercised, mean = stats.mean(), "longstaff-schwartz done");
    Ok(stats)
}
