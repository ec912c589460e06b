//! First-touch probabilities of an upper autocall barrier.

use rayon::prelude::*;
use serde::Serialize;
use sp_core::errors::{Error, Result};
use sp_core::{ensure, Probability, Real, Time};

use super::brownian::PathEnsemble;

/// Redemption probability per observation date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocallProbabilities {
    /// Observation times in years.
    pub times: Vec<Time>,
    /// Probability of redeeming at each observation; sums to one.
    pub probabilities: Vec<Probability>,
    /// Probability-weighted redemption time.
    pub expected_duration: Time,
}

/// Estimate autocall probabilities from an ensemble of asset paths.
///
/// A path redeems at the first observation where it trades strictly above
/// `barrier`. Paths that never redeem early end at the last observation,
/// whose bucket is `1 − Σ` of the earlier ones.
pub fn autocall_probabilities(
    paths: &PathEnsemble,
    barrier: Real,
    observation_steps: &[usize],
    observation_times: &[Time],
) -> Result<AutocallProbabilities> {
    ensure!(!observation_steps.is_empty(), "at least one observation is required");
    ensure!(
        observation_steps.len() == observation_times.len(),
        "{} observation steps for {} times",
        observation_steps.len(),
        observation_times.len()
    );
    if let Some(&step) = observation_steps.iter().find(|&&s| s >= paths.points()) {
        return Err(Error::IndexOutOfRange {
            index: step,
            size: paths.points(),
        });
    }

    let first_touch: Vec<Option<usize>> = paths
        .par_paths()
        .map(|p| observation_steps.iter().position(|&step| p[step] > barrier))
        .collect();

    let last = observation_steps.len() - 1;
    let mut counts = vec![0usize; last];
    for k in first_touch.into_iter().flatten() {
        if k < last {
            counts[k] += 1;
        }
    }

    let draws = paths.draws() as Real;
    let mut probabilities: Vec<Probability> = counts.iter().map(|&c| c as Real / draws).collect();
    let residual = 1.0 - probabilities.iter().sum::<Real>();
    probabilities.push(residual);

    let expected_duration = observation_times
        .iter()
        .zip(&probabilities)
        .map(|(t, p)| t * p)
        .sum();

    Ok(AutocallProbabilities {
        times: observation_times.to_vec(),
        probabilities,
        expected_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_first_touch_only() {
        // four paths observed at steps 1, 2, 3
        let paths = PathEnsemble::new(
            vec![
                100.0, 120.0, 90.0, 130.0, // redeems at the first date
                100.0, 90.0, 115.0, 90.0, // redeems at the second
                100.0, 90.0, 90.0, 90.0, // never redeems
                100.0, 90.0, 110.0, 120.0, // touches the barrier, not above it
            ],
            4,
            4,
        )
        .unwrap();
        let result = autocall_probabilities(&paths, 110.0, &[1, 2, 3], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(result.probabilities, vec![0.25, 0.25, 0.5]);
        assert_eq!(result.probabilities.iter().sum::<Real>(), 1.0);
        assert_eq!(result.expected_duration, 0.25 + 0.5 + 1.5);
    }

    #[test]
    fn rejects_observation_beyond_paths() {
        let paths = PathEnsemble::new(vec![100.0, 101.0], 1, 2).unwrap();
        assert!(matches!(
            autocall_probabilities(&paths, 110.0, &[2], &[1.0]),
            Err(Error::IndexOutOfRange { index: 2, size: 2 })
        ));
        assert!(autocall_probabilities(&paths, 110.0, &[1], &[]).is_err());
    }
}
