//! Monte Carlo reproducibility, convergence and autocall properties.

use proptest::prelude::*;
use sp_math::{RngKind, RngStreams};
use sp_methods::{
    autocall_probabilities, BrownianMotion, CashDividend, Discretization, GbmModel, MonteCarloModel,
    PathEnsemble, TreeParameters, TrinomialTree,
};

fn gbm(steps: usize) -> GbmModel {
    GbmModel {
        spot: 100.0,
        volatility: 0.2,
        dividend_yield: 0.0,
        maturity: 1.0,
        step_rates: vec![0.05; steps],
        dividend: None,
    }
}

#[test]
fn test_same_seed_same_paths_whatever_the_pool() {
    let streams = RngStreams::new(RngKind::MersenneTwister, 2024);
    let model = gbm(10);
    let reference = model.simulate(Discretization::Incremental, 5000, streams).unwrap();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let single = pool.install(|| model.simulate(Discretization::Incremental, 5000, streams).unwrap());
    assert_eq!(reference, single);

    let other = model
        .simulate(Discretization::Incremental, 5000, RngStreams::new(RngKind::MersenneTwister, 2025))
        .unwrap();
    assert_ne!(reference, other);
}

#[test]
fn test_dividend_drops_on_the_same_step_as_the_lattice() {
    for (steps, time) in [(4, 0.5), (4, 0.3), (10, 0.45), (10, 0.7), (12, 0.25), (4, 1.0)] {
        let mut model = gbm(steps);
        let dividend = CashDividend { amount: 2.0, time };
        model.dividend = Some(dividend);

        let mut params = TreeParameters::flat(100.0, 0.2, 0.05, 1.0, steps);
        params.dividend = Some(dividend);
        let tree = TrinomialTree::build(params).unwrap();
        let flagged: Vec<usize> = tree
            .nodes()
            .iter()
            .filter(|n| n.is_div_next_period)
            .map(|n| n.layer + 1)
            .collect();
        assert_eq!(flagged, vec![model.dividend_step().unwrap()], "steps {steps}, dividend at {time}");
    }
}

#[test]
fn test_incremental_and_terminal_agree_on_a_european() {
    let discount = (-0.05_f64).exp();
    let call = |p: &[f64]| Ok((p[p.len() - 1] - 100.0).max(0.0));
    for discretization in [Discretization::Terminal, Discretization::Incremental] {
        let mc = MonteCarloModel::new(
            gbm(20),
            discretization,
            100_000,
            RngStreams::new(RngKind::Ziggurat, 9),
        )
        .unwrap();
        let stats = mc.estimate(discount, call).unwrap();
        let (price, error) = (stats.mean().unwrap(), stats.error_estimate().unwrap());
        assert!((price - 10.4506).abs() / 10.4506 < 0.01, "{discretization:?}: {price:.4} ± {error:.4}");
    }
}

#[test]
fn test_cash_dividend_shifts_the_forward() {
    let mut model = gbm(12);
    model.dividend = Some(CashDividend { amount: 4.0, time: 0.45 });
    let paths = model
        .simulate(Discretization::DiscreteDividend, 50_000, RngStreams::new(RngKind::MersenneTwister, 3))
        .unwrap();
    let mean: f64 = paths.terminal().iter().sum::<f64>() / paths.draws() as f64;
    // E[S_T] = S e^{rT} − D e^{r(T − t_step)}, dividend on step 6 of 12
    let expected = 100.0 * 0.05_f64.exp() - 4.0 * 0.025_f64.exp();
    assert!((mean - expected).abs() < 0.35, "mean {mean:.3} vs {expected:.3}");
}

#[test]
fn test_brownian_batches_are_independent_of_batch_layout() {
    let streams = RngStreams::new(RngKind::MersenneTwister, 5);
    let bm = BrownianMotion::new(3, 1000, 1.0, streams).unwrap();
    let full = bm.simulate();
    // the first batch is generated identically whatever the total draw count
    let short = BrownianMotion::new(3, 10, 1.0, streams).unwrap().simulate();
    assert_eq!(&full.values()[..40], short.values());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn autocall_mass_is_exactly_one(
        values in proptest::collection::vec(50.0f64..150.0, 60),
        barrier in 80.0f64..140.0,
        observations in 1usize..5,
    ) {
        // ten paths of six points
        let paths = PathEnsemble::new(values, 10, 6).unwrap();
        let steps: Vec<usize> = (1..=observations).collect();
        let times: Vec<f64> = steps.iter().map(|&s| s as f64 / 5.0).collect();
        let result = autocall_probabilities(&paths, barrier, &steps, &times).unwrap();
        let total: f64 = result.probabilities.iter().sum();
        prop_assert!((total - 1.0).abs() <= f64::EPSILON * observations as f64);
        prop_assert!(result.probabilities.iter().all(|&p| p >= -1e-15));
        prop_assert!(result.expected_duration <= times[times.len() - 1] + 1e-12);
    }
}
