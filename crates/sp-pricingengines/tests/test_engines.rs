//! Cross-engine properties: parity, convergence, replication, dominance.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use sp_instruments::{BarrierDirection, BarrierKind, BarrierMonitoring, OptionContract, OptionType, PayoffKind};
use sp_market::{Dividend, Market};
use sp_math::{BasisFamily, RegressionModel};
use sp_pricingengines::{black_scholes_merton, greeks, price, Pricer};
use sp_time::{Date, Frequency};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

fn pricing_date() -> Date {
    date(2025, 1, 1)
}

fn maturity() -> Date {
    date(2026, 1, 1)
}

// ───────────────────────── end to end ─────────────────────────

#[test]
fn test_black_scholes_scenario() {
    let market = Market::new(100.0, 0.2, 0.02, Dividend::Continuous { yield_rate: 0.035 }).unwrap();
    let call = OptionContract::european(OptionType::Call, 100.0, maturity()).unwrap();
    let pricer = Pricer::black_scholes(pricing_date());

    let npv = price(&market, &call, &pricer).unwrap().npv;
    assert_abs_diff_eq!(npv, 7.04, epsilon = 0.1);

    let g = greeks(&market, &call, &pricer).unwrap().to_array();
    let expected = [0.492, 0.019, 0.385, -0.012, 0.422];
    for (got, want) in g.iter().zip(expected) {
        assert_abs_diff_eq!(*got, want, epsilon = 2e-3);
    }
}

// ───────────────────────── convergence ─────────────────────────

#[test]
fn test_tree_and_monte_carlo_within_one_percent_of_black_scholes() {
    let market = Market::new(100.0, 0.2, 0.05, Dividend::None).unwrap();
    let call = OptionContract::european(OptionType::Call, 100.0, maturity()).unwrap();
    let bs = price(&market, &call, &Pricer::black_scholes(pricing_date())).unwrap().npv;

    let tree = price(&market, &call, &Pricer::tree(pricing_date(), 500, false, 0.0).unwrap()).unwrap().npv;
    assert!((tree - bs).abs() / bs < 0.01, "tree {tree:.4} bs {bs:.4}");

    let mc = price(&market, &call, &Pricer::monte_carlo(pricing_date(), 1, 100_000, Some(11)).unwrap())
        .unwrap()
        .npv;
    assert!((mc - bs).abs() / bs < 0.01, "mc {mc:.4} bs {bs:.4}");
}

#[test]
fn test_tree_and_monte_carlo_agree_with_a_cash_dividend() {
    let market = Market::new(
        100.0,
        0.25,
        0.03,
        Dividend::Discrete {
            amount: 3.0,
            date: date(2025, 6, 1),
        },
    )
    .unwrap();
    let put = OptionContract::european(OptionType::Put, 100.0, maturity()).unwrap();
    let tree = price(&market, &put, &Pricer::tree(pricing_date(), 365, false, 0.0).unwrap()).unwrap().npv;
    let mc = price(&market, &put, &Pricer::monte_carlo(pricing_date(), 365, 40_000, Some(5)).unwrap()).unwrap();
    let se = mc.error_estimate.unwrap();
    assert!((tree - mc.npv).abs() < 3.0 * se + 0.05, "tree {tree:.4} mc {:.4} ± {se:.4}", mc.npv);
}

// ───────────────────────── barrier parity ─────────────────────────

#[test]
fn test_monte_carlo_knock_in_plus_knock_out_is_the_vanilla() {
    let market = Market::new(100.0, 0.2, 0.03, Dividend::None).unwrap();
    let out = OptionContract::barrier(
        OptionType::Put,
        100.0,
        maturity(),
        BarrierDirection::Down,
        BarrierKind::Out,
        85.0,
        BarrierMonitoring::American,
    )
    .unwrap();
    let knock_in = out.with_payoff(PayoffKind::Barrier(out.barrier_spec().unwrap().opposite())).unwrap();
    let pricer = Pricer::monte_carlo(pricing_date(), 250, 40_000, Some(17)).unwrap();

    let o = price(&market, &out, &pricer).unwrap();
    let i = price(&market, &knock_in, &pricer).unwrap();
    let vanilla = price(&market, &out.to_european(), &Pricer::black_scholes(pricing_date())).unwrap().npv;
    let noise = 3.0 * (o.error_estimate.unwrap() + i.error_estimate.unwrap());
    assert!((o.npv + i.npv - vanilla).abs() < noise, "{} + {} vs {vanilla}", o.npv, i.npv);

    // the closed form agrees with the engines
    let closed_out = price(&market, &out, &Pricer::black_scholes(pricing_date())).unwrap().npv;
    let tree_out = price(&market, &out, &Pricer::tree(pricing_date(), 400, false, 0.0).unwrap()).unwrap().npv;
    // node-level monitoring shifts the effective barrier by up to one node
    assert!((tree_out - closed_out).abs() / closed_out < 0.2, "tree {tree_out} closed {closed_out}");
}

// ───────────────────────── digital replication ─────────────────────────

#[test]
fn test_call_spread_converges_to_the_digital() {
    let market = Market::new(100.0, 0.2, 0.03, Dividend::None).unwrap();
    let pricer = Pricer::black_scholes(pricing_date());
    let digital = OptionContract::digital(OptionType::Call, 100.0, maturity()).unwrap();
    let target = price(&market, &digital, &pricer).unwrap().npv;

    let spread = |eps: f64| {
        let low = OptionContract::european(OptionType::Call, 100.0 - eps, maturity()).unwrap();
        let high = OptionContract::european(OptionType::Call, 100.0, maturity()).unwrap();
        (price(&market, &low, &pricer).unwrap().npv - price(&market, &high, &pricer).unwrap().npv) / eps
    };
    let errors: Vec<f64> = [1.0, 0.1, 0.01].iter().map(|&e| (spread(e) - target).abs()).collect();
    assert!(errors[0] > errors[1] && errors[1] > errors[2], "{errors:?}");
    assert!(errors[2] < 1e-3);
}

// ───────────────────────── early exercise ─────────────────────────

#[test]
fn test_american_dominates_european() {
    let market = Market::new(100.0, 0.2, 0.05, Dividend::None).unwrap();
    let regression = RegressionModel::new(BasisFamily::Laguerre, 3).unwrap();
    let american = OptionContract::american(OptionType::Put, 100.0, maturity(), regression).unwrap();
    let european = price(&market, &american.to_european(), &Pricer::black_scholes(pricing_date()))
        .unwrap()
        .npv;

    let lsm = price(&market, &american, &Pricer::monte_carlo(pricing_date(), 50, 20_000, Some(3)).unwrap()).unwrap();
    assert!(lsm.npv >= european - 3.0 * lsm.error_estimate.unwrap());

    let tree = price(&market, &american, &Pricer::tree(pricing_date(), 300, false, 0.0).unwrap()).unwrap().npv;
    let baw = price(&market, &american, &Pricer::black_scholes(pricing_date())).unwrap().npv;
    assert!(tree > european && baw > european);
    assert!((tree - baw).abs() < 0.1, "tree {tree} baw {baw}");
}

// ───────────────────────── monte carlo boundaries ─────────────────────────

#[test]
fn test_single_draw_prices_without_an_error_estimate() {
    let market = Market::new(100.0, 0.2, 0.03, Dividend::None).unwrap();
    let products = [
        OptionContract::european(OptionType::Call, 100.0, maturity()).unwrap(),
        OptionContract::digital(OptionType::Put, 100.0, maturity()).unwrap(),
        OptionContract::asian(OptionType::Call, 100.0, maturity(), Some(Frequency::Monthly)).unwrap(),
        OptionContract::american(OptionType::Put, 100.0, maturity(), RegressionModel::default()).unwrap(),
        OptionContract::barrier(
            OptionType::Put,
            100.0,
            maturity(),
            BarrierDirection::Down,
            BarrierKind::In,
            85.0,
            BarrierMonitoring::American,
        )
        .unwrap(),
    ];
    for steps in [1, 4] {
        let pricer = Pricer::monte_carlo(pricing_date(), steps, 1, Some(1)).unwrap();
        for option in &products {
            let results = price(&market, option, &pricer).unwrap();
            assert!(results.npv.is_finite() && results.npv >= 0.0, "{option:?}: {}", results.npv);
            assert_eq!(results.error_estimate, None);
            assert_eq!(results.result("draws"), Some(1.0));
        }
    }
}

#[test]
fn test_single_step_american_is_the_european() {
    let market = Market::new(100.0, 0.25, 0.04, Dividend::None).unwrap();
    let american = OptionContract::american(OptionType::Put, 105.0, maturity(), RegressionModel::default()).unwrap();
    let pricer = Pricer::monte_carlo(pricing_date(), 1, 5_000, Some(9)).unwrap();
    // no intermediate exercise date: the regression never runs
    let a = price(&market, &american, &pricer).unwrap();
    let e = price(&market, &american.to_european(), &pricer).unwrap();
    assert_abs_diff_eq!(a.npv, e.npv, epsilon = 1e-8);
    assert!(a.error_estimate.unwrap() > 0.0);
}

#[test]
fn test_dividend_on_a_grid_date_drops_on_that_step() {
    // 73 steps of five days; 2025-06-30 is grid point 36
    let with_dividend_on = |day: Date| {
        let market = Market::new(100.0, 0.2, 0.03, Dividend::Discrete { amount: 4.0, date: day }).unwrap();
        let call = OptionContract::european(OptionType::Call, 100.0, maturity()).unwrap();
        price(&market, &call, &Pricer::monte_carlo(pricing_date(), 73, 2_000, Some(3)).unwrap())
            .unwrap()
            .npv
    };
    let on_grid = with_dividend_on(date(2025, 6, 30));
    assert_eq!(on_grid, with_dividend_on(date(2025, 6, 29)));
    assert_ne!(on_grid, with_dividend_on(date(2025, 7, 1)));
}

// ───────────────────────── properties ─────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn put_call_parity(
        spot in 20.0f64..200.0,
        strike in 20.0f64..200.0,
        r in -0.01f64..0.1,
        q in 0.0f64..0.08,
        vol in 0.01f64..1.0,
        t in 0.01f64..5.0,
    ) {
        let call = black_scholes_merton(OptionType::Call, spot, strike, r, q, vol, t).0;
        let put = black_scholes_merton(OptionType::Put, spot, strike, r, q, vol, t).0;
        let forward = spot * (-q * t).exp() - strike * (-r * t).exp();
        prop_assert!((call - put - forward).abs() < 1e-6, "{} vs {}", call - put, forward);
    }
}
