//! Payoff properties over arbitrary paths.

use proptest::prelude::*;
use sp_instruments::{BarrierDirection, BarrierKind, BarrierMonitoring, OptionContract, OptionType};
use sp_time::Date;

fn maturity() -> Date {
    Date::from_ymd_opt(2026, 1, 1).unwrap()
}

fn barrier(kind: BarrierKind, direction: BarrierDirection, monitoring: BarrierMonitoring) -> OptionContract {
    OptionContract::barrier(OptionType::Call, 100.0, maturity(), direction, kind, 110.0, monitoring).unwrap()
}

proptest! {
    #[test]
    fn knock_in_plus_knock_out_is_vanilla(
        path in proptest::collection::vec(50.0f64..150.0, 2..40),
        up in any::<bool>(),
        american in any::<bool>(),
    ) {
        let direction = if up { BarrierDirection::Up } else { BarrierDirection::Down };
        let monitoring = if american { BarrierMonitoring::American } else { BarrierMonitoring::European };
        let ki = barrier(BarrierKind::In, direction, monitoring);
        let ko = barrier(BarrierKind::Out, direction, monitoring);
        let vanilla = OptionContract::european(OptionType::Call, 100.0, maturity()).unwrap();

        let total = ki.path_payoff(&path, None).unwrap() + ko.path_payoff(&path, None).unwrap();
        prop_assert_eq!(total, vanilla.path_payoff(&path, None).unwrap());
    }

    #[test]
    fn digital_call_and_put_partition(spot in 1.0f64..200.0) {
        let call = OptionContract::digital(OptionType::Call, 100.0, maturity()).unwrap();
        let put = OptionContract::digital(OptionType::Put, 100.0, maturity()).unwrap();
        let total = call.terminal_payoff(spot).unwrap() + put.terminal_payoff(spot).unwrap();
        prop_assert!(total == 1.0 || (spot == 100.0 && total == 0.0));
    }
}
