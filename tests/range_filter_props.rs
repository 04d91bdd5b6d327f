use candle_signals::indicators::range_filter::{
    conditions, directions, range_filter, triggers, Condition, Direction, NanPolicy, Trigger,
};
use proptest::prelude::*;

fn series() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((1.0f64..1000.0, 0.0f64..50.0), 1..200)
        .prop_map(|rows| rows.into_iter().unzip())
}

proptest! {
    /// Rows before the warm-up equal the close.
    #[test]
    fn seed_rows_equal_close((close, range) in series(), warmup in 0usize..50) {
        let out = range_filter(&close, &range, warmup, NanPolicy::Hold).unwrap();
        let seed = warmup.max(1).min(close.len());
        for i in 0..seed {
            prop_assert_eq!(out.filter[i], close[i]);
        }
    }

    /// After the warm-up the filter stays within one range of the close, and
    /// when it moves it lands exactly on a band edge.
    #[test]
    fn filter_within_range_of_close((close, range) in series(), warmup in 0usize..20) {
        let out = range_filter(&close, &range, warmup, NanPolicy::Hold).unwrap();
        let seed = warmup.max(1).min(close.len());
        for i in seed..close.len() {
            let f = out.filter[i];
            prop_assert!(f >= close[i] - range[i]);
            prop_assert!(f <= close[i] + range[i]);
            if f != out.filter[i - 1] {
                prop_assert!(f == close[i] - range[i] || f == close[i] + range[i]);
            }
        }
    }

    /// Undefined ranges hold the previous value under the default policy.
    #[test]
    fn held_filter_is_always_defined(
        (close, mut range) in series(),
        holes in prop::collection::vec(any::<bool>(), 200),
    ) {
        for (r, hole) in range.iter_mut().zip(&holes) {
            if *hole {
                *r = f64::NAN;
            }
        }
        let out = range_filter(&close, &range, 1, NanPolicy::Hold).unwrap();
        prop_assert!(out.filter.iter().all(|f| !f.is_nan()));
    }

    /// Conditions only change on a trigger and otherwise carry forward.
    #[test]
    fn conditions_forward_fill((close, range) in series()) {
        let out = range_filter(&close, &range, 1, NanPolicy::Hold).unwrap();
        let dirs = directions(&out.filter);
        let trig = triggers(&close, &out.filter, &dirs);
        let conds = conditions(&trig);

        prop_assert_eq!(dirs[0], Direction::Flat);
        prop_assert_eq!(trig[0], Trigger::None);
        prop_assert_eq!(conds[0], Condition::None);
        for i in 1..conds.len() {
            match trig[i] {
                Trigger::Long => prop_assert_eq!(conds[i], Condition::Long),
                Trigger::Short => prop_assert_eq!(conds[i], Condition::Short),
                Trigger::None => prop_assert_eq!(conds[i], conds[i - 1]),
            }
        }
    }

    /// Recomputing over the same input gives bit-identical output.
    #[test]
    fn recomputation_is_identical((close, range) in series(), warmup in 0usize..20) {
        let a = range_filter(&close, &range, warmup, NanPolicy::Propagate).unwrap();
        let b = range_filter(&close, &range, warmup, NanPolicy::Propagate).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        prop_assert_eq!(bits(&a.filter), bits(&b.filter));
        prop_assert_eq!(bits(&a.high_band), bits(&b.high_band));
        prop_assert_eq!(bits(&a.low_band), bits(&b.low_band));
    }
}
