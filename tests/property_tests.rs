//! Property-based tests for the chart transform.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated series with gaps.

use chartseries::core::Observation;
use chartseries::transform::{
    rolling_mean, rolling_z_score, transform, EvictionPolicy, RecencyFilter, TransformParams,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

/// Daily observations from the given values.
fn make_obs(values: &[Option<f64>]) -> Vec<Observation> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| Observation::new(base() + Duration::days(i as i64), v))
        .collect()
}

/// Values in a realistic range with roughly one gap in six.
fn gapped_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop_oneof![5 => (-1000.0..1000.0_f64).prop_map(Some), 1 => Just(None)],
        min_len..max_len,
    )
}

fn policy_strategy() -> impl Strategy<Value = EvictionPolicy> {
    prop_oneof![Just(EvictionPolicy::CountBased), Just(EvictionPolicy::Positional)]
}

fn recency_strategy() -> impl Strategy<Value = RecencyFilter> {
    prop::sample::select(RecencyFilter::ALL.to_vec())
}

// =============================================================================
// Property: outputs stay aligned with the filtered input
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn outputs_align_with_filtered_series(
        values in gapped_values_strategy(0, 300),
        z in 0usize..60,
        ma in 0usize..60,
        recency in recency_strategy(),
        policy in policy_strategy(),
        days_after_end in 0i64..400,
    ) {
        let obs = make_obs(&values);
        let now = base() + Duration::days(values.len() as i64 + days_after_end);
        let params = TransformParams {
            z_score_window: Some(z),
            moving_average_period: Some(ma),
            recency,
            eviction: policy,
        };

        let out = transform(&obs, &params, now);
        let n = out.filtered.len();

        prop_assert!(n <= obs.len());
        prop_assert_eq!(&out.filtered[..], &obs[obs.len() - n..]);
        if let Some(zs) = &out.z_score {
            prop_assert_eq!(zs.len(), n);
        }
        if let Some(mas) = &out.moving_average {
            prop_assert_eq!(mas.len(), n);
        }
        prop_assert_eq!(out.z_score.is_some(), z >= 2);
        prop_assert_eq!(out.moving_average.is_some(), ma >= 1);
    }

    #[test]
    fn all_time_is_a_no_op(values in gapped_values_strategy(0, 200)) {
        let obs = make_obs(&values);
        let params = TransformParams::new().with_recency(RecencyFilter::AllTime);
        let out = transform(&obs, &params, base());
        prop_assert_eq!(out.filtered, obs);
    }

    #[test]
    fn transform_is_idempotent(
        values in gapped_values_strategy(0, 200),
        z in 2usize..40,
        ma in 1usize..40,
        policy in policy_strategy(),
    ) {
        let obs = make_obs(&values);
        let params = TransformParams::new()
            .with_z_score(z)
            .with_moving_average(ma)
            .with_eviction(policy)
            .with_recency(RecencyFilter::LastQuarter);
        let now = base() + Duration::days(150);

        let a = transform(&obs, &params, now);
        let b = transform(&obs, &params, now);

        let bits = |v: &Option<Vec<Option<f64>>>| -> Vec<Option<u64>> {
            v.iter().flatten().map(|x| x.map(f64::to_bits)).collect()
        };
        prop_assert_eq!(&a.filtered, &b.filtered);
        prop_assert_eq!(bits(&a.z_score), bits(&b.z_score));
        prop_assert_eq!(bits(&a.moving_average), bits(&b.moving_average));
    }
}

// =============================================================================
// Property: gaps and degenerate windows produce None, never NaN
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn missing_inputs_give_missing_outputs(
        values in gapped_values_strategy(1, 200),
        window in 1usize..30,
        policy in policy_strategy(),
    ) {
        let z = rolling_z_score(&values, window, policy);
        let ma = rolling_mean(&values, window, policy);

        for i in 0..values.len() {
            if values[i].is_none() {
                prop_assert!(z[i].is_none());
                prop_assert!(ma[i].is_none());
            }
            if let Some(x) = z[i] {
                prop_assert!(x.is_finite());
            }
            if let Some(x) = ma[i] {
                prop_assert!(x.is_finite());
            }
        }
    }

    #[test]
    fn constant_series_has_no_z_score(
        c in -1.0e6..1.0e6_f64,
        len in 0usize..200,
        window in 2usize..50,
        policy in policy_strategy(),
    ) {
        let values = vec![Some(c); len];
        let z = rolling_z_score(&values, window, policy);
        prop_assert!(z.iter().all(Option::is_none));

        let ma = rolling_mean(&values, window, policy);
        for (i, m) in ma.iter().enumerate() {
            if i + 1 >= window {
                prop_assert_eq!(*m, Some(c));
            } else {
                prop_assert!(m.is_none());
            }
        }
    }

    #[test]
    fn policies_agree_without_gaps(
        values in prop::collection::vec(-100.0..100.0_f64, 0..150),
        window in 2usize..30,
    ) {
        let values: Vec<Option<f64>> = values.into_iter().map(Some).collect();
        let count_z = rolling_z_score(&values, window, EvictionPolicy::CountBased);
        let pos_z = rolling_z_score(&values, window, EvictionPolicy::Positional);
        prop_assert_eq!(count_z, pos_z);

        let count_ma = rolling_mean(&values, window, EvictionPolicy::CountBased);
        let pos_ma = rolling_mean(&values, window, EvictionPolicy::Positional);
        prop_assert_eq!(count_ma, pos_ma);
    }

    #[test]
    fn moving_average_matches_direct_mean(
        values in prop::collection::vec(-100.0..100.0_f64, 1..150),
        period in 1usize..20,
    ) {
        let opt: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        let ma = rolling_mean(&opt, period, EvictionPolicy::CountBased);

        for i in 0..values.len() {
            if i + 1 < period {
                prop_assert!(ma[i].is_none());
            } else {
                let slice = &values[i + 1 - period..=i];
                let direct = slice.iter().sum::<f64>() / period as f64;
                prop_assert!((ma[i].unwrap() - direct).abs() < 1e-8);
            }
        }
    }
}
