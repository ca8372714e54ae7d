//! Benchmarks for rolling statistics and the full chart transform.

use chartseries::core::Observation;
use chartseries::transform::{
    rolling_mean, rolling_z_score, transform, EvictionPolicy, RecencyFilter, TransformParams,
};
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Daily-looking signal with a gap every 17 points.
fn generate_gapped(n: usize) -> Vec<Option<f64>> {
    (0..n)
        .map(|i| {
            if i % 17 == 16 {
                None
            } else {
                Some(100.0 + 10.0 * (2.0 * std::f64::consts::PI * i as f64 / 90.0).sin() + i as f64 * 0.01)
            }
        })
        .collect()
}

fn bench_rolling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling");

    for size in [365, 1825, 10_000].iter() {
        let values = generate_gapped(*size);

        for policy in [EvictionPolicy::CountBased, EvictionPolicy::Positional] {
            let label = format!("{policy:?}");

            group.bench_with_input(BenchmarkId::new(format!("z_score_90/{label}"), size), size, |b, _| {
                b.iter(|| rolling_z_score(black_box(&values), 90, policy))
            });

            group.bench_with_input(BenchmarkId::new(format!("mean_365/{label}"), size), size, |b, _| {
                b.iter(|| rolling_mean(black_box(&values), 365, policy))
            });
        }
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let base = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();

    for size in [1825, 3650].iter() {
        let obs: Vec<Observation> = generate_gapped(*size)
            .into_iter()
            .enumerate()
            .map(|(i, v)| Observation::new(base + Duration::days(i as i64), v))
            .collect();
        let now = obs.last().map(|o| o.timestamp).unwrap_or(base);

        for recency in [RecencyFilter::LastQuarter, RecencyFilter::AllTime] {
            let params = TransformParams::new()
                .with_z_score(180)
                .with_moving_average(30)
                .with_recency(recency);

            group.bench_with_input(BenchmarkId::new(recency.label(), size), size, |b, _| {
                b.iter(|| transform(black_box(&obs), &params, now))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_rolling, bench_transform);
criterion_main!(benches);
