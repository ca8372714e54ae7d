//! Quickstart example: parse a snapshot and chart one metric.
//!
//! Run with: cargo run --example quickstart

use chartseries::ingest::{parse_csv, CsvSchema};
use chartseries::transform::{transform, RecencyFilter, TransformParams};
use chartseries::view::ChartView;
use chrono::{Duration, NaiveDate, TimeZone, Utc};

fn fmt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{x:.3}"))
}

fn main() {
    println!("=== chartseries Quickstart ===\n");

    // 1. Build a CSV snapshot in memory: a year of daily open interest with a few gaps
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut csv = String::from("Date,altcoin_dollar_oi,btc_price\n");
    for i in 0..366 {
        let date = start + Duration::days(i);
        let oi = 1_000.0 + 5.0 * i as f64 + 80.0 * (i as f64 / 14.0).sin();
        let btc = 42_000.0 + 60.0 * i as f64;
        if i % 45 == 44 {
            csv.push_str(&format!("{date},,{btc:.0}\n"));
        } else {
            csv.push_str(&format!("{date},{oi:.2},{btc:.0}\n"));
        }
    }

    let ingested = parse_csv(csv.as_bytes(), &CsvSchema::default()).unwrap();
    println!(
        "Loaded {} rows, {} metrics: {:?}",
        ingested.report.rows_used,
        ingested.frame.width(),
        ingested.frame.labels()
    );

    // 2. Transform one metric directly
    let series = ingested.frame.series("altcoin_dollar_oi").unwrap();
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let params = TransformParams::new()
        .with_z_score(90)
        .with_moving_average(30)
        .with_recency(RecencyFilter::LastMonth);

    let out = transform(series.observations(), &params, now);
    let z = out.z_score.as_ref().unwrap();
    let ma = out.moving_average.as_ref().unwrap();

    println!("\n--- Last month ({} points) ---", out.len());
    println!("{:>12} {:>10} {:>10} {:>10}", "Date", "OI", "MA(30)", "Z(90)");
    for (i, obs) in out.filtered.iter().enumerate().rev().take(10) {
        println!(
            "{:>12} {:>10} {:>10} {:>10}",
            obs.timestamp.date_naive(),
            fmt(obs.value),
            fmt(ma[i]),
            fmt(z[i])
        );
    }

    // 3. Or let a view own the data and parameters
    let mut view = ChartView::new(ingested.frame, "btc_price", params).unwrap();
    view.refresh(now);
    println!("\nbtc_price z-score extent: {:?}", view.extent());
}
