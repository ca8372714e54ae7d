//! Rolling window example: how the two eviction policies treat gaps.
//!
//! Run with: cargo run --example window

use chartseries::transform::{rolling_mean, rolling_z_score, EvictionPolicy};

fn fmt(v: Option<f64>) -> String {
    v.map_or_else(|| "None".to_string(), |x| format!("{x:.2}"))
}

fn main() {
    println!("=== Rolling Windows With Gaps ===\n");

    let series = vec![
        Some(10.0),
        Some(20.0),
        Some(30.0),
        Some(40.0),
        None,
        Some(50.0),
        None,
        None,
        Some(35.0),
        Some(45.0),
    ];

    let ma_count = rolling_mean(&series, 3, EvictionPolicy::CountBased);
    let ma_pos = rolling_mean(&series, 3, EvictionPolicy::Positional);
    let z_count = rolling_z_score(&series, 3, EvictionPolicy::CountBased);
    let z_pos = rolling_z_score(&series, 3, EvictionPolicy::Positional);

    println!(
        "{:>5} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "Index", "Value", "MA count", "MA pos", "Z count", "Z pos"
    );
    println!("{:-<58}", "");

    for i in 0..series.len() {
        println!(
            "{:>5} {:>8} {:>10} {:>10} {:>10} {:>10}",
            i,
            fmt(series[i]),
            fmt(ma_count[i]),
            fmt(ma_pos[i]),
            fmt(z_count[i]),
            fmt(z_pos[i]),
        );
    }

    println!("\nCount-based windows reach back across gaps for the last 3 valid points.");
    println!("Positional windows only see the last 3 positions, so gaps leave them short.");
}
