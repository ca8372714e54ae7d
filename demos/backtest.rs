//! Backtest example: typed rows, held positions and the metrics panel.
//!
//! Run with: cargo run --example backtest

use chartseries::backtest::{
    benchmark_series, panel, parse_backtest, parse_metrics, portfolio_series, position_counts,
    PanelItem,
};

const RESULTS: &str = "\
date,portfolio_value,benchmark_cum_return,ETH_cum_return,ETH_position,SOL_cum_return,SOL_position
2024-01-01,100.0,0.000,0.000,0,0.000,0
2024-01-02,101.2,0.004,0.010,1,0.020,0
2024-01-03,102.9,0.011,0.018,1,0.041,1
2024-01-04,101.7,0.006,0.007,0,0.030,1
2024-01-05,104.3,0.015,0.025,1,0.052,1
";

const METRICS: &str = "\
Metric,Value
Strategy,Large Cap Momentum
Start Date,2024-01-01 00:00:00
End Date,2024-01-05 00:00:00
Total Return,0.043
Annualized Return,0.81
Max Drawdown,-0.0117
Sharpe Ratio,2.4137
Number of Trades,6
Average Position Change,0.4
Benchmark Return,0.015
";

fn main() {
    println!("=== Backtest Summary ===\n");

    let records = parse_backtest(RESULTS.as_bytes(), &[]).unwrap();
    let portfolio = portfolio_series(&records).unwrap();
    let benchmark = benchmark_series(&records).unwrap();

    println!("{:>12} {:>10} {:>10}", "Date", "Portfolio", "Benchmark");
    for (p, b) in portfolio.observations().iter().zip(benchmark.observations()) {
        println!(
            "{:>12} {:>10.2} {:>10.2}",
            p.timestamp.date_naive(),
            p.value.unwrap_or(f64::NAN),
            b.value.unwrap_or(f64::NAN)
        );
    }

    println!("\nDays held per asset:");
    for (asset, days) in position_counts(&records) {
        println!("  {asset}: {days}");
    }

    println!("\n--- Metrics ---");
    let rows = parse_metrics(METRICS.as_bytes()).unwrap();
    for item in panel(&rows, "Bitcoin") {
        match item {
            PanelItem::Metric { name, text } => println!("{name:>26}: {text}"),
            PanelItem::Label { left, right } => println!("\n{left:>26}  {right}"),
            PanelItem::Divider => println!("{:-<40}", ""),
        }
    }
}
