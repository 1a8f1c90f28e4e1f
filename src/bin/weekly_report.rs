// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::Parser;

use runlog::config::DashboardConfig;
use runlog::dashboard::{DashboardService, HistoryPoint};
use runlog::format::format_minutes;
use runlog::logging;

#[derive(Parser, Debug)]
#[command(name = "weekly-report")]
#[command(about = "Print every week and month of a running log")]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Run log path or http(s) URL, overriding the config
    #[arg(short, long)]
    source: Option<String>,

    /// Only show the most recent weeks
    #[arg(short, long)]
    last: Option<usize>,

    /// Print the history as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_from_env()?;

    let mut config = DashboardConfig::load(cli.config).context("Failed to load configuration")?;
    if let Some(source) = cli.source {
        config.source = source;
    }

    let service = DashboardService::new(config)?;
    let today = chrono::Local::now().date_naive();
    let dashboard = service.load(today).await;

    if !dashboard.load_status.is_loaded() {
        eprintln!("⚠️  Run log not loaded: {:?}", dashboard.load_status);
    }

    let skip = cli
        .last
        .map(|last| dashboard.weekly_history.len().saturating_sub(last))
        .unwrap_or(0);
    let weeks = &dashboard.weekly_history[skip..];

    if cli.json {
        let report = serde_json::json!({
            "weeks": weeks,
            "months": dashboard.monthly_history,
            "summary": dashboard.summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_table("Week", weeks);
    println!();
    print_table("Month", &dashboard.monthly_history);

    let summary = dashboard.summary;
    println!(
        "\n{} rows, {} valid runs, {} excluded, {} without a readable date",
        summary.rows, summary.valid, summary.excluded, summary.unparseable_dates
    );

    Ok(())
}

fn print_table(title: &str, points: &[HistoryPoint]) {
    println!("{:<10} {:<9} {:>5} {:>10} {:>9}", title, "Period", "Runs", "Distance", "Time");
    println!("{}", "-".repeat(47));

    for point in points {
        println!(
            "{:<10} {:<9} {:>5} {:>7.2} km {:>9}",
            point.label,
            point.period,
            point.run_count,
            point.distance_km,
            format_minutes(point.total_minutes)
        );
    }

    let distance: f64 = points.iter().map(|p| p.distance_km).sum();
    let minutes: f64 = points.iter().map(|p| p.total_minutes).sum();
    println!("{}", "-".repeat(47));
    println!("{:<26} {:>7.2} km {:>9}", "Total", distance, format_minutes(minutes));
}
