// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::info;

use runlog::config::{AnchorMode, DashboardConfig, FallbackMode};
use runlog::dashboard::{Dashboard, DashboardService};
use runlog::logging::LoggingConfig;
use runlog::source::LoadStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "runlog", author, version, about = "Weekly and monthly statistics from a running log CSV")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Run log path or http(s) URL, overriding the config
    #[arg(short, long)]
    source: Option<String>,

    /// Evaluate as of this day (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Weekly distance goal in kilometers
    #[arg(short, long)]
    goal: Option<f64>,

    /// Measure current periods up to today or up to the latest run
    #[arg(long)]
    anchor: Option<AnchorMode>,

    /// Use the bundled sample log when the source cannot be read
    #[arg(long)]
    sample_fallback: bool,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, mut config: DashboardConfig) -> Result<DashboardConfig> {
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(goal) = self.goal {
            config.weekly_goal_km = goal;
        }
        if let Some(anchor) = self.anchor {
            config.anchor = anchor;
        }
        if self.sample_fallback {
            config.fallback = FallbackMode::Sample;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().verbose(args.verbose).init()?;

    let config = DashboardConfig::load(args.config.clone()).context("Failed to load configuration")?;
    let config = args.apply(config)?;
    let today = args.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    let service = DashboardService::new(config)?;
    let config = service.config();
    info!(source = %config.source, %today, anchor = %config.anchor, "Building dashboard");

    let dashboard = service.load(today).await;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
        OutputFormat::Text => print!("{}", render_text(&dashboard)),
    }

    Ok(())
}

fn render_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    match &dashboard.load_status {
        LoadStatus::Loaded { source, .. } => out.push_str(&format!("Run log: {source}\n")),
        LoadStatus::Fallback { reason } => {
            out.push_str(&format!("Could not load run log ({reason}); showing sample data\n"))
        }
        LoadStatus::Failed { reason } => out.push_str(&format!("Could not load run log: {reason}\n")),
    }
    if let Some(updated) = &dashboard.last_updated {
        out.push_str(&format!("Last updated: {updated}\n"));
    }
    out.push_str(&format!("As of: {} ({})\n\n", dashboard.reference_date, dashboard.anchor));

    out.push_str(&format!(
        "This week:  {:.2} km in {} ({} runs)\n",
        dashboard.current_week.total_distance_km, dashboard.current_week_time, dashboard.current_week.run_count
    ));
    out.push_str(&format!(
        "This month: {:.2} km ({} runs)\n",
        dashboard.current_month.total_distance_km, dashboard.current_month.run_count
    ));
    out.push_str(&format!(
        "Goal:       {:.2} / {:.2} km ({:.0}%)\n\n",
        dashboard.goal.distance_km, dashboard.goal.goal_km, dashboard.goal.percent
    ));

    out.push_str("Daily\n");
    for day in &dashboard.daily {
        out.push_str(&format!("  {} {:>8.2} km\n", day.day, day.distance_km));
    }

    out.push_str("\nRecent weeks\n");
    for week in &dashboard.rolling_weeks {
        out.push_str(&format!(
            "  {:<7} {} {:>8.2} km\n",
            week.label, week.week_start, week.distance_km
        ));
    }

    if !dashboard.recent_runs.is_empty() {
        out.push_str("\nRecent runs\n");
        for run in &dashboard.recent_runs {
            out.push_str(&format!(
                "  {:<12} {:>7.2} km  {:<10} {:<9} HR {:<4} RPE {:<3} {}\n",
                run.date, run.distance_km, run.duration, run.pace, run.avg_heart_rate, run.rpe, run.notes
            ));
        }
    }

    out
}
