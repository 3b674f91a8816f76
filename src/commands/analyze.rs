use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::Path;

use gemtrend::analytics::store::DATE_FORMAT;
use gemtrend::analytics::TrendReport;
use gemtrend::config::Config;
use gemtrend::models::RawObservation;
use gemtrend::refresh::{build_snapshot, Refresher, Snapshot, SnapshotHandle};
use gemtrend::source::{DateRange, NaverDataLabClient};

/// Run one live refresh and print the report
pub async fn refresh(config: &Config, date: Option<NaiveDate>, output: &str) -> Result<()> {
    let client = NaverDataLabClient::from_config(config)?;
    let refresher = Refresher::new(client, config.clone(), SnapshotHandle::new());

    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = refresher.refresh_once(today).await?;

    print_snapshot(&snapshot, output, None)
}

/// Build the report from a JSON dump of observations
pub fn analyze(
    config: &Config,
    input: &Path,
    output: &str,
    seasonal: Option<&str>,
) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let observations: Vec<RawObservation> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse observations: {}", input.display()))?;

    let range = observed_range(&observations)?.unwrap_or_else(|| {
        DateRange::lookback(Local::now().date_naive(), config.analytics.lookback_days)
    });
    let snapshot = build_snapshot(observations, range, config)?;

    print_snapshot(&snapshot, output, seasonal)
}

/// Earliest to latest parsable date in the dump
fn observed_range(observations: &[RawObservation]) -> Result<Option<DateRange>> {
    let dates: Vec<NaiveDate> = observations
        .iter()
        .filter_map(|o| NaiveDate::parse_from_str(o.date.trim(), DATE_FORMAT).ok())
        .collect();

    match (dates.iter().min(), dates.iter().max()) {
        (Some(&start), Some(&end)) => Ok(Some(DateRange::new(start, end)?)),
        _ => Ok(None),
    }
}

fn print_snapshot(snapshot: &Snapshot, output: &str, seasonal: Option<&str>) -> Result<()> {
    match output {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&snapshot.report)?);
        }
        _ => print_report(&snapshot.report, seasonal),
    }

    if !snapshot.duplicates.is_empty() {
        eprintln!(
            "Warning: {} duplicate observation(s) dropped",
            snapshot.duplicates.len()
        );
    }
    Ok(())
}

fn print_report(report: &TrendReport, seasonal: Option<&str>) {
    let as_of = report
        .as_of
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("Gemstone Trend Report (as of {as_of})");
    println!("=====================================");

    println!();
    println!("Top current search volume:");
    for (rank, row) in report.top_current.iter().enumerate() {
        println!("  {}. {:<12} {:>8.2}", rank + 1, row.entity, row.ratio);
    }

    println!();
    println!("Rising (7-day vs 28-day average, %):");
    if report.rising.is_empty() {
        println!("  (not enough history)");
    }
    for (rank, row) in report.rising.iter().enumerate() {
        println!("  {}. {:<12} {:>+8.2}", rank + 1, row.entity, row.rise_score);
    }

    println!();
    println!("Most stable (CV):");
    for row in &report.most_stable {
        println!(
            "  {:<12} mean {:>7.2}  std {:>7.2}  cv {:>5.2}",
            row.entity, row.mean, row.stdev, row.cv
        );
    }

    println!();
    println!("Most volatile (CV):");
    for row in &report.most_volatile {
        println!(
            "  {:<12} mean {:>7.2}  std {:>7.2}  cv {:>5.2}",
            row.entity, row.mean, row.stdev, row.cv
        );
    }

    println!();
    println!("Market share (latest):");
    for row in &report.market_share {
        println!("  {:<12} {:>6.2}%", row.entity, row.share_pct);
    }

    println!();
    println!(
        "{}: {} daily points",
        report.watched_entity,
        report.brand_series.len()
    );
    if let Some(last) = report.brand_series.last() {
        println!("  latest {} = {:.2}", last.date, last.ratio);
    }

    if let Some(entity) = seasonal {
        println!();
        println!("Monthly average for {entity}:");
        let months = report.seasonal_for(entity);
        if months.is_empty() {
            println!("  (no data)");
        }
        for month in months {
            println!("  {}  {:>8.2}", month.month, month.mean_ratio);
        }
    }
}
