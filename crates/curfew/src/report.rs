//! Usage report rendering

use anyhow::{Context, Result};
use chrono::Datelike;
use curfew_api::DailySeries;
use curfew_core::DailyAggregator;
use curfew_store::UsageStore;
use curfew_util::{UserId, format_minutes, weekday_label};
use serde::Serialize;
use std::sync::Arc;

use crate::OutputFormat;

const BAR_WIDTH: u32 = 40;

#[derive(Serialize)]
struct JsonReport<'a> {
    user: &'a UserId,
    total_minutes: u64,
    days: &'a DailySeries,
}

pub fn print_report(store: Arc<dyn UsageStore>, user: &UserId, format: OutputFormat) -> Result<()> {
    let series = DailyAggregator::new(store)
        .build_series(user)
        .with_context(|| format!("Failed to read usage for {}", user))?;

    let output = match format {
        OutputFormat::Text => render_text(user, &series),
        OutputFormat::Json => render_json(user, &series)?,
    };

    println!("{}", output);
    Ok(())
}

fn render_json(user: &UserId, series: &DailySeries) -> Result<String> {
    let report = JsonReport {
        user,
        total_minutes: series.total_minutes(),
        days: series,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

fn render_text(user: &UserId, series: &DailySeries) -> String {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return format!("No usage recorded for {}", user);
    };

    let peak = series.peak_minutes().max(1);
    let mut lines = vec![format!("Usage for {} ({} to {})", user, first, last)];

    lines.extend(series.iter().map(|(day, minutes)| {
        let bar = "#".repeat((minutes * BAR_WIDTH / peak) as usize);
        format!(
            "{} {} {:>8}  {}",
            day,
            weekday_label(day.weekday()),
            format_minutes(minutes),
            bar
        )
    }));

    lines.push(format!(
        "Total: {} over {} days",
        format_minutes(series.total_minutes().min(u32::MAX as u64) as u32),
        series.len()
    ));
    lines.join("\n")
}
