//! Text, CSV and JSON output for an annotated series and its summary.

use chrono::NaiveDate;
use quotedash_core::domain::{PriceSeries, SeriesSummary};
use serde::Serialize;
use std::io::{self, Write};

/// `$123.45`, or `unavailable` for a metric the series is too short for.
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => "unavailable".to_string(),
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

/// Last `rows` bars as a fixed-width table.
pub fn write_table<W: Write>(out: &mut W, series: &PriceSeries, rows: usize) -> io::Result<()> {
    writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10} {:>10}",
        "Date", "Open", "High", "Low", "Close", "Volume", "MA20", "MA50"
    )?;
    writeln!(out, "{}", "-".repeat(90))?;
    for row in series.tail(rows) {
        let bar = row.bar;
        let volume = bar
            .volume
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12} {:>10} {:>10}",
            bar.date.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            volume,
            cell(row.ma20),
            cell(row.ma50),
        )?;
    }
    Ok(())
}

/// The three key statistics.
pub fn write_summary<W: Write>(out: &mut W, summary: &SeriesSummary) -> io::Result<()> {
    writeln!(out, "Key Statistics ({})", summary.latest_date)?;
    writeln!(out, "  Latest Close: {}", format_price(Some(summary.latest_close)))?;
    writeln!(out, "  20-day Avg:   {}", format_price(summary.latest_ma20))?;
    writeln!(out, "  50-day Avg:   {}", format_price(summary.latest_ma50))?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<u64>,
    ma20: Option<f64>,
    ma50: Option<f64>,
}

/// Full annotated series as CSV; missing values are empty cells.
pub fn write_csv<W: Write>(out: W, series: &PriceSeries) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for row in series.rows() {
        writer.serialize(CsvRow {
            date: row.bar.date,
            open: row.bar.open,
            high: row.bar.high,
            low: row.bar.low,
            close: row.bar.close,
            volume: row.bar.volume,
            ma20: row.ma20,
            ma50: row.ma50,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a SeriesSummary,
    series: &'a PriceSeries,
}

pub fn write_json<W: Write>(
    out: W,
    series: &PriceSeries,
    summary: &SeriesSummary,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(out, &Report { summary, series })
}
