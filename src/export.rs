//! Summary export: delimited text and JSON documents.

use crate::session::RoastSummary;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render a summary as delimited text: header lines as `field,value` pairs,
/// a blank separator, then one `elapsed_seconds,temperature` line per series
/// point.
pub fn summary_csv(summary: &RoastSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "bean,{}", summary.bean_name);
    let _ = writeln!(out, "unit,{}", summary.unit);
    let _ = writeln!(out, "charge_temperature,{}", summary.charge_temperature);
    let _ = writeln!(out, "final_temperature,{}", summary.final_temperature);
    let _ = writeln!(out, "min_temperature,{}", summary.min_temperature);
    let _ = writeln!(out, "max_temperature,{}", summary.max_temperature);
    let _ = writeln!(out, "total_elapsed_seconds,{}", summary.total_elapsed_seconds);
    let _ = writeln!(
        out,
        "first_crack_elapsed_seconds,{}",
        summary
            .first_crack_elapsed_seconds
            .map(|s| s.to_string())
            .unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "development_time_ratio,{:.1}",
        summary.development_time_ratio
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "elapsed_seconds,temperature");
    for point in &summary.series {
        let _ = writeln!(out, "{},{}", point.elapsed_seconds, point.temperature);
    }

    out
}

/// Render a summary as a pretty-printed JSON document.
pub fn summary_json(summary: &RoastSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("Failed to serialize summary")
}

/// Write both export formats next to each other, named after the session.
///
/// Returns the CSV and JSON paths.
pub fn write_exports(
    summary: &RoastSummary,
    session_id: &str,
    output_dir: impl AsRef<Path>,
) -> Result<(PathBuf, PathBuf)> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create export directory: {:?}", output_dir))?;

    let csv_path = output_dir.join(format!("{session_id}.csv"));
    fs::write(&csv_path, summary_csv(summary))
        .with_context(|| format!("Failed to write CSV export: {:?}", csv_path))?;

    let json_path = output_dir.join(format!("{session_id}.json"));
    fs::write(&json_path, summary_json(summary)?)
        .with_context(|| format!("Failed to write JSON export: {:?}", json_path))?;

    info!(
        "Summary exported: {} and {}",
        csv_path.display(),
        json_path.display()
    );

    Ok((csv_path, json_path))
}
