//! Pipeline orchestration: discovery, extraction, aggregation, and
//! materialization of the static JSON tree.
//!
//! Output layout under the out root:
//!
//! ```text
//! summary.json                     all-time aggregate
//! byCounty/{COUNTY}.json           all-time top records per county
//! days.json                        index of covered days
//! days/{day}/summary.json          per-day aggregate
//! days/{day}/byCounty/{COUNTY}.json
//! trends/summary_by_day.json       per-day summaries ordered by day
//! ```

use crate::discover::discover_sources;
use crate::output::{county_label, write_json};
use crate::parser::{NavRecord, read_nav_file};
use crate::stats::{Summary, TrendPoint, group_by_county, summarize, top_by_latency};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default cap on per-county record listings, applied independently at every
/// scope to keep the served JSON small.
pub const TOP_N_PER_COUNTY: usize = 200;

/// What one build run processed, for the final log line.
#[derive(Debug)]
pub struct BuildReport {
    pub files: usize,
    pub records: usize,
    pub days: Vec<String>,
}

#[derive(Serialize)]
struct DayIndex {
    days: Vec<String>,
}

/// Runs the full build: reads navigation exports from `data_dir` and writes
/// the JSON document tree under `out_root`.
///
/// Per-day documents are written as each file is processed; the all-time
/// summary, all-time county listings, and the trend document are only
/// written when at least one record was extracted overall. The day index is
/// always written, and registers a day for every matched filename even if
/// none of its rows survived extraction.
pub fn build(data_dir: &Path, out_root: &Path, top_n: usize) -> Result<BuildReport> {
    fs::create_dir_all(out_root)
        .with_context(|| format!("creating output root {}", out_root.display()))?;

    let sources = discover_sources(data_dir)?;
    info!(files = sources.len(), data_dir = %data_dir.display(), "Discovered navigation exports");

    let mut days: BTreeSet<String> = BTreeSet::new();
    let mut all_rows: Vec<NavRecord> = Vec::new();

    for source in &sources {
        let day = source.day.format("%Y-%m-%d").to_string();
        if !days.insert(day.clone()) {
            warn!(day, path = %source.path.display(), "Duplicate day token, earlier output for this day is overwritten");
        }

        let rows = read_nav_file(&source.path)?;
        debug!(day, rows = rows.len(), path = %source.path.display(), "Extracted records");

        write_day_documents(out_root, &day, &rows, top_n)?;
        all_rows.extend(rows);
    }

    let days: Vec<String> = days.into_iter().collect();
    write_json(&out_root.join("days.json"), &DayIndex { days: days.clone() })?;

    if !all_rows.is_empty() {
        write_alltime_documents(out_root, &all_rows, top_n)?;
        write_trends(out_root, &days)?;
    } else {
        info!("No records extracted, skipping all-time and trend documents");
    }

    Ok(BuildReport {
        files: sources.len(),
        records: all_rows.len(),
        days,
    })
}

/// Runs [`build`] with the default per-county cap.
pub fn build_default(data_dir: &Path, out_root: &Path) -> Result<BuildReport> {
    build(data_dir, out_root, TOP_N_PER_COUNTY)
}

fn write_day_documents(out_root: &Path, day: &str, rows: &[NavRecord], top_n: usize) -> Result<()> {
    let day_root = out_root.join("days").join(day);
    write_json(&day_root.join("summary.json"), &summarize(rows))?;

    for (county, group) in group_by_county(rows) {
        let top = top_by_latency(group, top_n);
        let path = day_root
            .join("byCounty")
            .join(format!("{}.json", county_label(&county)));
        write_json(&path, &top)?;
    }

    Ok(())
}

fn write_alltime_documents(out_root: &Path, rows: &[NavRecord], top_n: usize) -> Result<()> {
    write_json(&out_root.join("summary.json"), &summarize(rows))?;

    for (county, group) in group_by_county(rows) {
        let top = top_by_latency(group, top_n);
        let path = out_root
            .join("byCounty")
            .join(format!("{}.json", county_label(&county)));
        write_json(&path, &top)?;
    }

    Ok(())
}

/// Assembles the trend list by re-reading each day's just-written summary,
/// so no per-day summary has to be retained in memory across the run.
fn write_trends(out_root: &Path, days: &[String]) -> Result<()> {
    let mut trend = Vec::with_capacity(days.len());

    for day in days {
        let path = out_root.join("days").join(day).join("summary.json");
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading day summary {}", path.display()))?;
        let summary: Summary = serde_json::from_str(&text)
            .with_context(|| format!("decoding day summary {}", path.display()))?;
        trend.push(TrendPoint::from_summary(day, &summary));
    }

    write_json(&out_root.join("trends").join("summary_by_day.json"), &trend)
}
