//! Source discovery for navigation export files.
//!
//! Finds per-day `userRecord.NAVIGATION.csv` exports in a data directory and
//! derives each file's calendar day from the leading date token in its name.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An input file matched by discovery, paired with the day it covers.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub day: NaiveDate,
}

/// Returns true for per-row navigation exports. The `TOTAL` variant files
/// that can share the directory are always rejected.
pub fn is_navigation_export(name: &str) -> bool {
    name.ends_with("userRecord.NAVIGATION.csv") && !name.contains("TOTAL")
}

/// Parses the day a file covers from its leading date token.
///
/// Accepts `YYMMDD` (assumed 2000s) or `YYYYMMDD` at the start of the name,
/// e.g. `250407.userRecord.NAVIGATION.csv` -> 2025-04-07. Returns `None` if
/// the leading digit run has any other length or does not form a valid
/// calendar date.
pub fn parse_day_from_name(name: &str) -> Option<NaiveDate> {
    let token: String = name
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(8)
        .collect();

    let full = match token.len() {
        6 => format!("20{token}"),
        8 => token,
        _ => return None,
    };

    let year = full[0..4].parse().ok()?;
    let month = full[4..6].parse().ok()?;
    let day = full[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Lists `data_dir` and returns the matching navigation exports sorted by
/// path. Files without a usable date token are skipped entirely; an
/// unreadable directory is fatal.
pub fn discover_sources(data_dir: &Path) -> Result<Vec<SourceFile>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("reading data directory {}", data_dir.display()))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if !is_navigation_export(&name) {
            continue;
        }

        match parse_day_from_name(&name) {
            Some(day) => sources.push(SourceFile {
                path: entry.path(),
                day,
            }),
            None => {
                debug!(file = %name, "no usable date token in filename, skipping");
            }
        }
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sources)
}
