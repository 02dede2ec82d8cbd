//! Row extraction for headerless navigation CSV exports.
//!
//! Rows are `time,userID,username,county,screen,latency` with no header.
//! Parsing is best-effort: short rows and rows without a usable latency are
//! dropped, which also naturally skips an accidental header line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One normalized navigation/latency observation.
///
/// Field names match the JSON documents served by the static API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavRecord {
    pub time: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "Screen")]
    pub screen: String,
    #[serde(rename = "Latency")]
    pub latency: i64,
}

/// Coerces a raw latency field to integer milliseconds.
///
/// Trims whitespace and thousands-separator commas; empty, `NA` and `NULL`
/// (any case) are missing. Anything else is parsed as a float and truncated,
/// so `"3534"` and `"3534.0"` both coerce to 3534.
pub fn coerce_latency(raw: &str) -> Option<i64> {
    let s = raw.trim().replace(',', "");
    if s.is_empty() || s.eq_ignore_ascii_case("NA") || s.eq_ignore_ascii_case("NULL") {
        return None;
    }
    let value: f64 = s.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value as i64)
}

/// Parses navigation records out of raw CSV bytes.
///
/// A UTF-8 BOM at the start of the input is stripped. Rows with fewer than 6
/// fields are dropped; extra trailing fields are ignored. Row-level CSV
/// errors are skipped rather than surfaced.
pub fn parse_records(bytes: &[u8]) -> Vec<NavRecord> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf".as_slice()).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for result in reader.records() {
        let Ok(record) = result else { continue };
        if record.len() < 6 {
            continue;
        }

        // a header line has the literal word "latency" here and falls out
        let Some(latency) = coerce_latency(&record[5]) else {
            continue;
        };

        rows.push(NavRecord {
            time: record[0].trim().to_string(),
            user_id: record[1].trim().replace('#', ""),
            username: record[2].trim().to_string(),
            county: record[3].trim().to_uppercase(),
            screen: record[4].trim().to_string(),
            latency,
        });
    }

    rows
}

/// Reads and parses one navigation export file. An unreadable file is fatal.
pub fn read_nav_file(path: &Path) -> Result<Vec<NavRecord>> {
    let bytes =
        fs::read(path).with_context(|| format!("reading input file {}", path.display()))?;
    Ok(parse_records(&bytes))
}
