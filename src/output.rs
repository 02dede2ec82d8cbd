//! JSON materialization helpers for the static API tree.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Path label for a county value: the normalized county, or `UNKNOWN` when
/// the record set carries an empty county.
pub fn county_label(county: &str) -> &str {
    if county.is_empty() { "UNKNOWN" } else { county }
}

/// Serializes `value` as 2-space-indented JSON and writes it to `path`,
/// creating parent directories as needed. Overwrites any existing file.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body)
        .with_context(|| format!("writing output file {}", path.display()))?;

    debug!(path = %path.display(), "Wrote JSON document");
    Ok(())
}
