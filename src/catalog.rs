use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::models::SourceRecord;

/// Loads the catalog written by the showtime scraper.
pub fn load(path: &Path) -> Result<Vec<SourceRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read catalog {}", path.display()))?;
    let records =
        parse(&contents).with_context(|| format!("invalid catalog {}", path.display()))?;
    tracing::info!(path = %path.display(), records = records.len(), "catalog loaded");
    Ok(records)
}

pub fn parse(contents: &str) -> Result<Vec<SourceRecord>> {
    serde_json::from_str(contents).context("catalog is not an array of showtime records")
}
