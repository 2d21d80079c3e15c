//! Listing and re-reading saved reports.
//!
//! Reports accumulate, one timestamped file per grading pass; the newest
//! is what a respondent typically downloads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::sink::REPORT_PREFIX;

/// A saved report discovered on disk.
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub path: PathBuf,
    /// Respondent local part parsed from the filename.
    pub respondent: String,
    /// Generation time parsed from the filename.
    pub generated_at: NaiveDateTime,
}

/// Parse `drill_report_{respondent}_{YYYYmmdd_HHMMSS}.txt`.
fn parse_filename(name: &str) -> Option<(String, NaiveDateTime)> {
    let rest = name
        .strip_prefix(REPORT_PREFIX)?
        .strip_prefix('_')?
        .strip_suffix(".txt")?;
    // Timestamp is the last two underscore-separated segments.
    let mut parts: Vec<&str> = rest.rsplitn(3, '_').collect();
    if parts.len() != 3 {
        return None;
    }
    parts.reverse();
    let respondent = parts[0].to_string();
    let stamp = format!("{}_{}", parts[1], parts[2]);
    let generated_at = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d_%H%M%S").ok()?;
    Some((respondent, generated_at))
}

/// List saved reports in `dir`, newest first. Files that do not match
/// the report naming scheme are ignored.
pub fn list_reports(dir: &Path) -> Result<Vec<SavedReport>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read reports directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some((respondent, generated_at)) = parse_filename(name) {
            reports.push(SavedReport {
                path,
                respondent,
                generated_at,
            });
        }
    }

    reports.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
    Ok(reports)
}

/// Read a saved report back verbatim for download.
pub fn read_report(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report: {}", path.display()))
}
