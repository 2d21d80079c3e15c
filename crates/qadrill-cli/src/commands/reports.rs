//! The `qadrill reports` command.

use std::path::PathBuf;

use anyhow::Result;

use qadrill_providers::config::load_config_from;
use qadrill_report::{list_reports, read_report};

pub fn execute(latest: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let reports = list_reports(&config.reports_dir)?;

    if reports.is_empty() {
        println!("No saved reports in {}", config.reports_dir.display());
        return Ok(());
    }

    if latest {
        // Download path: the newest report, verbatim.
        print!("{}", read_report(&reports[0].path)?);
        return Ok(());
    }

    for report in &reports {
        println!(
            "{}  {}  {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S"),
            report.respondent,
            report.path.display()
        );
    }

    Ok(())
}
