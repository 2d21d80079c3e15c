//! Filesystem report sink.
//!
//! Reports are written all-or-nothing: the text goes to a temp file in
//! the target directory first and is renamed into place. A failed write
//! leaves no partial report behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use qadrill_core::report::DrillReport;
use qadrill_core::traits::ReportSink;

/// Filename prefix for all drill reports.
pub const REPORT_PREFIX: &str = "drill_report";

/// Build the storage filename for a report:
/// `drill_report_{respondent-local-part}_{YYYYmmdd_HHMMSS}.txt`.
///
/// The local part is slugged so a hostile respondent string cannot
/// steer the file outside the reports directory.
pub fn report_filename(respondent: &str, generated_at: DateTime<Utc>) -> String {
    // Strip the mail domain; "anonymous" has none and passes through.
    let local_part = respondent.split('@').next().unwrap_or(respondent);
    let slug: String = local_part
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '.' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!(
        "{REPORT_PREFIX}_{slug}_{}.txt",
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Report sink writing into a single directory.
pub struct FsReportSink {
    dir: PathBuf,
}

impl FsReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render and persist a report, returning the saved path.
    pub fn save_report(&self, report: &DrillReport) -> Result<String> {
        let filename = report_filename(&report.respondent, report.generated_at);
        self.save(&filename, &report.render())
    }
}

impl ReportSink for FsReportSink {
    fn save(&self, filename: &str, contents: &str) -> Result<String> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("report not saved: cannot create {}", self.dir.display()))?;

        let path = self.dir.join(filename);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .context("report not saved: cannot create temp file")?;
        tmp.write_all(contents.as_bytes())
            .context("report not saved: write failed")?;
        tmp.persist(&path)
            .with_context(|| format!("report not saved: cannot move into {}", path.display()))?;

        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qadrill_core::report::aggregate;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn filename_strips_mail_domain() {
        assert_eq!(
            report_filename("taro@example.com", fixed_time()),
            "drill_report_taro_20250601_093000.txt"
        );
        assert_eq!(
            report_filename("anonymous", fixed_time()),
            "drill_report_anonymous_20250601_093000.txt"
        );
    }

    #[test]
    fn filename_slugs_path_separators() {
        assert_eq!(
            report_filename("../escape@example.com", fixed_time()),
            "drill_report___escape_20250601_093000.txt"
        );
        assert_eq!(
            report_filename("a/b\\c@example.com", fixed_time()),
            "drill_report_a_b_c_20250601_093000.txt"
        );
    }

    #[test]
    fn hostile_respondent_stays_inside_reports_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path().join("reports"));

        let report =
            aggregate(&[], vec![], Some("../../escape@example.com"), fixed_time()).unwrap();
        let path = sink.save_report(&report).unwrap();

        assert!(PathBuf::from(&path).starts_with(dir.path().join("reports")));
        // Nothing landed beside the reports directory
        let strays: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(strays, vec![std::ffi::OsString::from("reports")]);
    }

    #[test]
    fn save_writes_contents_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());

        let path = sink.save("drill_report_x_1.txt", "report body\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "report body\n");
        // No temp file left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn save_report_derives_filename_from_respondent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path().join("reports"));

        let report = aggregate(&[], vec![], Some("hanako@example.com"), fixed_time()).unwrap();
        let path = sink.save_report(&report).unwrap();

        assert!(path.ends_with("drill_report_hanako_20250601_093000.txt"));
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, report.render());
    }

    #[test]
    fn unwritable_directory_is_report_not_saved() {
        let sink = FsReportSink::new("/proc/no-such-place");
        let err = sink.save("f.txt", "x").unwrap_err();
        assert!(err.to_string().contains("report not saved"));
    }
}
