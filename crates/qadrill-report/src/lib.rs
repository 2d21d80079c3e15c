//! qadrill-report — Durable report storage.
//!
//! Writes rendered drill reports to timestamped files and lists them
//! back for download. Every grading pass creates a new file; nothing is
//! ever overwritten.

pub mod history;
pub mod sink;

pub use history::{list_reports, read_report, SavedReport};
pub use sink::{report_filename, FsReportSink, REPORT_PREFIX};
