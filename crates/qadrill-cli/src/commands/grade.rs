//! The `qadrill grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use qadrill_core::engine::{DrillEngine, ProgressReporter};
use qadrill_core::judge::{FixedJudge, LlmJudge, SemanticJudge};
use qadrill_core::model::Verdict;
use qadrill_core::parser;
use qadrill_core::report::DrillReport;
use qadrill_providers::config::load_config_from;
use qadrill_report::FsReportSink;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_question_start(&self, index: usize, ref_number: &str) {
        eprintln!("  Grading question {} [{ref_number}]...", index + 1);
    }

    fn on_question_graded(&self, index: usize, verdict: &Verdict) {
        let icon = if verdict.is_correct() { "OK" } else { "NG" };
        eprintln!("  Question {}: {icon} ({})", index + 1, verdict.message);
    }

    fn on_pass_complete(&self, total: usize, correct: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {correct}/{total} correct ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    questions_path: PathBuf,
    answers_path: PathBuf,
    email: String,
    model_override: Option<String>,
    exact_only: bool,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    super::login(&config, &email)?;

    let set = parser::parse_question_set(&questions_path)
        .context("drill unavailable: question set could not be loaded")?;
    let answer_sets = parser::parse_answer_file(&answers_path)?;

    let judge: Arc<dyn SemanticJudge> = if exact_only {
        // Degraded mode: every semantic judgment is a non-match.
        Arc::new(FixedJudge(false))
    } else {
        let (model, client) = super::select_backend(&config, model_override.as_deref())?;
        Arc::new(LlmJudge::new(client, model))
    };

    eprintln!(
        "qadrill v0.1.0 — grading {} questions from '{}'\n",
        set.questions.len(),
        set.name
    );

    let engine = DrillEngine::new(judge);
    let report = engine
        .run(&set, &answer_sets, Some(&email), &ConsoleReporter)
        .await?;

    print_summary(&report);

    let sink = FsReportSink::new(output.unwrap_or_else(|| config.reports_dir.clone()));
    let saved_path = sink.save_report(&report)?;
    println!("Report saved to: {saved_path}");

    Ok(())
}

fn print_summary(report: &DrillReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Result", "Count"]);
    table.add_row(vec![Cell::new("Correct (exact match)"), Cell::new(report.exact)]);
    table.add_row(vec![
        Cell::new("Correct (semantic match)"),
        Cell::new(report.semantic),
    ]);
    table.add_row(vec![Cell::new("Incorrect"), Cell::new(report.incorrect)]);
    table.add_row(vec![Cell::new("Total"), Cell::new(report.total())]);

    println!("\n{table}");
}
