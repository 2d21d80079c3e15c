//! Report aggregation: folds per-question verdicts into one rendered,
//! persistable grading report.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{MatchKind, Question, Verdict};

/// Respondent shown when nobody is logged in.
pub const ANONYMOUS_RESPONDENT: &str = "anonymous";

/// One question paired with its grading verdict, in original order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub question: Question,
    pub verdict: Verdict,
}

/// The aggregated result of one complete grading pass.
///
/// Write-once: it is rendered, persisted, and optionally re-read for
/// download, but never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillReport {
    /// Unique identifier for this grading pass.
    pub id: Uuid,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The authenticated respondent, or [`ANONYMOUS_RESPONDENT`].
    pub respondent: String,
    /// Questions answered correctly by verbatim comparison.
    pub exact: usize,
    /// Questions accepted by the semantic judge.
    pub semantic: usize,
    /// Everything else.
    pub incorrect: usize,
    /// Per-question detail, in original question order.
    pub entries: Vec<ReportEntry>,
}

/// Fold per-question verdicts into a report.
///
/// `questions` and `verdicts` must be order-paired and of equal length;
/// a mismatch is an invariant violation, not a grading outcome.
pub fn aggregate(
    questions: &[Question],
    verdicts: Vec<Verdict>,
    respondent: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Result<DrillReport> {
    anyhow::ensure!(
        questions.len() == verdicts.len(),
        "question/verdict count mismatch: {} questions, {} verdicts",
        questions.len(),
        verdicts.len()
    );

    let mut exact = 0;
    let mut semantic = 0;
    let mut incorrect = 0;
    for verdict in &verdicts {
        match verdict.kind {
            MatchKind::Exact => exact += 1,
            MatchKind::Semantic => semantic += 1,
            MatchKind::Incorrect => incorrect += 1,
        }
    }

    let entries = questions
        .iter()
        .cloned()
        .zip(verdicts)
        .map(|(question, verdict)| ReportEntry { question, verdict })
        .collect();

    Ok(DrillReport {
        id: Uuid::new_v4(),
        generated_at,
        respondent: respondent.unwrap_or(ANONYMOUS_RESPONDENT).to_string(),
        exact,
        semantic,
        incorrect,
        entries,
    })
}

impl DrillReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Render the full report text. Deterministic for identical inputs
    /// and an identical `generated_at`.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("QA drill grading report\n");
        out.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Respondent: {}\n\n", self.respondent));

        out.push_str("=== Summary ===\n");
        out.push_str(&format!("Correct (exact match): {}\n", self.exact));
        out.push_str(&format!("Correct (semantic match): {}\n", self.semantic));
        out.push_str(&format!("Incorrect: {}\n\n", self.incorrect));

        self.render_bucket(&mut out, "=== Semantic matches ===", MatchKind::Semantic);
        self.render_bucket(&mut out, "=== Incorrect ===", MatchKind::Incorrect);

        out.push_str("=== Details ===\n");
        for (i, entry) in self.entries.iter().enumerate() {
            let q = &entry.question;
            let v = &entry.verdict;
            out.push_str(&format!("Question {}: {}\n", i + 1, q.text));
            out.push_str(&format!("Reference: {} (page {})\n", q.ref_number, q.ref_page));
            out.push_str(&format!("Category: {}\n", q.category));
            out.push_str(&format!(
                "Result: {}\n",
                if v.is_correct() { "correct" } else { "incorrect" }
            ));
            out.push_str("Answers:\n");
            for (j, answer) in v.submitted.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", j + 1, answer));
                out.push_str(&format!("     {}\n", slot_annotation(q, v, j)));
            }
            out.push('\n');
        }

        out
    }

    fn render_bucket(&self, out: &mut String, header: &str, kind: MatchKind) {
        let picked: Vec<(usize, &ReportEntry)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.verdict.kind == kind)
            .collect();
        if picked.is_empty() {
            return;
        }

        out.push_str(header);
        out.push_str("\n\n");
        for (i, entry) in picked {
            out.push_str(&format!("Question {}: {}\n", i + 1, entry.question.text));
            out.push_str(&format!("Submitted: {}\n", entry.verdict.submitted.join(", ")));
            out.push_str(&format!(
                "Expected: {}\n\n",
                entry.question.correct_answers.join(", ")
            ));
        }
    }
}

/// Per-slot annotation for the detail section. Informational only: it
/// re-derives from index-wise comparison and the question-level verdict,
/// it does not redefine the verdict.
fn slot_annotation(question: &Question, verdict: &Verdict, slot: usize) -> &'static str {
    let exact_here = question
        .correct_answers
        .get(slot)
        .is_some_and(|correct| verdict.submitted.get(slot) == Some(correct));

    if exact_here {
        "exact match"
    } else if verdict.kind == MatchKind::Semantic {
        "semantic match"
    } else {
        "no match"
    }
}
