//! The drill engine: one full grading pass over a question set.
//!
//! Grading is strictly sequential. There is exactly one active pass per
//! respondent session, each question is checked in presentation order,
//! and every semantic judgment is awaited before the next begins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::checker::check;
use crate::judge::SemanticJudge;
use crate::model::{QuestionSet, Verdict};
use crate::report::{aggregate, DrillReport};

/// Progress reporting for a grading pass.
pub trait ProgressReporter: Send + Sync {
    fn on_question_start(&self, index: usize, ref_number: &str);
    fn on_question_graded(&self, index: usize, verdict: &Verdict);
    fn on_pass_complete(&self, total: usize, correct: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_question_start(&self, _: usize, _: &str) {}
    fn on_question_graded(&self, _: usize, _: &Verdict) {}
    fn on_pass_complete(&self, _: usize, _: usize, _: Duration) {}
}

/// Runs grading passes against a fixed semantic judge.
pub struct DrillEngine {
    judge: Arc<dyn SemanticJudge>,
}

impl DrillEngine {
    pub fn new(judge: Arc<dyn SemanticJudge>) -> Self {
        Self { judge }
    }

    /// Grade every question in `set` against the parallel `answer_sets`
    /// and aggregate the verdicts into a report.
    ///
    /// Answer sets beyond the question count are ignored; missing trailing
    /// sets grade as empty submissions (wrong answer count).
    pub async fn run(
        &self,
        set: &QuestionSet,
        answer_sets: &[Vec<String>],
        respondent: Option<&str>,
        progress: &dyn ProgressReporter,
    ) -> Result<DrillReport> {
        let start = Instant::now();
        let empty: Vec<String> = Vec::new();

        let mut verdicts = Vec::with_capacity(set.questions.len());
        for (i, question) in set.questions.iter().enumerate() {
            progress.on_question_start(i, &question.ref_number);

            let submitted = answer_sets.get(i).unwrap_or(&empty);
            let verdict = check(question, submitted, self.judge.as_ref()).await;

            progress.on_question_graded(i, &verdict);
            verdicts.push(verdict);
        }

        let correct = verdicts.iter().filter(|v| v.is_correct()).count();
        progress.on_pass_complete(set.questions.len(), correct, start.elapsed());

        aggregate(&set.questions, verdicts, respondent, chrono::Utc::now())
    }
}
