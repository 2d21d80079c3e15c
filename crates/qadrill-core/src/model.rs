//! Core data model types for qadrill.
//!
//! These are the fundamental types that the entire qadrill system uses to
//! represent drill questions, grading verdicts, and question sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single drill question with its multi-part answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Section locator in the reference material (e.g. "1.3.1").
    pub ref_number: String,
    /// Page locator in the reference material (e.g. "29" or "2-4").
    pub ref_page: String,
    /// Category label shown in reports.
    pub category: String,
    /// The free-text prompt shown to the respondent.
    pub text: String,
    /// How many answer slots the respondent must fill in.
    pub answer_count: usize,
    /// The answer key. Exactly `answer_count` entries; order is not
    /// significant for matching but slot indices are kept for reporting.
    pub correct_answers: Vec<String>,
    /// Optional guidance passed to the semantic judge.
    #[serde(default)]
    pub evaluation_criteria: Option<String>,
}

/// An ordered collection of drill questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Unique identifier for this question set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this question set.
    #[serde(default)]
    pub description: String,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// How a graded question matched the answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Verbatim string equality after order-independent sorting.
    Exact,
    /// The semantic judge deemed every answer pair equivalent.
    Semantic,
    /// Wrong answer count, or at least one pair failed both stages.
    Incorrect,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "exact"),
            MatchKind::Semantic => write!(f, "semantic"),
            MatchKind::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// The outcome of grading one question against one submitted answer set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Which stage (if any) accepted the submission.
    pub kind: MatchKind,
    /// Human-readable grading message.
    pub message: String,
    /// The submitted answers, echoed for the report.
    pub submitted: Vec<String>,
}

impl Verdict {
    /// All answers matched verbatim (order-independent).
    pub fn exact(submitted: Vec<String>) -> Self {
        Self {
            kind: MatchKind::Exact,
            message: "exact match".into(),
            submitted,
        }
    }

    /// All answer pairs were judged semantically equivalent.
    pub fn semantic(submitted: Vec<String>) -> Self {
        Self {
            kind: MatchKind::Semantic,
            message: "semantic match".into(),
            submitted,
        }
    }

    /// The submission did not fill exactly `answer_count` slots.
    pub fn wrong_count(submitted: Vec<String>) -> Self {
        Self {
            kind: MatchKind::Incorrect,
            message: "incorrect answer count".into(),
            submitted,
        }
    }

    /// Some but not all pairs passed; `matched` of `total` were accepted.
    pub fn partial(submitted: Vec<String>, matched: usize, total: usize) -> Self {
        Self {
            kind: MatchKind::Incorrect,
            message: format!("incorrect: {matched}/{total} correct"),
            submitted,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.kind != MatchKind::Incorrect
    }
}
