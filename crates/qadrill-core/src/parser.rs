//! TOML question-set and answer-file parsing.
//!
//! Question sets are process-wide read-only configuration. A malformed
//! answer key (count mismatch, zero slots) is a hard parse error so the
//! drill feature reports unavailability instead of grading garbage.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, QuestionSet};

/// Intermediate TOML structure for question-set files.
#[derive(Debug, Deserialize)]
struct TomlQuestionFile {
    question_set: TomlQuestionSetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestionSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    ref_number: String,
    ref_page: String,
    category: String,
    text: String,
    answer_count: usize,
    correct_answers: Vec<String>,
    #[serde(default)]
    evaluation_criteria: Option<String>,
}

/// Parse a single TOML file into a `QuestionSet`.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set file: {}", path.display()))?;
    parse_question_set_str(&content, path)
}

/// Parse a TOML string into a `QuestionSet` (useful for testing).
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            anyhow::ensure!(
                q.answer_count >= 1,
                "question '{}' ({}): answer_count must be at least 1",
                q.ref_number,
                source_path.display()
            );
            anyhow::ensure!(
                q.correct_answers.len() == q.answer_count,
                "question '{}' ({}): answer_count is {} but {} correct answers given",
                q.ref_number,
                source_path.display(),
                q.answer_count,
                q.correct_answers.len()
            );

            Ok(Question {
                ref_number: q.ref_number,
                ref_page: q.ref_page,
                category: q.category,
                text: q.text,
                answer_count: q.answer_count,
                correct_answers: q.correct_answers,
                evaluation_criteria: q.evaluation_criteria,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionSet {
        id: parsed.question_set.id,
        name: parsed.question_set.name,
        description: parsed.question_set.description,
        questions,
    })
}

/// Recursively load all `.toml` question-set files from a directory.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from question-set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question's reference locator (if applicable).
    pub ref_number: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a question set for common issues. Hard invariants (answer
/// count mismatches) are already rejected at parse time.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.questions.is_empty() {
        warnings.push(ValidationWarning {
            ref_number: None,
            message: "question set has no questions".into(),
        });
    }

    // Check for repeated questions. A ref_number alone may legitimately
    // recur (several questions can drill the same section), so a
    // duplicate means the same ref and the same text.
    let mut seen = std::collections::HashSet::new();
    for q in &set.questions {
        if !seen.insert((&q.ref_number, &q.text)) {
            warnings.push(ValidationWarning {
                ref_number: Some(q.ref_number.clone()),
                message: format!("duplicate question: {}", q.ref_number),
            });
        }
    }

    for q in &set.questions {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                ref_number: Some(q.ref_number.clone()),
                message: "question text is empty".into(),
            });
        }
        if q.correct_answers.iter().any(|a| a.trim().is_empty()) {
            warnings.push(ValidationWarning {
                ref_number: Some(q.ref_number.clone()),
                message: "answer key contains a blank entry".into(),
            });
        }
        if q.answer_count > 1 && q.evaluation_criteria.is_none() {
            warnings.push(ValidationWarning {
                ref_number: Some(q.ref_number.clone()),
                message: "multi-part question has no evaluation criteria".into(),
            });
        }
    }

    warnings
}

/// Intermediate TOML structure for submitted-answer files.
#[derive(Debug, Deserialize)]
struct TomlAnswerFile {
    #[serde(default)]
    answers: Vec<TomlAnswerEntry>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswerEntry {
    #[serde(default)]
    values: Vec<String>,
}

/// Parse a submitted-answer file: one `[[answers]]` entry per question,
/// in question order. Entries are trimmed and blank slots dropped, the
/// way an unfilled form field simply never submits a value.
pub fn parse_answer_file(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer file: {}", path.display()))?;
    parse_answer_file_str(&content, path)
}

/// Parse an answer-file TOML string.
pub fn parse_answer_file_str(content: &str, source_path: &Path) -> Result<Vec<Vec<String>>> {
    let parsed: TomlAnswerFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(parsed
        .answers
        .into_iter()
        .map(|entry| {
            entry
                .values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .collect())
}
