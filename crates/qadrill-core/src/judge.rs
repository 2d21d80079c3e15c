//! Semantic equivalence judging via a chat-completion backend.
//!
//! The judge decides whether a submitted free-text answer means the same
//! thing as a reference answer. The LLM-backed implementation sends a
//! fixed grading prompt and interprets only an exact "yes" (trimmed,
//! case-insensitive) as a positive verdict.

use std::sync::Arc;

use async_trait::async_trait;

use crate::traits::{ChatClient, ChatMessage, ChatRequest};

/// Persona establishing the grader role in the judge's system message.
pub const GRADER_PERSONA: &str = "You are an expert in software testing. \
Decide whether the user's answer is semantically equivalent to the \
reference answer.";

/// Pairwise semantic-equivalence judgment.
#[async_trait]
pub trait SemanticJudge: Send + Sync {
    /// Returns `true` if `submitted` is equivalent in meaning to
    /// `reference`, taking optional grading criteria into account.
    async fn judge(
        &self,
        submitted: &str,
        reference: &str,
        criteria: Option<&str>,
    ) -> anyhow::Result<bool>;
}

/// A judge backed by a chat-completion backend.
pub struct LlmJudge {
    client: Arc<dyn ChatClient>,
    model: String,
    max_tokens: u32,
}

impl LlmJudge {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 16,
        }
    }

    fn build_request(&self, submitted: &str, reference: &str, criteria: Option<&str>) -> ChatRequest {
        let mut system = GRADER_PERSONA.to_string();
        if let Some(criteria) = criteria {
            system.push_str("\n\nGrading criteria:\n");
            system.push_str(criteria);
        }

        let user = format!(
            "Submitted answer: {submitted}\nReference answer: {reference}\n\
             Are these semantically equivalent? Answer Yes or No."
        );

        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            // Deterministic grading
            temperature: 0.0,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl SemanticJudge for LlmJudge {
    async fn judge(
        &self,
        submitted: &str,
        reference: &str,
        criteria: Option<&str>,
    ) -> anyhow::Result<bool> {
        let request = self.build_request(submitted, reference, criteria);
        let response = self.client.complete(&request).await?;
        Ok(is_affirmative(&response.content))
    }
}

/// Only an exact "yes" counts; hedged or decorated replies are negative.
fn is_affirmative(content: &str) -> bool {
    content.trim().eq_ignore_ascii_case("yes")
}

/// A judge with a fixed verdict, for tests and the exact-only grading mode.
pub struct FixedJudge(pub bool);

#[async_trait]
impl SemanticJudge for FixedJudge {
    async fn judge(&self, _: &str, _: &str, _: Option<&str>) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}

/// A judge whose backend is unreachable. Every judgment fails, which the
/// checker treats as a non-match.
pub struct UnavailableJudge;

#[async_trait]
impl SemanticJudge for UnavailableJudge {
    async fn judge(&self, _: &str, _: &str, _: Option<&str>) -> anyhow::Result<bool> {
        anyhow::bail!("semantic judge unavailable")
    }
}
