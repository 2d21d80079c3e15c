//! Core trait definitions for chat backends, credential stores, and
//! report sinks.
//!
//! The chat trait is implemented by the `qadrill-providers` crate; the
//! report sink by `qadrill-report`. The file-backed credential store
//! lives in this crate (`auth` module).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chat-completion trait
// ---------------------------------------------------------------------------

/// Trait for chat-completion backends.
///
/// Both the drill's semantic judge and the support-chat assistant go
/// through this trait; the backends themselves never see drill semantics.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Human-readable backend name (e.g. "openai").
    fn name(&self) -> &str;

    /// Produce a completion for an ordered list of role-tagged messages.
    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse>;

    /// List models this backend knows about.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request for one chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// Ordered conversation, system message first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// Response from a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub content: String,
    /// Model that actually produced the reply.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Backend name.
    pub provider: String,
    /// Maximum context window size in tokens (0 = unknown).
    pub max_context: u32,
}

// ---------------------------------------------------------------------------
// Credential store trait
// ---------------------------------------------------------------------------

/// External identity lookup gating access to the portal features.
///
/// Failures inside an implementation must surface as "not authenticated",
/// never as a panic or propagated error.
pub trait CredentialStore: Send + Sync {
    /// Returns `true` if the identity/secret pair is valid.
    fn authenticate(&self, email: &str, password: &str) -> bool;

    /// Returns `true` if the identity carries admin privileges.
    fn is_admin(&self, email: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Report sink trait
// ---------------------------------------------------------------------------

/// Durable, append-only storage for rendered drill reports.
pub trait ReportSink: Send + Sync {
    /// Persist the rendered report text verbatim. Returns the storage key
    /// (for the filesystem sink, the file path). All-or-nothing: on error
    /// no partial report may remain visible.
    fn save(&self, filename: &str, contents: &str) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn message_helpers_set_roles() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").role, Role::User);
        assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
    }
}
