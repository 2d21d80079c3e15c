//! Mock chat backend for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use qadrill_core::traits::{ChatClient, ChatRequest, ChatResponse, ModelInfo, Role, TokenUsage};

/// A mock chat backend that answers without any network access.
///
/// Replies are selected by substring match against the last user message;
/// unmatched requests get the default reply.
pub struct MockChat {
    /// Map of user-message substring → reply.
    replies: HashMap<String, String>,
    /// Default reply if nothing matches.
    default_reply: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockChat {
    /// Create a mock with the given substring → reply mappings.
    pub fn new(replies: HashMap<String, String>) -> Self {
        Self {
            replies,
            default_reply: "yes".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_reply(reply: &str) -> Self {
        Self {
            replies: HashMap::new(),
            default_reply: reply.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of completions served.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockChat {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let content = self
            .replies
            .iter()
            .find(|(key, _)| last_user.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_reply.clone());

        let completion_tokens = (content.len() / 4) as u32; // Rough estimate
        let prompt_tokens = (last_user.len() / 4) as u32;

        Ok(ChatResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadrill_core::traits::ChatMessage;

    fn request(user: &str) -> ChatRequest {
        ChatRequest {
            model: "mock-model".into(),
            messages: vec![ChatMessage::system("grader"), ChatMessage::user(user)],
            temperature: 0.0,
            max_tokens: 16,
        }
    }

    #[tokio::test]
    async fn fixed_reply() {
        let mock = MockChat::with_fixed_reply("no");
        let response = mock.complete(&request("anything")).await.unwrap();
        assert_eq!(response.content, "no");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn substring_matching_on_last_user_message() {
        let mut replies = HashMap::new();
        replies.insert("wasted time".to_string(), "yes".to_string());
        replies.insert("blue".to_string(), "no".to_string());

        let mock = MockChat::new(replies);

        let resp = mock
            .complete(&request("Submitted answer: wasted time\nReference answer: lost time"))
            .await
            .unwrap();
        assert_eq!(resp.content, "yes");

        let resp = mock.complete(&request("the sky is blue")).await.unwrap();
        assert_eq!(resp.content, "no");
        assert_eq!(mock.call_count(), 2);

        let last = mock.last_request().unwrap();
        assert_eq!(last.messages.len(), 2);
    }
}
