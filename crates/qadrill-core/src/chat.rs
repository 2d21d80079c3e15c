//! Category-scoped support chat sessions.
//!
//! Each category carries its own system prompt. A session keeps the
//! running conversation and sends a sliding window of recent messages
//! with every request.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::traits::{ChatClient, ChatMessage, ChatRequest};

/// How many trailing history messages accompany each request.
pub const HISTORY_WINDOW: usize = 5;

/// Named system prompts, one per chat category.
#[derive(Debug, Clone, Default)]
pub struct PromptCatalog {
    prompts: HashMap<String, String>,
}

impl PromptCatalog {
    pub fn new(prompts: HashMap<String, String>) -> Self {
        Self { prompts }
    }

    /// Category names, sorted for stable display.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.prompts.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.prompts.get(category).map(String::as_str)
    }
}

/// One respondent's conversation within a single category.
pub struct ChatSession {
    client: Arc<dyn ChatClient>,
    model: String,
    category: String,
    system_prompt: String,
    temperature: f64,
    max_tokens: u32,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(
        client: Arc<dyn ChatClient>,
        model: impl Into<String>,
        category: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            category: category.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.0,
            max_tokens: 1024,
            history: Vec::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send one user message and return the assistant's reply.
    ///
    /// History records completed exchanges only; a failed request leaves
    /// the session unchanged so it can simply be retried.
    pub async fn ask(&mut self, input: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(self.history.len().min(HISTORY_WINDOW) + 2);
        messages.push(ChatMessage::system(&self.system_prompt));

        let tail = self.history.len().saturating_sub(HISTORY_WINDOW);
        messages.extend(self.history[tail..].iter().cloned());
        messages.push(ChatMessage::user(input));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.client.complete(&request).await?;

        self.history.push(ChatMessage::user(input));
        self.history.push(ChatMessage::assistant(&response.content));
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatResponse, ModelInfo, Role, TokenUsage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoChat {
        requests: Mutex<Vec<ChatRequest>>,
        fail: bool,
    }

    impl EchoChat {
        fn new(fail: bool) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChatClient for EchoChat {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                anyhow::bail!("backend down");
            }
            let last = request.messages.last().unwrap().content.clone();
            Ok(ChatResponse {
                content: format!("re: {last}"),
                model: request.model.clone(),
                token_usage: TokenUsage::default(),
                latency_ms: 1,
            })
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    #[test]
    fn catalog_lists_sorted_categories() {
        let catalog = PromptCatalog::new(HashMap::from([
            ("test-design".to_string(), "p1".to_string()),
            ("feature-triage".to_string(), "p2".to_string()),
        ]));
        assert_eq!(catalog.categories(), vec!["feature-triage", "test-design"]);
        assert_eq!(catalog.get("test-design"), Some("p1"));
        assert_eq!(catalog.get("missing"), None);
    }

    #[tokio::test]
    async fn ask_prepends_system_prompt_and_records_history() {
        let chat = Arc::new(EchoChat::new(false));
        let mut session = ChatSession::new(
            Arc::clone(&chat) as Arc<dyn ChatClient>,
            "m",
            "test-design",
            "You answer test design questions.",
        );

        let reply = session.ask("how do I partition inputs?").await.unwrap();
        assert_eq!(reply, "re: how do I partition inputs?");
        assert_eq!(session.history().len(), 2);

        let request = chat.requests.lock().unwrap()[0].clone();
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You answer test design questions.");
    }

    #[tokio::test]
    async fn history_window_is_bounded() {
        let chat = Arc::new(EchoChat::new(false));
        let mut session =
            ChatSession::new(Arc::clone(&chat) as Arc<dyn ChatClient>, "m", "c", "s");

        for i in 0..6 {
            session.ask(&format!("question {i}")).await.unwrap();
        }
        // 6 exchanges = 12 history messages, but each request carries at
        // most system + HISTORY_WINDOW + current user input.
        let last = chat.requests.lock().unwrap().last().unwrap().clone();
        assert_eq!(last.messages.len(), 1 + HISTORY_WINDOW + 1);
        assert_eq!(session.history().len(), 12);
    }

    #[tokio::test]
    async fn failed_request_leaves_history_unchanged() {
        let chat = Arc::new(EchoChat::new(true));
        let mut session =
            ChatSession::new(Arc::clone(&chat) as Arc<dyn ChatClient>, "m", "c", "s");

        assert!(session.ask("hello").await.is_err());
        assert!(session.history().is_empty());
    }
}
