//! qadrill-providers — Chat-completion backend integrations.
//!
//! Implements the `ChatClient` trait for OpenAI-compatible APIs and
//! Ollama, plus a scripted mock for tests and offline use.

pub mod config;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_client, load_config, load_config_from, PortalConfig, ProviderConfig};
pub use qadrill_core::error::ChatError;
