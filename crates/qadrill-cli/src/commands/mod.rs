pub mod chat;
pub mod grade;
pub mod init;
pub mod reports;
pub mod user;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;

use qadrill_core::auth::FileCredentialStore;
use qadrill_core::traits::{ChatClient, CredentialStore};
use qadrill_providers::{create_client, PortalConfig};

/// Env var holding the acting user's password.
pub const PASSWORD_ENV: &str = "QADRILL_PASSWORD";

/// Authenticate `email` against the configured credential store.
///
/// Any failure, including a missing password env var or an unreadable
/// store, surfaces as "not authenticated".
pub(crate) fn login(config: &PortalConfig, email: &str) -> Result<()> {
    let password = std::env::var(PASSWORD_ENV).unwrap_or_default();
    let store = FileCredentialStore::new(&config.credentials_path);
    anyhow::ensure!(
        store.authenticate(email, &password),
        "not authenticated (set {PASSWORD_ENV} and check your email)"
    );
    Ok(())
}

/// Resolve a `provider/model` override against the config defaults and
/// construct the chat backend.
pub(crate) fn select_backend(
    config: &PortalConfig,
    model_override: Option<&str>,
) -> Result<(String, Arc<dyn ChatClient>)> {
    let (provider_name, model) = match model_override {
        Some(spec) => match spec.split_once('/') {
            Some((provider, model)) => (provider.to_string(), model.to_string()),
            None => (config.default_provider.clone(), spec.to_string()),
        },
        None => (config.default_provider.clone(), config.default_model.clone()),
    };

    let Some(provider_config) = config.providers.get(&provider_name) else {
        anyhow::bail!(
            "provider '{}' not found in config. Available: {:?}",
            provider_name,
            config.providers.keys().collect::<Vec<_>>()
        );
    };

    let client = create_client(&provider_name, provider_config)?;
    Ok((model, Arc::from(client)))
}
