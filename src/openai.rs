//! Chat-completions client configuration.
//!
//! Any OpenAI-compatible endpoint can back the reasoning model; the base URL
//! and key come from [`ModelSettings`].

use crate::config::{resolve_key, ModelSettings};
use crate::error::{Result, VeritasError};
use async_openai::{config::OpenAIConfig, Client};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

/// Create a chat client from model settings.
pub fn create_client(settings: &ModelSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = resolve_key(settings.api_key.as_deref(), &settings.api_key_env)?;
    create_client_with(
        &settings.api_base,
        &api_key,
        Duration::from_secs(settings.timeout_secs),
    )
}

/// Create a chat client against an explicit base URL and key.
pub fn create_client_with(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VeritasError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry()))
}

/// Backoff that gives up after the first attempt, so a rate-limited call
/// fails immediately instead of being retried inside the client.
fn no_retry() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::config::Config;

    #[test]
    fn test_client_uses_configured_base() {
        let client = create_client_with(
            "https://example.test/v1/",
            "test-key",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.config().url("/chat/completions"),
            "https://example.test/v1/chat/completions"
        );
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let settings = ModelSettings {
            api_key: None,
            api_key_env: "VERITAS_TEST_MISSING_MODEL_KEY".to_string(),
            ..ModelSettings::default()
        };
        let err = create_client(&settings).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
