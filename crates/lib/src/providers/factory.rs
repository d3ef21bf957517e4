//! # AI Provider Factory
//!
//! This module centralizes the logic for turning a `ProviderConfig` into a live AI
//! provider, so the server and the CLI build their model clients the same way.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    types::ProviderConfig,
};
use tracing::info;

/// The endpoint used for local providers when none is configured (Ollama's default).
pub const DEFAULT_LOCAL_API_URL: &str = "http://localhost:11434/v1/chat/completions";

/// Creates an AI provider from its configuration.
///
/// - `gemini` requires an API key; the URL is derived from the model name when absent.
/// - `local` talks to an OpenAI-compatible endpoint and falls back to Ollama's default URL.
pub fn create_ai_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    PromptError::MissingAiProvider(format!(
                        "api_key is required for gemini provider '{name}'"
                    ))
                })?;
            let api_url = config
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| GeminiProvider::endpoint_for_model(&config.model_name));
            info!(provider = %name, api_url = %api_url, "Configuring Gemini provider.");
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_LOCAL_API_URL.to_string());
            info!(provider = %name, api_url = %api_url, model = %config.model_name, "Configuring local AI provider.");
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone().filter(|key| !key.is_empty()),
                Some(config.model_name.clone()),
            )?)
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "Unsupported AI provider type '{other}' for provider '{name}'"
            )));
        }
    };

    Ok(provider)
}
