mod anthropic;
mod google;
mod ollama;
mod openai;
pub mod prompts;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::cli::LlmProvider;
use crate::config::Config;
use crate::error::{AnalysisError, ConfigError};

/// Trait for LLM providers
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one system instruction plus user content and return the reply text
    async fn complete(&self, system: &str, user_message: &str) -> Result<String, AnalysisError>;

    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Model the provider talks to
    fn model(&self) -> &str;
}

/// Per-run model parameters
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub max_tokens: u32,
}

/// Main LLM client that abstracts over providers
pub struct LlmClient {
    provider: Box<dyn CompletionProvider>,
}

impl LlmClient {
    /// Create a new LLM client for the specified provider.
    ///
    /// Fails before any network traffic when the provider needs a key and
    /// none was supplied.
    pub fn new(
        provider: LlmProvider,
        config: &Config,
        model_override: Option<&str>,
        max_tokens: Option<u32>,
        api_key_override: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let settings = ModelSettings {
            model: config.model_for(provider, model_override),
            max_tokens: max_tokens.unwrap_or(config.max_tokens),
        };
        if settings.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens);
        }

        let api_key = api_key_override
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| config.api_key(provider))
            .unwrap_or_default();

        if provider.requires_api_key() && api_key.is_empty() {
            return Err(ConfigError::MissingCredential {
                provider: provider.display_name(),
                env_var: provider.env_vars().first().copied().unwrap_or("API_KEY"),
            });
        }

        let base_url = config.base_url(provider);
        let http = build_http_client(provider)?;

        let provider_impl: Box<dyn CompletionProvider> = match provider {
            LlmProvider::OpenAI => Box::new(openai::OpenAIProvider::new(
                http,
                &api_key,
                settings,
                base_url.as_deref(),
            )),
            LlmProvider::Anthropic => Box::new(anthropic::AnthropicProvider::new(
                http,
                &api_key,
                settings,
                base_url.as_deref(),
            )),
            LlmProvider::Google => Box::new(google::GoogleProvider::new(
                http,
                &api_key,
                settings,
                base_url.as_deref(),
            )),
            LlmProvider::Ollama => Box::new(ollama::OllamaProvider::new(
                http,
                settings,
                base_url.as_deref().unwrap_or("http://localhost:11434"),
            )),
        };

        tracing::info!(
            "Using {} with model {}",
            provider_impl.name(),
            provider_impl.model()
        );

        Ok(Self {
            provider: provider_impl,
        })
    }

    /// Wrap an already constructed provider
    #[cfg(test)]
    pub fn from_provider(provider: Box<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn complete(&self, system: &str, user_message: &str) -> Result<String, AnalysisError> {
        self.provider.complete(system, user_message).await
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }
}

fn build_http_client(provider: LlmProvider) -> Result<Client, ConfigError> {
    // Local models can take minutes on long articles
    let timeout = match provider {
        LlmProvider::Ollama => Duration::from_secs(600),
        _ => Duration::from_secs(180),
    };

    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(ConfigError::HttpClient)
}

/// Turn a failed HTTP response into the matching analysis error
pub(crate) async fn error_from_response(
    provider: &'static str,
    response: reqwest::Response,
) -> AnalysisError {
    let status = response.status().as_u16();
    let error_text = response.text().await.unwrap_or_default();
    tracing::warn!("{} API returned {}: {}", provider, status, error_text);
    AnalysisError::from_status(provider, status, error_text)
}
