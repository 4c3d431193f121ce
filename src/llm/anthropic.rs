use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, ModelSettings, error_from_response};
use crate::error::AnalysisError;

const PROVIDER: &str = "anthropic";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    settings: ModelSettings,
    base_url: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(
        client: Client,
        api_key: &str,
        settings: ModelSettings,
        base_url: Option<&str>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            settings,
            base_url: base_url
                .unwrap_or("https://api.anthropic.com")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, system: &str, user_message: &str) -> Result<String, AnalysisError> {
        let request = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user_message,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|source| AnalysisError::Network {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        let response: AnthropicResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::MalformedResponse {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        // Replies can be split over several text blocks
        let text: String = response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(AnalysisError::MalformedResponse {
                provider: PROVIDER,
                message: "no text content in response".to_string(),
            });
        }

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
