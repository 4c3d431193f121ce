use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, ModelSettings, error_from_response};
use crate::error::AnalysisError;

const PROVIDER: &str = "openai";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    settings: ModelSettings,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAIProvider {
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
                .unwrap_or("https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, system: &str, user_message: &str) -> Result<String, AnalysisError> {
        let request = OpenAIRequest {
            model: &self.settings.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user_message,
                },
            ],
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

        let response: OpenAIResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::MalformedResponse {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(AnalysisError::MalformedResponse {
                provider: PROVIDER,
                message: "no content in response".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
