use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, ModelSettings, error_from_response};
use crate::error::AnalysisError;

const PROVIDER: &str = "ollama";

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    settings: ModelSettings,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: i64,
    // Ollama otherwise uses a 2048-token context
    num_ctx: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(client: Client, settings: ModelSettings, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, system: &str, user_message: &str) -> Result<String, AnalysisError> {
        let request = OllamaChatRequest {
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
            stream: false,
            options: OllamaOptions {
                temperature: 0.2,
                num_predict: i64::from(self.settings.max_tokens),
                num_ctx: 16_384,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|source| {
                tracing::warn!("Ollama unreachable at {}. Is it running? (try: ollama serve)", self.base_url);
                AnalysisError::Network {
                    provider: PROVIDER,
                    source,
                }
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        let response: OllamaChatResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::MalformedResponse {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        Ok(response.message.content.trim().to_string())
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
