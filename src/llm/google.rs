use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, ModelSettings, error_from_response};
use crate::error::AnalysisError;

const PROVIDER: &str = "google";

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    settings: ModelSettings,
    base_url: String,
}

#[derive(Serialize)]
struct GoogleRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction<'a>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GoogleResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GoogleError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
}

impl GoogleProvider {
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
                .unwrap_or("https://generativelanguage.googleapis.com/v1beta")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for GoogleProvider {
    async fn complete(&self, system: &str, user_message: &str) -> Result<String, AnalysisError> {
        let request = GoogleRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: user_message }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![Part { text: system }],
            },
            generation_config: GenerationConfig {
                max_output_tokens: self.settings.max_tokens,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.settings.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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

        let response: GoogleResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::MalformedResponse {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        if let Some(error) = response.error {
            return Err(AnalysisError::Api {
                provider: PROVIDER,
                status: 200,
                message: error.message,
            });
        }

        response
            .candidates
            .and_then(|c| c.into_iter().next())
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
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
