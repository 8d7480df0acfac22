use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Gemini client for interacting with the Google Generative Language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Model name
    model: String,
    /// Generation temperature
    temperature: f32,
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// The conversation contents
    contents: Vec<GeminiContent>,

    /// Generation parameters
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// One content block of a Gemini request or response
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// The parts making up the content
    pub parts: Vec<GeminiPart>,

    /// Role of the content author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// One text part of a content block
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// The text payload
    pub text: String,
}

/// Generation parameters
#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    /// Generated candidates, usually one
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// A single response candidate
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    /// The generated content
    pub content: Option<GeminiContent>,

    /// Why generation stopped
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

impl Default for GeminiRequest {
    fn default() -> Self {
        Self {
            contents: Vec::new(),
            generation_config: None,
        }
    }
}

impl GeminiRequest {
    /// Create a request carrying a single user prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt.into() }],
                role: Some("user".to_string()),
            }],
            ..Default::default()
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        let config = self.generation_config.get_or_insert(GenerationConfig {
            temperature: None,
            max_output_tokens: None,
        });
        config.temperature = Some(temperature);
        self
    }

    /// Set the output token cap
    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        let config = self.generation_config.get_or_insert(GenerationConfig {
            temperature: None,
            max_output_tokens: None,
        });
        config.max_output_tokens = Some(max_output_tokens);
        self
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::new_with_config(api_key, endpoint, model, 0.3, 60)
    }

    /// Create a new Gemini client with generation and transport settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Complete a generateContent request
    pub async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let api_url = if self.endpoint.is_empty() {
            format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model
            )
        } else {
            format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint.trim_end_matches('/'),
                self.model
            )
        };

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ConnectionError(format!(
                    "Failed to send request to Gemini API: {}",
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                429 => ProviderError::RateLimitExceeded(error_text),
                401 | 403 => ProviderError::AuthenticationError(error_text),
                code => ProviderError::ApiError { status_code: code, message: error_text },
            });
        }

        response.json::<GeminiResponse>().await.map_err(|e| {
            ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e))
        })
    }

    /// Extract text from a Gemini response
    pub fn extract_text_from_response(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GeminiRequest::new(prompt).temperature(self.temperature);
        let response = self.complete(request).await?;
        Ok(Self::extract_text_from_response(&response))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = GeminiRequest::new("Hello")
            .temperature(0.0)
            .max_output_tokens(10);
        self.complete(request).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}
