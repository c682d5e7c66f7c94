//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use super::{ModelClient, ModelError};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Gemini client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key. An empty key disables the client: every call reports
    /// [`ModelError::Unavailable`] without touching the network.
    pub api_key: String,
    /// Model name, e.g. "gemini-pro".
    pub model: String,
    /// Base endpoint URL, without a trailing slash.
    pub endpoint: String,
    pub temperature: f32,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub const DEFAULT_MODEL: &str = "gemini-pro";
    pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: Self::DEFAULT_MODEL.to_string(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            temperature: 0.7,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Gemini HTTP client. One request per [`ModelClient::generate`] call.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout {
                after: Duration::from_secs(self.config.timeout_secs),
            }
        } else {
            ModelError::Unavailable(format!("request failed: {err}"))
        }
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(MAX_ERROR_BODY_CHARS).collect());
    if detail.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", detail.trim())
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        if self.config.api_key.trim().is_empty() {
            return Err(ModelError::Unavailable("no API key configured".to_string()));
        }

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(ModelError::Unavailable(error_message(status, &text)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ModelError::Unavailable(format!("unreadable response envelope: {e}")))?;

        let content: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ModelError::Unavailable(
                "response contained no text".to_string(),
            ));
        }

        Ok(content)
    }
}
