//! Async LLM client for text completion
//!
//! Model-agnostic HTTP client. Speaks the Gemini `generateContent` API,
//! the Anthropic Messages API, and OpenAI-compatible chat completions;
//! the format is picked from the endpoint URL.

use crate::core::config::LlmConfig;
use crate::core::error::{AskError, Result};
use crate::llm::TextCompletion;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

const MAX_TOKENS: u32 = 4096;

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Gemini,
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            api_format,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.api_url.clone(),
            config.model.clone(),
        )
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("generativelanguage.googleapis.com") {
            ApiFormat::Gemini
        } else if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn gemini_endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    async fn complete_gemini(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.into(),
                }],
            }],
        };

        let response = send(
            self.client
                .post(self.gemini_endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&request),
        )
        .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let completion: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AskError::LlmError(e.without_url().to_string()))?;

        completion.text()
    }

    async fn complete_anthropic(&self, prompt: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
        };

        let response = send(
            self.client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&request),
        )
        .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AskError::LlmError(e.without_url().to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| AskError::LlmError("Empty response".into()))
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
        };

        let response = send(
            self.client
                .post(&self.api_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("content-type", "application/json")
                .json(&request),
        )
        .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AskError::LlmError(e.without_url().to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| AskError::LlmError("Empty response".into()))
    }
}

/// Send a request, reporting transport errors without the URL
async fn send(request: RequestBuilder) -> Result<Response> {
    request
        .send()
        .await
        .map_err(|e| AskError::LlmError(e.without_url().to_string()))
}

async fn api_error(response: Response) -> AskError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e.without_url(), "could not read error body");
            "<unreadable body>".to_string()
        }
    };
    AskError::LlmError(format!("API error ({}): {}", status, body))
}

#[async_trait]
impl TextCompletion for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, format = ?self.api_format, chars = prompt.len(), "sending completion");
        match self.api_format {
            ApiFormat::Gemini => self.complete_gemini(prompt).await,
            ApiFormat::Anthropic => self.complete_anthropic(prompt).await,
            ApiFormat::OpenAI => self.complete_openai(prompt).await,
        }
    }
}

// Gemini API format
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Result<String> {
        let content = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .ok_or_else(|| AskError::LlmError("Empty response".into()))?;

        let text = content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .concat();
        if text.trim().is_empty() {
            return Err(AskError::LlmError("Empty response".into()));
        }
        Ok(text)
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
